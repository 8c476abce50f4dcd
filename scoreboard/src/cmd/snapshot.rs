use crate::{cmd::connect, cmd::SnapshotTarget, modules::aggregator::ScoreboardAggregator};
use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    target: SnapshotTarget,
    /// Pretty-print the JSON document.
    #[arg(long)]
    pretty: bool,
}

/// Run one aggregation and print the response the server would send for it.
pub async fn run(args: SnapshotArgs) -> Result<()> {
    let client = connect()?;
    let aggregator = ScoreboardAggregator::new(client);

    tracing::info!("Take {} snapshot", args.target);
    let document = match args.target {
        SnapshotTarget::Contest => render(&aggregator.contest().await, args.pretty),
        SnapshotTarget::Scoreboard => render(&aggregator.scoreboard().await, args.pretty),
    }
    .with_context(|| {
        let message = format!("failed to serialize {} snapshot", args.target);
        tracing::error!(message);
        message
    })?;

    println!("{}", document);
    Ok(())
}

fn render<T: Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}
