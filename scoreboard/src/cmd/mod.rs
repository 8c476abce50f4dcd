pub mod server;
pub mod snapshot;

use anyhow::{Context, Result};
use clap::ValueEnum;
use scoreboard_libs::domjudge::{ApiConfig, DomjudgeClient};
use std::fmt;

#[derive(Debug, ValueEnum, Clone, Copy)]
pub enum SnapshotTarget {
    Contest,
    Scoreboard,
}

impl fmt::Display for SnapshotTarget {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SnapshotTarget::Contest => write!(f, "contest"),
            SnapshotTarget::Scoreboard => write!(f, "scoreboard"),
        }
    }
}

/// Create the contest API client from the environment.
pub fn connect() -> Result<DomjudgeClient> {
    let config = ApiConfig::from_env().with_context(|| {
        let message = "VITE_API_BASE_URL or PUBLIC_API_BASE_URL must be a valid url.";
        tracing::error!(message);
        message
    })?;

    tracing::info!(
        "Use contest API at {} ({})",
        config.base_url,
        if config.credentials.is_some() {
            "basic authentication"
        } else {
            "anonymous"
        }
    );

    DomjudgeClient::new(config).with_context(|| {
        let message = "couldn't create contest API client.";
        tracing::error!(message);
        message
    })
}
