use crate::{
    cmd::connect,
    modules::{
        aggregator::ScoreboardAggregator,
        feed::{FeedConfig, FeedPublisher},
        handlers::{contest, event_feed, scoreboard},
    },
};
use anyhow::{Context, Result};
use axum::{
    extract::Extension,
    http::{header::CACHE_CONTROL, HeaderValue},
    routing, Router, Server,
};
use clap::Args;
use scoreboard_libs::domjudge::ContestApi;
use std::{net::SocketAddr, sync::Arc};
use tokio::time::Duration;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer};

#[derive(Debug, Args)]
pub struct ServerArgs {
    #[arg(long)]
    port: Option<u16>,
    /// Seconds between two scoreboard updates on the event feed.
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    snapshot_interval: u64,
    /// Seconds between two heartbeats on the event feed.
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    heartbeat_interval: u64,
}

pub async fn run(args: ServerArgs) -> Result<()> {
    let client = connect()?;
    let aggregator = Arc::new(ScoreboardAggregator::new(client));
    let feed = FeedConfig {
        snapshot_interval: Duration::from_secs(args.snapshot_interval),
        heartbeat_interval: Duration::from_secs(args.heartbeat_interval),
    };

    let app = create_router(aggregator, feed);
    let port = match args.port {
        Some(port) => port,
        None => {
            tracing::warn!("API server will be launched at default port number 8080");
            8080u16
        }
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Server start at port {}", port);
    Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .with_context(|| {
            let message = format!("server stopped unexpectedly on port {}", port);
            tracing::error!(message);
            message
        })?;

    Ok(())
}

fn routes<A: ContestApi + 'static>() -> Router {
    Router::new()
        .route("/contest", routing::get(contest::<A>))
        .route("/scoreboard", routing::get(scoreboard::<A>))
        .route("/event-feed", routing::get(event_feed::<A>))
}

pub fn create_router<A: ContestApi + 'static>(
    aggregator: Arc<ScoreboardAggregator<A>>,
    feed: FeedConfig,
) -> Router {
    let publisher = Arc::new(FeedPublisher::new(aggregator.clone(), feed));

    routes::<A>()
        .nest("/api", routes::<A>())
        .layer(Extension(aggregator))
        .layer(Extension(publisher))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        ))
        .layer(CorsLayer::permissive())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler.");
    };

    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("SIGINT signal received, starting graceful shutdown.");
}
