use crate::modules::{
    aggregator::ScoreboardAggregator,
    feed::{FeedEvent, FeedPublisher},
};
use axum::{
    extract::Extension,
    http::StatusCode,
    response::sse::{Event, Sse},
    Json,
};
use futures::{Stream, StreamExt};
use scoreboard_libs::{
    api::{ContestResponse, ScoreboardResponse},
    domjudge::ContestApi,
};
use std::sync::Arc;
use tokio::time::Instant;

pub async fn contest<A: ContestApi + 'static>(
    Extension(aggregator): Extension<Arc<ScoreboardAggregator<A>>>,
) -> (StatusCode, Json<ContestResponse>) {
    let start_process = Instant::now();
    let response = aggregator.contest().await;

    tracing::info!(
        target: "querylog",
        "endpoint=contest elapsed_time={} problems={}",
        start_process.elapsed().as_millis(),
        response.problems.len()
    );

    (StatusCode::OK, Json(response))
}

pub async fn scoreboard<A: ContestApi + 'static>(
    Extension(aggregator): Extension<Arc<ScoreboardAggregator<A>>>,
) -> (StatusCode, Json<ScoreboardResponse>) {
    let start_process = Instant::now();
    let response = aggregator.scoreboard().await;

    tracing::info!(
        target: "querylog",
        "endpoint=scoreboard elapsed_time={} teams={}",
        start_process.elapsed().as_millis(),
        response.teams.len()
    );

    (StatusCode::OK, Json(response))
}

pub async fn event_feed<A: ContestApi + 'static>(
    Extension(publisher): Extension<Arc<FeedPublisher<A>>>,
) -> Sse<impl Stream<Item = Result<Event, serde_json::Error>>> {
    tracing::info!("event feed subscriber connected");

    let events = publisher
        .subscribe()
        .map(|event: FeedEvent| Event::default().json_data(event));

    Sse::new(events)
}
