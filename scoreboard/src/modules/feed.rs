use crate::modules::aggregator::ScoreboardAggregator;
use chrono::{SecondsFormat, Utc};
use futures::Stream;
use scoreboard_libs::{api::ScoreboardResponse, domjudge::ContestApi};
use serde::Serialize;
use std::{
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};
use tokio::{
    sync::{
        mpsc::{self, Sender},
        watch,
    },
    task::JoinHandle,
    time::{self, Duration, Instant, MissedTickBehavior},
};
use tokio_stream::wrappers::ReceiverStream;

const SUBSCRIPTION_BUFFER: usize = 16;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeedEventKind {
    ScoreboardUpdate,
    Heartbeat,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct FeedEvent {
    #[serde(rename = "type")]
    pub kind: FeedEventKind,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ScoreboardResponse>,
}

impl FeedEvent {
    fn now() -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn scoreboard_update(data: ScoreboardResponse) -> Self {
        Self {
            kind: FeedEventKind::ScoreboardUpdate,
            timestamp: Self::now(),
            data: Some(data),
        }
    }

    pub fn heartbeat() -> Self {
        Self {
            kind: FeedEventKind::Heartbeat,
            timestamp: Self::now(),
            data: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedConfig {
    pub snapshot_interval: Duration,
    pub heartbeat_interval: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            snapshot_interval: Duration::from_secs(5),
            heartbeat_interval: Duration::from_secs(30),
        }
    }
}

/// Owns the two periodic triggers of one subscriber.
///
/// [`FeedHandle::cancel`] stops both of them, and so does dropping the handle.
#[derive(Debug)]
pub struct FeedHandle {
    snapshot: JoinHandle<()>,
    heartbeat: JoinHandle<()>,
}

impl FeedHandle {
    pub fn cancel(&self) {
        self.snapshot.abort();
        self.heartbeat.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.snapshot.is_finished() && self.heartbeat.is_finished()
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Event stream of one subscriber. Dropping it stops the triggers feeding it.
pub struct FeedSubscription {
    events: ReceiverStream<FeedEvent>,
    handle: FeedHandle,
}

impl FeedSubscription {
    pub fn handle(&self) -> &FeedHandle {
        &self.handle
    }
}

impl Stream for FeedSubscription {
    type Item = FeedEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.events).poll_next(cx)
    }
}

/// Republishes scoreboard snapshots to event-feed subscribers.
pub struct FeedPublisher<A> {
    aggregator: Arc<ScoreboardAggregator<A>>,
    config: FeedConfig,
}

impl<A: ContestApi + 'static> FeedPublisher<A> {
    pub fn new(aggregator: Arc<ScoreboardAggregator<A>>, config: FeedConfig) -> Self {
        Self { aggregator, config }
    }

    /// Start publishing into `sink`.
    ///
    /// A snapshot is sent immediately and then every `snapshot_interval`; a heartbeat every
    /// `heartbeat_interval`, the first one after a full interval. Publishing is best effort:
    /// once the sink is closed or either trigger fails to enqueue, both triggers stop.
    pub fn spawn(&self, sink: Sender<FeedEvent>) -> FeedHandle {
        let (stop, stopped) = watch::channel(false);
        let stop = Arc::new(stop);

        let snapshot = tokio::spawn(publish_snapshots(
            self.aggregator.clone(),
            sink.clone(),
            self.config.snapshot_interval,
            Trigger::new(stop.clone(), stopped.clone()),
        ));
        let heartbeat = tokio::spawn(publish_heartbeats(
            sink,
            self.config.heartbeat_interval,
            Trigger::new(stop, stopped),
        ));

        FeedHandle {
            snapshot,
            heartbeat,
        }
    }

    pub fn subscribe(&self) -> FeedSubscription {
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let handle = self.spawn(tx);

        FeedSubscription {
            events: ReceiverStream::new(rx),
            handle,
        }
    }
}

/// Stop signal shared by the two triggers of one subscriber.
struct Trigger {
    stop: Arc<watch::Sender<bool>>,
    stopped: watch::Receiver<bool>,
}

impl Trigger {
    fn new(stop: Arc<watch::Sender<bool>>, stopped: watch::Receiver<bool>) -> Self {
        Self { stop, stopped }
    }

    /// Resolves once the sibling trigger has stopped.
    async fn sibling_stopped(&mut self) {
        while !*self.stopped.borrow_and_update() {
            if self.stopped.changed().await.is_err() {
                return;
            }
        }
    }

    fn stop_both(&self) {
        self.stop.send_replace(true);
    }
}

async fn publish_snapshots<A: ContestApi>(
    aggregator: Arc<ScoreboardAggregator<A>>,
    sink: Sender<FeedEvent>,
    period: Duration,
    mut trigger: Trigger,
) {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let snapshot = tokio::select! {
            _ = sink.closed() => break,
            _ = trigger.sibling_stopped() => break,
            snapshot = async {
                ticker.tick().await;
                aggregator.scoreboard().await
            } => snapshot,
        };

        if let Err(e) = sink.try_send(FeedEvent::scoreboard_update(snapshot)) {
            tracing::info!("stop publishing to subscriber: {}", e);
            trigger.stop_both();
            break;
        }
    }

    tracing::debug!("scoreboard update trigger stopped");
}

async fn publish_heartbeats(sink: Sender<FeedEvent>, period: Duration, mut trigger: Trigger) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = sink.closed() => break,
            _ = trigger.sibling_stopped() => break,
            _ = ticker.tick() => {}
        }

        if let Err(e) = sink.try_send(FeedEvent::heartbeat()) {
            tracing::info!("stop publishing to subscriber: {}", e);
            trigger.stop_both();
            break;
        }
    }

    tracing::debug!("heartbeat trigger stopped");
}
