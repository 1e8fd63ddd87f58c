//! Live sync: poll the sync endpoint and apply graphs that actually changed.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kismet_core::graph::has_node_list;
use kismet_core::{Fingerprint, Graph};
use serde_json::Value;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::app::{App, SyncStatus};

/// Floor for the poll period. A zero period from settings would otherwise
/// panic inside the poll task.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("sync request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("sync endpoint answered {0}")]
    Status(reqwest::StatusCode),
}

/// Where the poller reads the last pushed graph from.
#[async_trait]
pub trait SyncSource: Send + Sync {
    /// `Ok(None)` when nothing has been pushed yet.
    async fn fetch(&self) -> Result<Option<Value>, SyncError>;
}

pub struct HttpSyncSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSyncSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl SyncSource for HttpSyncSource {
    async fn fetch(&self) -> Result<Option<Value>, SyncError> {
        let resp = self.client.get(&self.url).send().await?;
        if !resp.status().is_success() {
            return Err(SyncError::Status(resp.status()));
        }
        let body = resp.text().await?;
        match serde_json::from_str::<Value>(&body) {
            Ok(Value::Null) => Ok(None),
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                debug!(error = %e, "sync body is not JSON");
                Ok(None)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Nothing stored upstream, or the payload was not a graph.
    Empty,
    Unchanged,
    Applied(Fingerprint),
    Failed,
}

pub struct SyncPoller<S> {
    source: S,
    app: Arc<App>,
    interval: Duration,
    status_hold: Duration,
    last: Option<Fingerprint>,
}

impl<S: SyncSource + 'static> SyncPoller<S> {
    pub fn new(source: S, app: Arc<App>, interval: Duration, status_hold: Duration) -> Self {
        if interval < MIN_POLL_INTERVAL {
            warn!(requested_ms = interval.as_millis() as u64, "poll interval raised to the minimum");
        }
        Self {
            source,
            app,
            interval: interval.max(MIN_POLL_INTERVAL),
            status_hold,
            last: None,
        }
    }

    /// One fetch-compare-apply cycle. Never returns an error: failures become
    /// the `Error` status and the next tick tries again.
    pub async fn poll_once(&mut self) -> PollOutcome {
        let payload = match self.source.fetch().await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "sync poll failed");
                self.app.set_status(SyncStatus::Error);
                return PollOutcome::Failed;
            }
        };
        if self.app.status() == SyncStatus::Error {
            self.app.set_status(SyncStatus::Idle);
        }

        let Some(value) = payload.filter(has_node_list) else {
            return PollOutcome::Empty;
        };
        let fingerprint = Fingerprint::of_value(&value);
        if self.last == Some(fingerprint) {
            return PollOutcome::Unchanged;
        }

        let graph = match Graph::from_value(value) {
            Ok(graph) => graph,
            Err(e) => {
                warn!(error = %e, "ignoring malformed synced graph");
                return PollOutcome::Empty;
            }
        };
        info!(%fingerprint, nodes = graph.nodes.len(), "applying synced graph");
        self.last = Some(fingerprint);
        self.app.replace_graph(graph);
        self.app.hold_status(SyncStatus::Syncing, self.status_hold);
        self.app.focus();
        PollOutcome::Applied(fingerprint)
    }

    /// Poll forever. Each fetch completes before the next tick is taken, so
    /// requests never overlap.
    pub async fn run(mut self) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.poll_once().await;
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
