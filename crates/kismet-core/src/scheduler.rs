//! Debounced connector recomputation.
//!
//! Pin anchors are only meaningful once node layout has settled, so every
//! graph change (re)starts a short settle timer and only the graph current
//! when it fires is rendered. Older pending passes are dropped, never queued,
//! and a finished frame replaces the previous one in a single `watch` send.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::graph::Graph;
use crate::layout::NodeMetrics;
use crate::render::{RenderFrame, RenderOptions};

pub struct RenderScheduler {
    frames: watch::Receiver<Arc<RenderFrame>>,
    passes: Arc<AtomicU64>,
    task: JoinHandle<()>,
}

impl RenderScheduler {
    /// Render the current graph immediately, then follow `graphs` until its
    /// sender is dropped. A zero `settle_delay` renders on every change
    /// without waiting.
    pub fn spawn(
        mut graphs: watch::Receiver<Arc<Graph>>,
        metrics: NodeMetrics,
        settle_delay: Duration,
        options: RenderOptions,
    ) -> Self {
        let initial = graphs.borrow_and_update().clone();
        let first = RenderFrame {
            pass: 1,
            ..RenderFrame::build(initial, &metrics, options)
        };
        let (tx, frames) = watch::channel(Arc::new(first));
        let passes = Arc::new(AtomicU64::new(1));

        let counter = passes.clone();
        let task = tokio::spawn(async move {
            while graphs.changed().await.is_ok() {
                if !settle_delay.is_zero() && !settle(&mut graphs, settle_delay).await {
                    return;
                }
                let graph = graphs.borrow_and_update().clone();
                let pass = counter.fetch_add(1, Ordering::SeqCst) + 1;
                let frame = RenderFrame {
                    pass,
                    ..RenderFrame::build(graph, &metrics, options)
                };
                debug!(
                    pass,
                    connectors = frame.connectors.len(),
                    skipped = frame.connectors.skipped,
                    "connector pass complete"
                );
                tx.send_replace(Arc::new(frame));
            }
        });

        Self {
            frames,
            passes,
            task,
        }
    }

    /// Subscribe to finished frames.
    pub fn frames(&self) -> watch::Receiver<Arc<RenderFrame>> {
        self.frames.clone()
    }

    pub fn current(&self) -> Arc<RenderFrame> {
        self.frames.borrow().clone()
    }

    /// Number of connector passes run so far, including the initial one.
    pub fn passes(&self) -> u64 {
        self.passes.load(Ordering::SeqCst)
    }
}

impl Drop for RenderScheduler {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Wait until `delay` passes with no further change. Returns `false` when the
/// graph source went away.
async fn settle(graphs: &mut watch::Receiver<Arc<Graph>>, delay: Duration) -> bool {
    let timer = sleep(delay);
    tokio::pin!(timer);
    loop {
        tokio::select! {
            _ = &mut timer => return true,
            changed = graphs.changed() => {
                if changed.is_err() {
                    return false;
                }
                timer.as_mut().reset(Instant::now() + delay);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Node, Position};

    fn graph_with(id: &str) -> Arc<Graph> {
        Arc::new(Graph {
            nodes: vec![Node {
                id: id.into(),
                position: Position { x: 0.0, y: 0.0 },
                ..Default::default()
            }],
            edges: vec![],
        })
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_changes_collapse_into_latest() {
        let (tx, rx) = watch::channel(Arc::new(Graph::default()));
        let scheduler = RenderScheduler::spawn(
            rx,
            NodeMetrics::default(),
            Duration::from_millis(50),
            RenderOptions::default(),
        );
        assert_eq!(scheduler.passes(), 1);

        for id in ["a", "b", "c"] {
            tx.send_replace(graph_with(id));
            sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(scheduler.passes(), 1, "still settling");

        sleep(Duration::from_millis(100)).await;
        assert_eq!(scheduler.passes(), 2);
        assert_eq!(scheduler.current().pass, 2);
        assert_eq!(scheduler.current().graph.nodes[0].id, "c");
    }

    #[tokio::test(start_paused = true)]
    async fn zero_delay_renders_each_change() {
        let (tx, rx) = watch::channel(Arc::new(Graph::default()));
        let scheduler =
            RenderScheduler::spawn(rx, NodeMetrics::default(), Duration::ZERO, RenderOptions::default());
        let mut frames = scheduler.frames();

        tx.send_replace(graph_with("a"));
        frames.changed().await.unwrap();
        assert_eq!(frames.borrow_and_update().graph.nodes[0].id, "a");
    }
}
