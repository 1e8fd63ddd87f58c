//! The application controller: single owner of the displayed graph.
//!
//! The graph is only ever replaced as a whole and published through a
//! `watch` channel, so every reader (scheduler, HTTP handlers) sees one
//! complete snapshot.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use kismet_core::{parse_graph, AiSettings, Graph, GraphError, ScrollRequest, Viewport};
use kismet_generate::GenerateError;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{error, info, warn};

pub const GENERATE_ERROR_MESSAGE: &str = "Failed to generate blueprint. Please try again.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    #[default]
    Idle,
    Syncing,
    Error,
}

/// Source of freshly generated graphs.
#[async_trait]
pub trait BlueprintGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Graph, GenerateError>;
}

/// Generator backed by the configured AI provider.
pub struct AiGenerator {
    settings: AiSettings,
}

impl AiGenerator {
    pub fn new(settings: AiSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl BlueprintGenerator for AiGenerator {
    async fn generate(&self, prompt: &str) -> Result<Graph, GenerateError> {
        kismet_generate::generate_blueprint(&self.settings, prompt).await
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSnapshot {
    pub status: SyncStatus,
    pub error: Option<String>,
    pub generating: bool,
    pub viewport: Viewport,
    /// Last scroll the host should perform, if any focus happened.
    pub scroll: Option<ScrollRequest>,
    pub nodes: usize,
    pub edges: usize,
}

#[derive(Debug, Default)]
struct Inner {
    status: SyncStatus,
    error: Option<String>,
    viewport: Viewport,
    scroll: Option<ScrollRequest>,
}

/// Counts one running generation for as long as it is alive, including when
/// the request future is dropped mid-flight.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct App {
    graph: watch::Sender<Arc<Graph>>,
    inner: Mutex<Inner>,
    /// Bumped on every status change so a delayed reset can tell it was superseded.
    status_epoch: AtomicU64,
    generating: AtomicUsize,
    generator: Arc<dyn BlueprintGenerator>,
}

impl App {
    pub fn new(generator: Arc<dyn BlueprintGenerator>, viewport: Viewport) -> Self {
        let (graph, _) = watch::channel(Arc::new(Graph::default()));
        Self {
            graph,
            inner: Mutex::new(Inner {
                viewport,
                ..Inner::default()
            }),
            status_epoch: AtomicU64::new(0),
            generating: AtomicUsize::new(0),
            generator,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Graph>> {
        self.graph.subscribe()
    }

    pub fn graph(&self) -> Arc<Graph> {
        self.graph.borrow().clone()
    }

    /// Swap in a new graph. Readers holding the old snapshot keep it intact.
    pub fn replace_graph(&self, graph: Graph) -> Arc<Graph> {
        let graph = Arc::new(graph);
        self.graph.send_replace(graph.clone());
        graph
    }

    /// Validate and apply pasted graph text. On failure the banner is set and
    /// nothing else changes.
    pub fn import_json(&self, text: &str) -> Result<Arc<Graph>, GraphError> {
        match parse_graph(text) {
            Ok(graph) => {
                info!(nodes = graph.nodes.len(), edges = graph.edges.len(), "graph imported");
                let graph = self.replace_graph(graph);
                self.lock().error = None;
                self.focus();
                Ok(graph)
            }
            Err(e) => {
                warn!(error = %e, "rejected graph import");
                self.lock().error = Some(format!("Invalid blueprint JSON: {e}"));
                Err(e)
            }
        }
    }

    pub fn export_json(&self) -> String {
        self.graph().to_json_pretty()
    }

    /// Ask the generator for a graph. An empty prompt does nothing and returns
    /// `Ok(None)`. Generations are not cancelled; whichever settles last wins.
    pub async fn generate(&self, prompt: &str) -> Result<Option<Arc<Graph>>, GenerateError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Ok(None);
        }

        self.lock().error = None;
        let result = {
            let _running = InFlight::enter(&self.generating);
            self.generator.generate(prompt).await
        };

        match result {
            Ok(graph) => {
                let graph = self.replace_graph(graph);
                self.focus();
                Ok(Some(graph))
            }
            Err(e) => {
                error!(error = %e, "blueprint generation failed");
                self.lock().error = Some(GENERATE_ERROR_MESSAGE.to_string());
                Err(e)
            }
        }
    }

    pub fn is_generating(&self) -> bool {
        self.generating.load(Ordering::SeqCst) > 0
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn dismiss_error(&self) {
        self.lock().error = None;
    }

    pub fn status(&self) -> SyncStatus {
        self.lock().status
    }

    pub fn set_status(&self, status: SyncStatus) {
        self.status_epoch.fetch_add(1, Ordering::SeqCst);
        self.lock().status = status;
    }

    /// Show `status` for `hold`, then fall back to idle unless another status
    /// change happened in between.
    pub fn hold_status(self: &Arc<Self>, status: SyncStatus, hold: Duration) {
        let epoch = self.status_epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.lock().status = status;

        let app = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(hold).await;
            if app.status_epoch.load(Ordering::SeqCst) == epoch {
                app.lock().status = SyncStatus::Idle;
            }
        });
    }

    /// Scroll so the top-left-most node sits at the viewport's top-left.
    pub fn focus(&self) -> Option<ScrollRequest> {
        let graph = self.graph();
        let mut inner = self.lock();
        let request = inner.viewport.focus(&graph)?;
        inner.scroll = Some(request);
        Some(request)
    }

    pub fn resize(&self, width: f64, height: f64) {
        self.lock().viewport.resize(width, height);
    }

    pub fn viewport(&self) -> Viewport {
        self.lock().viewport
    }

    pub fn snapshot(&self) -> AppSnapshot {
        let graph = self.graph();
        let inner = self.lock();
        AppSnapshot {
            status: inner.status,
            error: inner.error.clone(),
            generating: self.is_generating(),
            viewport: inner.viewport,
            scroll: inner.scroll,
            nodes: graph.nodes.len(),
            edges: graph.edges.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kismet_core::{Node, Position};

    struct Fixed(Result<Graph, ()>);

    #[async_trait]
    impl BlueprintGenerator for Fixed {
        async fn generate(&self, _prompt: &str) -> Result<Graph, GenerateError> {
            self.0.clone().map_err(|()| GenerateError::EmptyResponse)
        }
    }

    /// Answers after `delay` with a single node whose id is the prompt.
    struct Slow(Duration);

    #[async_trait]
    impl BlueprintGenerator for Slow {
        async fn generate(&self, prompt: &str) -> Result<Graph, GenerateError> {
            let delay = if prompt == "slow" { self.0 * 2 } else { self.0 };
            tokio::time::sleep(delay).await;
            Ok(Graph {
                nodes: vec![Node {
                    id: prompt.into(),
                    ..Default::default()
                }],
                edges: vec![],
            })
        }
    }

    fn one_node() -> Graph {
        Graph {
            nodes: vec![Node {
                id: "a".into(),
                position: Position { x: 100.0, y: 200.0 },
                ..Default::default()
            }],
            edges: vec![],
        }
    }

    fn app(result: Result<Graph, ()>) -> Arc<App> {
        Arc::new(App::new(Arc::new(Fixed(result)), Viewport::default()))
    }

    #[tokio::test]
    async fn generation_failure_keeps_graph_and_sets_banner() {
        let app = app(Err(()));
        app.replace_graph(one_node());
        assert!(app.generate("toggle a light").await.is_err());
        assert_eq!(app.graph().nodes.len(), 1);
        assert_eq!(app.error().as_deref(), Some(GENERATE_ERROR_MESSAGE));
        app.dismiss_error();
        assert_eq!(app.error(), None);
    }

    #[tokio::test]
    async fn generation_success_replaces_and_focuses() {
        let app = app(Ok(one_node()));
        let graph = app.generate("  toggle  ").await.unwrap().unwrap();
        assert_eq!(graph.nodes[0].id, "a");
        let scroll = app.snapshot().scroll.unwrap();
        assert_eq!((scroll.left, scroll.top), (2100.0, 2200.0));
    }

    #[tokio::test]
    async fn blank_prompt_is_noop() {
        let app = app(Err(()));
        assert!(app.generate("   ").await.unwrap().is_none());
        assert_eq!(app.error(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_generation_clears_the_flag() {
        let app = Arc::new(App::new(Arc::new(Slow(Duration::from_secs(60))), Viewport::default()));
        let attempt = tokio::time::timeout(Duration::from_millis(10), app.generate("fast")).await;
        assert!(attempt.is_err());
        assert!(!app.is_generating());
        assert!(app.graph().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn later_settling_generation_wins() {
        let app = Arc::new(App::new(Arc::new(Slow(Duration::from_millis(100))), Viewport::default()));

        let slow = tokio::spawn({
            let app = app.clone();
            async move { app.generate("slow").await.map(|g| g.is_some()) }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        let fast = tokio::spawn({
            let app = app.clone();
            async move { app.generate("fast").await.map(|g| g.is_some()) }
        });

        // fast settles at 110 ms, slow at 200 ms
        tokio::time::sleep(Duration::from_millis(140)).await;
        assert_eq!(app.graph().nodes[0].id, "fast");
        assert!(app.is_generating());

        assert!(slow.await.unwrap().unwrap());
        assert!(fast.await.unwrap().unwrap());
        assert_eq!(app.graph().nodes[0].id, "slow");
        assert!(!app.is_generating());
    }

    #[test]
    fn bad_import_leaves_state_alone() {
        let app = app(Err(()));
        app.replace_graph(one_node());
        assert!(app.import_json("{\"edges\": []}").is_err());
        assert!(app.error().unwrap().starts_with("Invalid blueprint JSON: "));
        assert_eq!(app.graph().nodes.len(), 1);

        app.import_json(r#"{"nodes": [], "edges": []}"#).unwrap();
        assert_eq!(app.error(), None);
        assert!(app.graph().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn held_status_returns_to_idle_unless_superseded() {
        let app = app(Err(()));
        app.hold_status(SyncStatus::Syncing, Duration::from_millis(1500));
        assert_eq!(app.status(), SyncStatus::Syncing);
        tokio::time::sleep(Duration::from_millis(1600)).await;
        assert_eq!(app.status(), SyncStatus::Idle);

        app.hold_status(SyncStatus::Syncing, Duration::from_millis(1500));
        app.set_status(SyncStatus::Error);
        tokio::time::sleep(Duration::from_millis(1600)).await;
        assert_eq!(app.status(), SyncStatus::Error);
    }
}
