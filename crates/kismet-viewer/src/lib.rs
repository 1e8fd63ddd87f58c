//! The Kismet visualizer process: application controller, live sync poller
//! and the HTTP surface around them.

pub mod app;
pub mod diagrams;
mod page;
pub mod poller;
pub mod server;

use std::sync::Arc;

use axum::Router;
use kismet_core::diagram::DiagramEngine;
use kismet_core::library::DiagramLibrary;
use kismet_core::sync::{MemorySlot, SyncSlot};
use kismet_core::{NodeMetrics, RenderScheduler, Settings, Viewport};
use tracing_subscriber::EnvFilter;

use crate::app::{App, BlueprintGenerator};
use crate::diagrams::DiagramState;
use crate::server::ServerState;

/// Install the stderr `fmt` subscriber. `RUST_LOG` wins over `default`.
pub fn init_tracing(default: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Everything a running viewer needs, wired together. Must be created inside
/// a tokio runtime: the render scheduler starts immediately.
pub struct Viewer {
    pub state: ServerState,
    scheduler: RenderScheduler,
}

impl Viewer {
    pub fn new(
        settings: &Settings,
        generator: Arc<dyn BlueprintGenerator>,
        library: DiagramLibrary,
        engine: Arc<dyn DiagramEngine>,
    ) -> Self {
        let metrics = NodeMetrics::default();
        let app = Arc::new(App::new(generator, Viewport::new(metrics.canvas, 1280.0, 720.0)));
        let scheduler = RenderScheduler::spawn(
            app.subscribe(),
            metrics,
            settings.viewer.settle_delay(),
            settings.viewer.render_options(),
        );
        let slot: Arc<dyn SyncSlot> = Arc::new(MemorySlot::new());
        let state = ServerState {
            app,
            slot,
            frames: scheduler.frames(),
            diagrams: Arc::new(DiagramState::new(library, engine, settings.ai.clone())),
        };
        Self { state, scheduler }
    }

    pub fn app(&self) -> &Arc<App> {
        &self.state.app
    }

    pub fn scheduler(&self) -> &RenderScheduler {
        &self.scheduler
    }

    pub fn router(&self) -> Router {
        server::router(self.state.clone())
    }
}
