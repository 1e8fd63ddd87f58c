#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use kismet_core::diagram::{DiagramEngine, DiagramError};
use kismet_core::library::DiagramLibrary;
use kismet_core::{Graph, Settings};
use kismet_generate::GenerateError;
use kismet_viewer::app::BlueprintGenerator;
use kismet_viewer::Viewer;
use serde_json::{json, Value};

pub fn light_toggle() -> Value {
    json!({
        "nodes": [
            {"id": "key_f", "title": "F", "type": "EVENT", "inputs": [],
             "outputs": [{"id": "pressed", "name": "Pressed", "type": "EXEC"}],
             "position": {"x": 0, "y": 0}},
            {"id": "light", "title": "Toggle Visibility", "type": "FUNCTION",
             "inputs": [{"id": "exec", "name": "", "type": "EXEC"}],
             "outputs": [], "position": {"x": 300, "y": 0}}
        ],
        "edges": [
            {"id": "e1", "fromNodeId": "key_f", "fromPinId": "pressed", "toNodeId": "light", "toPinId": "exec"}
        ]
    })
}

/// Generator that always fails, or always returns the given graph.
pub struct FixedGenerator(pub Option<Graph>);

#[async_trait]
impl BlueprintGenerator for FixedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<Graph, GenerateError> {
        self.0.clone().ok_or(GenerateError::EmptyResponse)
    }
}

/// Engine that echoes the first line and rejects anything containing "!!".
pub struct EchoEngine;

impl DiagramEngine for EchoEngine {
    fn render(&self, render_id: &str, code: &str) -> Result<String, DiagramError> {
        if code.contains("!!") {
            return Err(DiagramError::Syntax("bad token".into()));
        }
        Ok(format!(
            r#"<svg id="{render_id}"><text font-size="20">{}</text></svg>"#,
            code.lines().next().unwrap_or_default()
        ))
    }
}

pub fn settings() -> Settings {
    let mut settings = Settings::default();
    settings.viewer.settle_delay_ms = 0;
    settings
}

/// A viewer with an isolated diagram library. Keep the tempdir alive.
pub fn viewer(generator: FixedGenerator) -> (tempfile::TempDir, Viewer) {
    let dir = tempfile::tempdir().unwrap();
    let library = DiagramLibrary::open(dir.path().join("kismet-diagrams.json"));
    let viewer = Viewer::new(&settings(), Arc::new(generator), library, Arc::new(EchoEngine));
    (dir, viewer)
}

/// Serve `router` on an ephemeral port and return its base URL.
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}
