//! HTTP surface: the `/api/sync` slot, the rendered scene and the controls the
//! page drives.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use kismet_core::scene::render_scene;
use kismet_core::sync::SyncSlot;
use kismet_core::RenderFrame;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tracing::{debug, info};

use crate::app::{App, GENERATE_ERROR_MESSAGE};
use crate::diagrams::{self, DiagramState};
use crate::page;

#[derive(Clone)]
pub struct ServerState {
    pub app: Arc<App>,
    pub slot: Arc<dyn SyncSlot>,
    pub frames: watch::Receiver<Arc<RenderFrame>>,
    pub diagrams: Arc<DiagramState>,
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/scene.svg", get(scene))
        .route("/api/sync", get(read_sync).post(write_sync))
        .route("/api/state", get(app_state))
        .route("/api/import", post(import))
        .route("/api/export", get(export))
        .route("/api/generate", post(generate))
        .route("/api/focus", post(focus))
        .route("/api/dismiss", post(dismiss))
        .route("/api/viewport", post(resize))
        .merge(diagrams::routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process is interrupted.
pub async fn serve(state: ServerState, port: u16) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    info!(addr = %listener.local_addr()?, "viewer listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
}

fn rejected(status: StatusCode, error: impl ToString) -> Response {
    (status, Json(json!({ "ok": false, "error": error.to_string() }))).into_response()
}

async fn index() -> Html<&'static str> {
    Html(page::INDEX)
}

async fn scene(State(state): State<ServerState>) -> impl IntoResponse {
    let frame = state.frames.borrow().clone();
    (
        [
            (header::CONTENT_TYPE, "image/svg+xml".to_string()),
            (header::HeaderName::from_static("x-kismet-frame"), frame.pass.to_string()),
        ],
        render_scene(&frame),
    )
}

async fn read_sync(State(state): State<ServerState>) -> Json<Value> {
    Json(state.slot.read().unwrap_or(Value::Null))
}

async fn write_sync(State(state): State<ServerState>, body: Bytes) -> Response {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => return rejected(StatusCode::BAD_REQUEST, format!("invalid JSON: {e}")),
    };
    match state.slot.write(payload) {
        Ok(()) => {
            debug!(bytes = body.len(), "sync payload stored");
            Json(json!({ "ok": true })).into_response()
        }
        Err(e) => rejected(StatusCode::BAD_REQUEST, e),
    }
}

async fn app_state(State(state): State<ServerState>) -> Json<Value> {
    let frame = state.frames.borrow().clone();
    let snapshot = state.app.snapshot();
    Json(json!({
        "app": snapshot,
        "frame": frame.pass,
        "connectors": frame.connectors.len(),
        "skippedEdges": frame.connectors.skipped,
    }))
}

async fn import(State(state): State<ServerState>, body: String) -> Response {
    match state.app.import_json(&body) {
        Ok(graph) => Json(json!({ "ok": true, "nodes": graph.nodes.len() })).into_response(),
        Err(_) => rejected(
            StatusCode::BAD_REQUEST,
            state.app.error().unwrap_or_default(),
        ),
    }
}

async fn export(State(state): State<ServerState>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"blueprint.json\""),
        ],
        state.app.export_json(),
    )
}

#[derive(Deserialize)]
struct PromptBody {
    #[serde(default)]
    prompt: String,
}

async fn generate(State(state): State<ServerState>, Json(body): Json<PromptBody>) -> Response {
    match state.app.generate(&body.prompt).await {
        Ok(Some(graph)) => Json(json!({ "ok": true, "nodes": graph.nodes.len() })).into_response(),
        Ok(None) => Json(json!({ "ok": true, "nodes": null })).into_response(),
        Err(_) => rejected(StatusCode::BAD_GATEWAY, GENERATE_ERROR_MESSAGE),
    }
}

async fn focus(State(state): State<ServerState>) -> Json<Value> {
    Json(json!(state.app.focus()))
}

async fn dismiss(State(state): State<ServerState>) -> StatusCode {
    state.app.dismiss_error();
    StatusCode::NO_CONTENT
}

#[derive(Deserialize)]
struct ViewportSize {
    width: f64,
    height: f64,
}

async fn resize(State(state): State<ServerState>, Json(size): Json<ViewportSize>) -> StatusCode {
    state.app.resize(size.width, size.height);
    StatusCode::NO_CONTENT
}
