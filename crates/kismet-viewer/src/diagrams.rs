//! Diagram library routes. Every diagram gets its own renderer so one bad
//! document never disturbs another's output.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use kismet_core::diagram::{DiagramEngine, DiagramKind, DiagramRenderer, DiagramView};
use kismet_core::library::{DiagramLibrary, StoreError};
use kismet_core::AiSettings;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::server::ServerState;

pub struct DiagramState {
    library: Mutex<DiagramLibrary>,
    renderers: Mutex<HashMap<String, DiagramRenderer<Arc<dyn DiagramEngine>>>>,
    engine: Arc<dyn DiagramEngine>,
    ai: AiSettings,
}

fn recover<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    match lock.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl DiagramState {
    pub fn new(library: DiagramLibrary, engine: Arc<dyn DiagramEngine>, ai: AiSettings) -> Self {
        Self {
            library: Mutex::new(library),
            renderers: Mutex::new(HashMap::new()),
            engine,
            ai,
        }
    }

    /// Render the stored code of `id` and return the resulting view.
    pub fn render(&self, id: &str) -> Result<DiagramView, StoreError> {
        let code = recover(&self.library)
            .get(id)
            .map(|d| d.code.clone())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let mut renderers = recover(&self.renderers);
        let renderer = renderers
            .entry(id.to_string())
            .or_insert_with(|| DiagramRenderer::new(self.engine.clone()));
        Ok(renderer.render(&code).clone())
    }

    pub fn retry(&self, id: &str) -> Result<DiagramView, StoreError> {
        let mut renderers = recover(&self.renderers);
        match renderers.get_mut(id) {
            Some(renderer) => Ok(renderer.retry().clone()),
            None => {
                drop(renderers);
                self.render(id)
            }
        }
    }

    fn forget(&self, id: &str) {
        recover(&self.renderers).remove(id);
    }
}

pub fn routes() -> Router<ServerState> {
    Router::new()
        .route("/api/diagrams", get(list).post(create))
        .route("/api/diagrams/:id", get(show).put(update).delete(remove))
        .route("/api/diagrams/:id/select", post(select))
        .route("/api/diagrams/:id/render", post(render))
        .route("/api/diagrams/:id/retry", post(retry))
        .route("/api/diagrams/:id/generate", post(generate))
}

fn store_error(e: StoreError) -> Response {
    let status = match e {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "ok": false, "error": e.to_string() }))).into_response()
}

fn listing(library: &DiagramLibrary) -> Response {
    Json(json!({
        "activeId": library.active_id(),
        "diagrams": library.diagrams(),
    }))
    .into_response()
}

async fn list(State(state): State<ServerState>) -> Response {
    listing(&recover(&state.diagrams.library))
}

#[derive(Deserialize)]
struct CreateBody {
    #[serde(rename = "type")]
    kind: DiagramKind,
}

async fn create(State(state): State<ServerState>, Json(body): Json<CreateBody>) -> Response {
    let mut library = recover(&state.diagrams.library);
    match library.create(body.kind) {
        Ok(doc) => (StatusCode::CREATED, Json(json!(doc))).into_response(),
        Err(e) => store_error(e),
    }
}

async fn show(State(state): State<ServerState>, Path(id): Path<String>) -> Response {
    match recover(&state.diagrams.library).get(&id) {
        Some(doc) => Json(json!(doc)).into_response(),
        None => store_error(StoreError::NotFound(id)),
    }
}

#[derive(Deserialize)]
struct UpdateBody {
    name: Option<String>,
    code: Option<String>,
}

async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateBody>,
) -> Response {
    let mut library = recover(&state.diagrams.library);
    let result = body
        .name
        .as_deref()
        .map_or(Ok(()), |name| library.rename(&id, name))
        .and_then(|()| {
            body.code
                .as_deref()
                .map_or(Ok(()), |code| library.update_code(&id, code))
        });
    match result {
        Ok(()) => Json(json!(library.get(&id))).into_response(),
        Err(e) => store_error(e),
    }
}

async fn remove(State(state): State<ServerState>, Path(id): Path<String>) -> Response {
    let result = recover(&state.diagrams.library).delete(&id);
    match result {
        Ok(()) => {
            state.diagrams.forget(&id);
            list(State(state)).await
        }
        Err(e) => store_error(e),
    }
}

async fn select(State(state): State<ServerState>, Path(id): Path<String>) -> Response {
    let mut library = recover(&state.diagrams.library);
    match library.select(&id) {
        Ok(()) => listing(&library),
        Err(e) => store_error(e),
    }
}

async fn render(State(state): State<ServerState>, Path(id): Path<String>) -> Response {
    match state.diagrams.render(&id) {
        Ok(view) => Json(json!(view)).into_response(),
        Err(e) => store_error(e),
    }
}

async fn retry(State(state): State<ServerState>, Path(id): Path<String>) -> Response {
    match state.diagrams.retry(&id) {
        Ok(view) => Json(json!(view)).into_response(),
        Err(e) => store_error(e),
    }
}

#[derive(Deserialize)]
struct PromptBody {
    prompt: String,
}

/// Replace a diagram's code with freshly generated text, then render it.
async fn generate(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(body): Json<PromptBody>,
) -> Response {
    let kind = match recover(&state.diagrams.library).get(&id) {
        Some(doc) => doc.kind,
        None => return store_error(StoreError::NotFound(id)),
    };
    let code = match kismet_generate::generate_diagram(&state.diagrams.ai, kind, &body.prompt).await {
        Ok(code) => code,
        Err(e) => {
            warn!(error = %e, diagram = %id, "diagram generation failed");
            return (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "ok": false, "error": e.to_string() })),
            )
                .into_response();
        }
    };
    let saved = recover(&state.diagrams.library).update_code(&id, &code);
    match saved.and_then(|()| state.diagrams.render(&id)) {
        Ok(view) => Json(json!(view)).into_response(),
        Err(e) => store_error(e),
    }
}
