//! Blueprint graphs and diagram text from a natural-language prompt.

pub mod engine;
mod parse;
mod prompt;

use kismet_core::diagram::DiagramKind;
use kismet_core::{AiSettings, Graph, GraphError};
use thiserror::Error;
use tracing::{debug, info, warn};

pub use parse::{parse_blueprint, parse_diagram};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("AI provider is not configured (set provider, model and API key)")]
    NotConfigured,
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("{0}")]
    Backend(String),
    #[error("model returned an empty response")]
    EmptyResponse,
    #[error("model response contained no JSON object")]
    NoJson,
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Generate a blueprint graph for `prompt`.
pub async fn generate_blueprint(settings: &AiSettings, prompt: &str) -> Result<Graph, GenerateError> {
    let system = prompt::blueprint_system_prompt();
    let user_msg = prompt::blueprint_user_message(prompt);

    info!(provider = %settings.provider, model = %settings.model, "generating blueprint");

    let raw = engine::complete(settings, &system, &user_msg).await?;
    debug!(bytes = raw.len(), "raw model output received");
    match parse::parse_blueprint(&raw) {
        Ok(graph) => {
            info!(nodes = graph.nodes.len(), edges = graph.edges.len(), "blueprint generated");
            Ok(graph)
        }
        Err(e) => {
            warn!(error = %e, "model output was not a usable graph");
            Err(e)
        }
    }
}

/// Generate diagram source of `kind` for `prompt`.
pub async fn generate_diagram(
    settings: &AiSettings,
    kind: DiagramKind,
    prompt: &str,
) -> Result<String, GenerateError> {
    let system = prompt::diagram_system_prompt(kind);
    let user_msg = prompt::diagram_user_message(kind, prompt);

    info!(provider = %settings.provider, kind = %kind, "generating diagram");

    let raw = engine::complete(settings, &system, &user_msg).await?;
    parse::parse_diagram(&raw, kind)
}
