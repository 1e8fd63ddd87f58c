pub mod init;

use kismet_core::{Graph, Settings};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use serde::Deserialize;
use tracing::{error, info, warn};

const INSTRUCTIONS: &str = r#"Kismet generates Unreal Engine Blueprint visual scripting graphs.

Call `generate_unreal_blueprint` with a plain-language description of the logic
(e.g. "pressing F toggles a light on and off"). The graph is pushed to the
Kismet viewer if it is running; otherwise the JSON in the second content item
can be imported into the viewer by hand."#;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GenerateBlueprintRequest {
    /// The logic description (e.g. 'A light toggle system')
    pub prompt: String,
}

/// POST `graph` to the viewer's sync endpoint. Returns whether the viewer
/// accepted it; failures are logged, never raised.
pub async fn push_to_viewer(client: &reqwest::Client, sync_url: &str, graph: &Graph) -> bool {
    match client.post(sync_url).json(graph).send().await {
        Ok(resp) if resp.status().is_success() => true,
        Ok(resp) => {
            warn!(status = %resp.status(), url = sync_url, "viewer rejected the graph");
            false
        }
        Err(e) => {
            warn!(error = %e, url = sync_url, "sync broadcast failed; is the viewer running?");
            false
        }
    }
}

/// First content item of a successful tool call.
pub fn sync_message(prompt: &str, synced: bool, sync_url: &str) -> String {
    if synced {
        format!("Blueprint generated and synced to visualizer for: {prompt}")
    } else {
        format!("Blueprint generated for: {prompt}. (Manual sync required - viewer not reachable at {sync_url})")
    }
}

// --- Server ---

#[derive(Clone)]
pub struct KismetServer {
    tool_router: ToolRouter<Self>,
    settings: Settings,
    client: reqwest::Client,
}

#[tool_router]
impl KismetServer {
    pub fn new(settings: Settings) -> Self {
        Self {
            tool_router: Self::tool_router(),
            settings,
            client: reqwest::Client::new(),
        }
    }

    #[tool(
        description = "Generates an Unreal Engine Blueprint visual script graph and updates the live visualizer app automatically."
    )]
    async fn generate_unreal_blueprint(
        &self,
        Parameters(req): Parameters<GenerateBlueprintRequest>,
    ) -> Result<CallToolResult, McpError> {
        if !self.settings.ai.is_configured() {
            error!("AI provider is not configured");
            return Ok(CallToolResult::error(vec![Content::text(
                "Error: no AI provider configured. Set KISMET_API_KEY (or API_KEY) and, if needed, KISMET_PROVIDER / KISMET_MODEL in the MCP configuration.",
            )]));
        }

        info!(prompt = %req.prompt, "processing prompt");
        let graph = match kismet_generate::generate_blueprint(&self.settings.ai, &req.prompt).await {
            Ok(graph) => graph,
            Err(e) => {
                error!(error = %e, "tool execution failed");
                return Ok(CallToolResult::error(vec![Content::text(format!(
                    "AI Generation Error: {e}"
                ))]));
            }
        };

        let json = graph.to_json_pretty();
        let sync_url = &self.settings.viewer.sync_url;
        let synced = push_to_viewer(&self.client, sync_url, &graph).await;

        Ok(CallToolResult::success(vec![
            Content::text(sync_message(&req.prompt, synced, sync_url)),
            Content::text(json),
        ]))
    }
}

#[tool_handler]
impl ServerHandler for KismetServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
