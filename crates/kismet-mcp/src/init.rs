//! `kismet-mcp init`: register this binary with the MCP clients installed on
//! this machine, in project-scoped config files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use thiserror::Error;
use toml_edit::{Array, DocumentMut, Item, Table};

pub const SERVER_NAME: &str = "kismet";

#[derive(Debug, Error)]
pub enum InitError {
    #[error("neither `claude` nor `codex` found in PATH; install Claude Code or OpenAI Codex first")]
    NoClients,
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// An existing config we would have to overwrite to register ourselves.
    #[error("{path} is not valid {format}; fix or remove it and re-run init")]
    Unreadable { path: PathBuf, format: &'static str },
}

/// MCP clients that read a project-scoped server list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McpClient {
    ClaudeCode,
    Codex,
}

impl McpClient {
    pub const ALL: [McpClient; 2] = [McpClient::ClaudeCode, McpClient::Codex];

    pub fn label(self) -> &'static str {
        match self {
            McpClient::ClaudeCode => "Claude Code",
            McpClient::Codex => "Codex",
        }
    }

    /// Executable whose presence on PATH means the client is installed.
    pub fn executable(self) -> &'static str {
        match self {
            McpClient::ClaudeCode => "claude",
            McpClient::Codex => "codex",
        }
    }

    pub fn config_path(self, project: &Path) -> PathBuf {
        match self {
            McpClient::ClaudeCode => project.join(".mcp.json"),
            McpClient::Codex => project.join(".codex").join("config.toml"),
        }
    }

    pub fn is_installed(self) -> bool {
        which::which(self.executable()).is_ok()
    }

    /// Add or replace the `kismet` entry in this client's config under
    /// `project`, keeping every other entry. Returns the file written.
    pub fn register(self, project: &Path, binary_path: &str) -> Result<PathBuf, InitError> {
        let path = self.config_path(project);
        let existing = match fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(source) => return Err(InitError::Io { path, source }),
        };
        let merged = match self {
            McpClient::ClaudeCode => merge_mcp_json(existing.as_deref(), binary_path)
                .ok_or_else(|| InitError::Unreadable { path: path.clone(), format: "JSON" })?,
            McpClient::Codex => merge_codex_toml(existing.as_deref(), binary_path)
                .ok_or_else(|| InitError::Unreadable { path: path.clone(), format: "TOML" })?,
        };
        kismet_core::write_atomic(&path, &merged).map_err(|source| InitError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Clients found on PATH, in a stable order.
pub fn installed_clients() -> Vec<McpClient> {
    McpClient::ALL.into_iter().filter(|c| c.is_installed()).collect()
}

/// Register `binary_path` with each of `clients` under `project`.
pub fn init_project(
    project: &Path,
    binary_path: &str,
    clients: &[McpClient],
) -> Result<Vec<PathBuf>, InitError> {
    if clients.is_empty() {
        return Err(InitError::NoClients);
    }
    clients
        .iter()
        .map(|client| client.register(project, binary_path))
        .collect()
}

/// `None` when `existing` is present but is not a JSON object.
fn merge_mcp_json(existing: Option<&str>, binary_path: &str) -> Option<String> {
    let mut root = match existing {
        Some(text) => serde_json::from_str::<Value>(text).ok().filter(Value::is_object)?,
        None => json!({}),
    };
    if !root.get("mcpServers").is_some_and(Value::is_object) {
        root["mcpServers"] = json!({});
    }
    root["mcpServers"][SERVER_NAME] = json!({
        "type": "stdio",
        "command": binary_path,
        "args": [],
    });
    serde_json::to_string_pretty(&root).ok()
}

/// `None` when `existing` is present but does not parse. Formatting and
/// comments of the rest of the document are preserved.
fn merge_codex_toml(existing: Option<&str>, binary_path: &str) -> Option<String> {
    let mut doc = match existing {
        Some(text) => text.parse::<DocumentMut>().ok()?,
        None => DocumentMut::new(),
    };
    if !doc.contains_table("mcp_servers") {
        doc["mcp_servers"] = Item::Table(Table::new());
    }
    let mut server = Table::new();
    server.insert("command", toml_edit::value(binary_path));
    server.insert("args", toml_edit::value(Array::new()));
    doc["mcp_servers"][SERVER_NAME] = Item::Table(server);
    Some(doc.to_string())
}
