use kismet_core::parse_graph;
use kismet_mcp::init::{init_project, InitError, McpClient};
use kismet_mcp::{push_to_viewer, sync_message};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn graph() -> kismet_core::Graph {
    parse_graph(r#"{"nodes":[{"id":"a","title":"BeginPlay","type":"EVENT"}],"edges":[]}"#).unwrap()
}

#[tokio::test]
async fn push_reports_viewer_acceptance() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/sync"))
        .and(body_partial_json(serde_json::json!({"nodes": [{"id": "a"}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    assert!(push_to_viewer(&client, &format!("{}/api/sync", server.uri()), &graph()).await);
}

#[tokio::test]
async fn push_failure_is_reported_not_raised() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    assert!(!push_to_viewer(&client, &format!("{}/api/sync", server.uri()), &graph()).await);
    // Nothing listens on port 9 on a test machine.
    assert!(!push_to_viewer(&client, "http://127.0.0.1:9/api/sync", &graph()).await);
}

#[test]
fn messages_differ_by_sync_outcome() {
    let ok = sync_message("light toggle", true, "http://localhost:5173/api/sync");
    let manual = sync_message("light toggle", false, "http://localhost:5173/api/sync");
    assert!(ok.contains("synced"));
    assert!(manual.contains("Manual sync required"));
    assert_ne!(ok, manual);
}

#[test]
fn init_merges_existing_configs() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".mcp.json"),
        r#"{"mcpServers":{"other":{"command":"x"}}}"#,
    )
    .unwrap();
    std::fs::create_dir_all(dir.path().join(".codex")).unwrap();
    std::fs::write(
        dir.path().join(".codex/config.toml"),
        "model = \"o3\"\n",
    )
    .unwrap();

    let written = init_project(dir.path(), "/bin/kismet-mcp", &McpClient::ALL).unwrap();
    assert_eq!(written, vec![dir.path().join(".mcp.json"), dir.path().join(".codex/config.toml")]);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join(".mcp.json")).unwrap()).unwrap();
    assert_eq!(json["mcpServers"]["other"]["command"], "x");
    assert_eq!(json["mcpServers"]["kismet"]["command"], "/bin/kismet-mcp");

    let toml = std::fs::read_to_string(dir.path().join(".codex/config.toml")).unwrap();
    assert!(toml.contains("model = \"o3\""));
    assert!(toml.contains("[mcp_servers.kismet]"));
}

#[test]
fn init_refuses_to_clobber_an_unreadable_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".mcp.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = McpClient::ClaudeCode.register(dir.path(), "/bin/kismet-mcp").unwrap_err();
    assert!(matches!(err, InitError::Unreadable { format: "JSON", .. }));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
}
