use kismet_core::settings::read_settings;
use kismet_mcp::init;
use kismet_mcp::KismetServer;
use rmcp::ServiceExt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::args().nth(1).as_deref() == Some("init") {
        if let Err(e) = run_init() {
            eprintln!("kismet-mcp init: {e}");
            std::process::exit(1);
        }
        return Ok(());
    }

    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let settings = read_settings();
    if !settings.ai.is_configured() {
        warn!("no AI provider configured; tool calls will fail");
    }
    info!(sync_url = %settings.viewer.sync_url, "blueprint server starting");

    let service = KismetServer::new(settings)
        .serve(rmcp::transport::io::stdio())
        .await
        .inspect_err(|e| tracing::error!("MCP server error: {}", e))?;
    info!("connected to stdio");
    service.waiting().await?;
    Ok(())
}

/// Register this binary with every MCP client installed here, scoped to the
/// current directory.
fn run_init() -> Result<(), Box<dyn std::error::Error>> {
    let binary = std::env::current_exe()?.canonicalize()?;
    let project = std::env::current_dir()?;
    let clients = init::installed_clients();

    for path in init::init_project(&project, &binary.to_string_lossy(), &clients)? {
        eprintln!("Wrote {}", path.display());
    }
    let names: Vec<&str> = clients.iter().map(|c| c.label()).collect();
    eprintln!("\nDone. {} can now generate blueprints with kismet.", names.join(" and "));
    Ok(())
}
