use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use kismet_core::diagram::{default_engine, DiagramRenderer, DiagramView};
use kismet_core::library::DiagramLibrary;
use kismet_core::scene::render_scene;
use kismet_core::settings::read_settings;
use kismet_core::{parse_graph, NodeMetrics, RenderFrame};
use kismet_viewer::app::AiGenerator;
use kismet_viewer::poller::{HttpSyncSource, SyncPoller};
use kismet_viewer::{init_tracing, server, Viewer};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "kismet-viewer", version, about = "Live Unreal Blueprint graph visualizer")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the visualizer and the /api/sync endpoint (default).
    Serve {
        #[arg(long)]
        port: Option<u16>,
        /// Endpoint to poll for pushed graphs. Defaults to this server's own.
        #[arg(long)]
        sync_url: Option<String>,
        #[arg(long)]
        no_poll: bool,
    },
    /// Render a blueprint JSON file to SVG.
    Render {
        file: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render diagram text (class, sequence, state, flowchart) to SVG.
    Diagram {
        file: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing("info");
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve {
        port: None,
        sync_url: None,
        no_poll: false,
    }) {
        Command::Serve {
            port,
            sync_url,
            no_poll,
        } => serve(port, sync_url, no_poll).await,
        Command::Render { file, output } => {
            let text = std::fs::read_to_string(&file)?;
            let graph = parse_graph(&text)?;
            let settings = read_settings();
            let frame = RenderFrame::build(
                Arc::new(graph),
                &NodeMetrics::default(),
                settings.viewer.render_options(),
            );
            if frame.connectors.skipped > 0 {
                warn!(skipped = frame.connectors.skipped, "some edges could not be drawn");
            }
            write_output(output, &render_scene(&frame))
        }
        Command::Diagram { file, output } => {
            let code = std::fs::read_to_string(&file)?;
            let mut renderer = DiagramRenderer::new(default_engine());
            match renderer.render(&code) {
                DiagramView::Rendered { svg, .. } => write_output(output, svg),
                DiagramView::Failed { message, detail, .. } => Err(format!("{message} ({detail})").into()),
                _ => Ok(()),
            }
        }
    }
}

async fn serve(port: Option<u16>, sync_url: Option<String>, no_poll: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = read_settings();
    if let Some(port) = port {
        settings.viewer.port = port;
        if sync_url.is_none() {
            settings.viewer.sync_url = format!("http://localhost:{port}/api/sync");
        }
    }
    if let Some(url) = sync_url {
        settings.viewer.sync_url = url;
    }
    if !settings.ai.is_configured() {
        warn!("AI provider not configured; generation requests will fail");
    }

    let viewer = Viewer::new(
        &settings,
        Arc::new(AiGenerator::new(settings.ai.clone())),
        DiagramLibrary::open_default(),
        default_engine(),
    );

    let poller = (!no_poll).then(|| {
        info!(url = %settings.viewer.sync_url, "polling for pushed graphs");
        SyncPoller::new(
            HttpSyncSource::new(settings.viewer.sync_url.clone()),
            viewer.app().clone(),
            settings.viewer.poll_interval(),
            settings.viewer.status_hold(),
        )
        .spawn()
    });

    server::serve(viewer.state.clone(), settings.viewer.port).await?;
    if let Some(handle) = poller {
        handle.abort();
    }
    Ok(())
}

fn write_output(output: Option<PathBuf>, svg: &str) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => {
            kismet_core::write_atomic(&path, svg)?;
            info!(path = %path.display(), "wrote svg");
        }
        None => println!("{svg}"),
    }
    Ok(())
}
