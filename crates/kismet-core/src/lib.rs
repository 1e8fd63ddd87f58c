pub mod anchor;
pub mod connector;
pub mod diagram;
pub mod fingerprint;
pub mod geometry;
pub mod graph;
pub mod layout;
pub mod library;
pub mod palette;
pub mod render;
pub mod scene;
pub mod scheduler;
pub mod settings;
pub mod sync;
pub mod viewport;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub use anchor::{resolve_anchors, EdgeAnchors, PinKey, RenderSurface};
pub use connector::{build_connector, Connector, ConnectorStyle};
pub use fingerprint::Fingerprint;
pub use geometry::{Point, Rect};
pub use graph::{parse_graph, Edge, Graph, GraphError, Node, NodeType, Pin, PinType, Position};
pub use layout::{MeasuredLayout, NodeMetrics};
pub use render::{render_connectors, ConnectorSet, RenderFrame, RenderOptions};
pub use scheduler::RenderScheduler;
pub use settings::{AiSettings, Settings, ViewerSettings};
pub use viewport::{Canvas, ScrollBehavior, ScrollRequest, Viewport};

// --- Storage ---

/// Resolve the global data directory (~/.kismet/).
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".kismet")
}

/// Write a file atomically (temp file + rename) so readers never observe a
/// truncated document.
pub fn write_atomic(path: &Path, data: &str) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "kismet".to_string());
    let tmp = path.with_file_name(format!(".{}.tmp", file_name));
    fs::write(&tmp, data)?;
    fs::rename(&tmp, path)
}
