//! One connector pass over a whole graph.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::anchor::{resolve_anchors, RenderSurface};
use crate::connector::{build_connector, Connector};
use crate::graph::Graph;
use crate::layout::{MeasuredLayout, NodeMetrics};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Log a warning whenever a pass drops edges it cannot resolve.
    pub report_skipped: bool,
}

/// Every connector of one pass, in edge order. Replaced as a whole, never patched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectorSet {
    pub connectors: Vec<Connector>,
    /// Edges that could not be resolved and were left out.
    pub skipped: usize,
}

impl ConnectorSet {
    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }
}

/// Resolve and build one connector per edge whose endpoints both exist on
/// `surface`. Unresolvable edges are omitted; this never fails.
pub fn render_connectors<S: RenderSurface + ?Sized>(graph: &Graph, surface: &S) -> ConnectorSet {
    let mut set = ConnectorSet {
        connectors: Vec::with_capacity(graph.edges.len()),
        skipped: 0,
    };
    for edge in &graph.edges {
        match resolve_anchors(edge, surface) {
            Some(anchors) => set.connectors.push(build_connector(
                edge.id(),
                anchors,
                graph.source_pin_type(edge),
            )),
            None => {
                debug!(edge = ?edge.id(), "skipping unresolved edge");
                set.skipped += 1;
            }
        }
    }
    set
}

/// Everything needed to paint one graph: the snapshot, its measured layout
/// and the connectors drawn over it.
#[derive(Debug, Clone, Default)]
pub struct RenderFrame {
    /// Pass number of the scheduler that produced this frame; 0 outside a scheduler.
    pub pass: u64,
    pub graph: Arc<Graph>,
    pub layout: MeasuredLayout,
    pub connectors: ConnectorSet,
}

impl RenderFrame {
    pub fn build(graph: Arc<Graph>, metrics: &NodeMetrics, options: RenderOptions) -> Self {
        let layout = metrics.measure(&graph);
        let connectors = render_connectors(&graph, &layout);
        if options.report_skipped && connectors.skipped > 0 {
            warn!(
                skipped = connectors.skipped,
                total = graph.edges.len(),
                "dropped edges with missing endpoints"
            );
        }
        Self {
            pass: 0,
            graph,
            layout,
            connectors,
        }
    }
}
