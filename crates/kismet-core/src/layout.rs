//! Node layout measurement.
//!
//! Nodes keep the position the generator gave them; this module only works
//! out how big each node is and where each pin row lands, and publishes those
//! rects under the pin element ids the anchor resolver looks up.

use std::collections::HashMap;

pub use crate::anchor::PinSide;

use crate::anchor::{element_id, PinKey, RenderSurface};
use crate::geometry::Rect;
use crate::graph::{Graph, Node, NodeType, Pin, PinType};
use crate::viewport::Canvas;

#[derive(Debug, Clone, PartialEq)]
pub struct NodeMetrics {
    pub canvas: Canvas,
    pub min_width: f64,
    pub header_height: f64,
    pub body_padding: f64,
    pub row_height: f64,
    pub row_gap: f64,
    pub glyph_size: f64,
    /// Space between a glyph and its label.
    pub glyph_gap: f64,
    /// Estimated advance per label character.
    pub char_width: f64,
    /// Space between the input and output columns.
    pub column_gutter: f64,
}

impl Default for NodeMetrics {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            min_width: 180.0,
            header_height: 28.0,
            body_padding: 8.0,
            row_height: 14.0,
            row_gap: 8.0,
            glyph_size: 12.0,
            glyph_gap: 4.0,
            char_width: 6.0,
            column_gutter: 32.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PinBox {
    pub element_id: String,
    pub side: PinSide,
    pub name: String,
    pub pin_type: Option<PinType>,
    /// Whole pin row: glyph plus label.
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeBox {
    pub id: String,
    pub title: String,
    pub node_type: Option<NodeType>,
    pub rect: Rect,
    pub header_height: f64,
    pub pins: Vec<PinBox>,
}

/// Result of measuring one graph. Coordinates are canvas space, padding included.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasuredLayout {
    pub surface: Rect,
    pub nodes: Vec<NodeBox>,
    elements: HashMap<String, Rect>,
    /// Same rects split by column, so an input and an output sharing a pin id
    /// on one node never shadow each other.
    pins: HashMap<(PinSide, String), Rect>,
}

impl NodeMetrics {
    pub fn measure(&self, graph: &Graph) -> MeasuredLayout {
        let mut elements = HashMap::new();
        let mut pins = HashMap::new();
        let nodes = graph
            .nodes
            .iter()
            .map(|node| {
                let node_box = self.measure_node(node);
                for pin in &node_box.pins {
                    // Duplicate ids: the first node to claim an element keeps it.
                    elements
                        .entry(pin.element_id.clone())
                        .or_insert(pin.rect);
                    pins.entry((pin.side, pin.element_id.clone()))
                        .or_insert(pin.rect);
                }
                node_box
            })
            .collect();

        MeasuredLayout {
            surface: Rect::new(0.0, 0.0, self.canvas.width, self.canvas.height),
            nodes,
            elements,
            pins,
        }
    }

    fn pin_width(&self, pin: &Pin) -> f64 {
        self.glyph_size + self.glyph_gap + pin.name.chars().count() as f64 * self.char_width
    }

    fn column_width(&self, pins: &[Pin]) -> f64 {
        pins.iter().map(|p| self.pin_width(p)).fold(0.0, f64::max)
    }

    fn row_top(&self, node_top: f64, index: usize) -> f64 {
        node_top
            + self.header_height
            + self.body_padding
            + index as f64 * (self.row_height + self.row_gap)
    }

    fn measure_node(&self, node: &Node) -> NodeBox {
        let left = self.canvas.padding + node.position.x;
        let top = self.canvas.padding + node.position.y;

        let title_width = node.title.chars().count() as f64 * self.char_width + 2.0 * 12.0;
        let body_width = 2.0 * self.body_padding
            + self.column_width(&node.inputs)
            + self.column_gutter
            + self.column_width(&node.outputs);
        let width = self.min_width.max(body_width).max(title_width);

        let rows = node.inputs.len().max(node.outputs.len());
        let rows_height = if rows == 0 {
            0.0
        } else {
            rows as f64 * self.row_height + (rows - 1) as f64 * self.row_gap
        };
        let height = self.header_height + 2.0 * self.body_padding + rows_height;

        let mut pins = Vec::with_capacity(node.inputs.len() + node.outputs.len());
        for (i, pin) in node.inputs.iter().enumerate() {
            pins.push(PinBox {
                element_id: element_id(&node.id, &pin.id),
                side: PinSide::Input,
                name: pin.name.clone(),
                pin_type: pin.pin_type,
                rect: Rect::new(
                    left + self.body_padding,
                    self.row_top(top, i),
                    self.pin_width(pin),
                    self.row_height,
                ),
            });
        }
        for (i, pin) in node.outputs.iter().enumerate() {
            let pin_width = self.pin_width(pin);
            pins.push(PinBox {
                element_id: element_id(&node.id, &pin.id),
                side: PinSide::Output,
                name: pin.name.clone(),
                pin_type: pin.pin_type,
                rect: Rect::new(
                    left + width - self.body_padding - pin_width,
                    self.row_top(top, i),
                    pin_width,
                    self.row_height,
                ),
            });
        }

        NodeBox {
            id: node.id.clone(),
            title: node.title.clone(),
            node_type: node.node_type,
            rect: Rect::new(left, top, width, height),
            header_height: self.header_height,
            pins,
        }
    }
}

impl MeasuredLayout {
    /// Bounding box of every measured node, if any.
    pub fn bounds(&self) -> Option<Rect> {
        let first = self.nodes.first()?.rect;
        let (mut l, mut t, mut r, mut b) = (first.left, first.top, first.right(), first.bottom());
        for node in &self.nodes[1..] {
            l = l.min(node.rect.left);
            t = t.min(node.rect.top);
            r = r.max(node.rect.right());
            b = b.max(node.rect.bottom());
        }
        Some(Rect::new(l, t, r - l, b - t))
    }
}

impl RenderSurface for MeasuredLayout {
    fn surface_rect(&self) -> Option<Rect> {
        Some(self.surface)
    }

    fn element_rect(&self, element_id: &str) -> Option<Rect> {
        self.elements.get(element_id).copied()
    }

    fn pin_rect(&self, key: &PinKey<'_>, side: PinSide) -> Option<Rect> {
        self.pins.get(&(side, key.element_id())).copied()
    }
}
