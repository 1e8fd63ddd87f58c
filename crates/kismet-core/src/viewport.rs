//! Viewport over the oversized virtual canvas.
//!
//! The canvas is far larger than the node area and carries a uniform padding
//! so nodes never clip at its edges. Panning is plain scrolling; the only
//! camera operation is [`Viewport::focus`].

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::graph::Graph;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    /// Space between the canvas edge and node coordinate (0, 0).
    pub padding: f64,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 8000.0,
            height: 8000.0,
            padding: 2000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// A scroll the host surface should perform.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScrollRequest {
    pub left: f64,
    pub top: f64,
    pub behavior: ScrollBehavior,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub canvas: Canvas,
    pub scroll: Point,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(canvas: Canvas, width: f64, height: f64) -> Self {
        Self {
            canvas,
            scroll: Point::default(),
            width,
            height,
        }
    }

    fn max_scroll(&self) -> Point {
        Point::new(
            (self.canvas.width - self.width).max(0.0),
            (self.canvas.height - self.height).max(0.0),
        )
    }

    fn clamp(&self, p: Point) -> Point {
        let max = self.max_scroll();
        Point::new(p.x.clamp(0.0, max.x), p.y.clamp(0.0, max.y))
    }

    /// Bring the top-left-most node corner to the visible origin.
    /// Returns `None` (and leaves the scroll alone) for an empty graph.
    pub fn focus(&mut self, graph: &Graph) -> Option<ScrollRequest> {
        let (min_x, min_y) = graph.nodes.iter().fold(None, |acc, n| {
            let (x, y) = (n.position.x, n.position.y);
            Some(match acc {
                None => (x, y),
                Some((mx, my)) => (f64::min(mx, x), f64::min(my, y)),
            })
        })?;

        self.scroll = self.clamp(Point::new(
            min_x + self.canvas.padding,
            min_y + self.canvas.padding,
        ));
        Some(ScrollRequest {
            left: self.scroll.x,
            top: self.scroll.y,
            behavior: ScrollBehavior::Smooth,
        })
    }

    /// Native-style panning by a delta, clamped to the canvas.
    pub fn scroll_by(&mut self, dx: f64, dy: f64) -> ScrollRequest {
        self.scroll = self.clamp(Point::new(self.scroll.x + dx, self.scroll.y + dy));
        ScrollRequest {
            left: self.scroll.x,
            top: self.scroll.y,
            behavior: ScrollBehavior::Instant,
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.scroll = self.clamp(self.scroll);
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(Canvas::default(), 1280.0, 720.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Node, Position};

    fn at(x: f64, y: f64) -> Node {
        Node {
            position: Position { x, y },
            ..Default::default()
        }
    }

    #[test]
    fn focus_targets_min_corner_plus_padding() {
        let mut vp = Viewport::default();
        let graph = Graph {
            nodes: vec![at(400.0, 50.0), at(120.0, 300.0)],
            edges: vec![],
        };
        let req = vp.focus(&graph).unwrap();
        assert_eq!((req.left, req.top), (2120.0, 2050.0));
        assert_eq!(req.behavior, ScrollBehavior::Smooth);
        assert_eq!(vp.scroll, Point::new(2120.0, 2050.0));
    }

    #[test]
    fn focus_on_empty_graph_is_noop() {
        let mut vp = Viewport::default();
        vp.scroll_by(10.0, 10.0);
        assert!(vp.focus(&Graph::default()).is_none());
        assert_eq!(vp.scroll, Point::new(10.0, 10.0));
    }

    #[test]
    fn scrolling_is_clamped_to_canvas() {
        let mut vp = Viewport::default();
        let graph = Graph {
            nodes: vec![at(-5000.0, 90000.0)],
            edges: vec![],
        };
        let req = vp.focus(&graph).unwrap();
        assert_eq!(req.left, 0.0);
        assert_eq!(req.top, 8000.0 - 720.0);
        vp.scroll_by(-50.0, 0.0);
        assert_eq!(vp.scroll.x, 0.0);
    }
}
