//! Pin anchor resolution.
//!
//! Every rendered pin is addressed by a stable key derived from
//! `(node id, pin id)`. The resolver asks a [`RenderSurface`] for the element
//! rectangles behind an edge's two endpoints and turns them into anchor points
//! relative to the drawing surface. Anything it cannot find is reported as
//! `None`; it never guesses a position.

use std::collections::HashMap;

use crate::geometry::{Point, Rect};
use crate::graph::Edge;

/// Horizontal inset applied to both anchors so connectors tuck under the pin glyph.
pub const PIN_GLYPH_OFFSET: f64 = 4.0;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PinKey<'a> {
    pub node_id: &'a str,
    pub pin_id: &'a str,
}

impl<'a> PinKey<'a> {
    pub fn new(node_id: &'a str, pin_id: &'a str) -> Self {
        Self { node_id, pin_id }
    }

    /// Element id the renderer gives the pin, e.g. `pin-node_1-exec_out`.
    pub fn element_id(&self) -> String {
        element_id(self.node_id, self.pin_id)
    }
}

pub fn element_id(node_id: &str, pin_id: &str) -> String {
    format!("pin-{}-{}", node_id, pin_id)
}

/// Which column of its node a pin sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinSide {
    Input,
    Output,
}

/// Anything that can report where pins were laid out.
pub trait RenderSurface {
    /// Bounding rect of the drawing surface connectors are painted on.
    fn surface_rect(&self) -> Option<Rect>;

    /// Bounding rect of the element with `element_id`, in the same space as
    /// [`RenderSurface::surface_rect`].
    fn element_rect(&self, element_id: &str) -> Option<Rect>;

    /// Rect of the pin `key` on `side`. Surfaces that only know element ids
    /// ignore the side; the measured layout keeps the columns apart.
    fn pin_rect(&self, key: &PinKey<'_>, _side: PinSide) -> Option<Rect> {
        self.element_rect(&key.element_id())
    }
}

/// A bare element-id -> rect table. Handy for surfaces measured elsewhere.
impl RenderSurface for HashMap<String, Rect> {
    fn surface_rect(&self) -> Option<Rect> {
        self.get(SURFACE_ELEMENT_ID).copied()
    }

    fn element_rect(&self, element_id: &str) -> Option<Rect> {
        self.get(element_id).copied()
    }
}

/// Key under which a plain map surface stores its drawing surface rect.
pub const SURFACE_ELEMENT_ID: &str = "connector-surface";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeAnchors {
    /// Right-center of the source output pin.
    pub start: Point,
    /// Left-center of the destination input pin.
    pub end: Point,
}

/// Resolve the anchors of both ends of `edge`, or `None` when either end is
/// missing from the edge or from the surface.
pub fn resolve_anchors<S: RenderSurface + ?Sized>(edge: &Edge, surface: &S) -> Option<EdgeAnchors> {
    let from = PinKey::new(edge.from_node()?, edge.from_pin()?);
    let to = PinKey::new(edge.to_node()?, edge.to_pin()?);

    let origin = surface.surface_rect()?;
    let from_rect = laid_out(surface, &from, PinSide::Output)?.relative_to(&origin);
    let to_rect = laid_out(surface, &to, PinSide::Input)?.relative_to(&origin);

    Some(EdgeAnchors {
        start: Point::new(from_rect.right() - PIN_GLYPH_OFFSET, from_rect.center_y()),
        end: Point::new(to_rect.left + PIN_GLYPH_OFFSET, to_rect.center_y()),
    })
}

fn laid_out<S: RenderSurface + ?Sized>(surface: &S, key: &PinKey<'_>, side: PinSide) -> Option<Rect> {
    surface.pin_rect(key, side).filter(Rect::is_laid_out)
}
