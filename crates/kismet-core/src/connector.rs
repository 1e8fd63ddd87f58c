//! Connector geometry and styling.
//!
//! A connector is a horizontal cubic Bezier: both control points sit half the
//! horizontal span away from their endpoint at the endpoint's height, so the
//! curve leaves and arrives horizontally whatever the vertical offset.

use std::fmt::Write as _;

use serde::Serialize;

use crate::anchor::EdgeAnchors;
use crate::geometry::Point;
use crate::graph::PinType;
use crate::palette;

pub const EXEC_STROKE_WIDTH: f64 = 2.5;
pub const DATA_STROKE_WIDTH: f64 = 1.5;
pub const STROKE_OPACITY: f64 = 0.8;
pub const GLOW_RADIUS: f64 = 2.0;
/// Alpha byte appended to the stroke color for the glow.
const GLOW_ALPHA: &str = "88";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorStyle {
    pub color: &'static str,
    pub width: f64,
    pub opacity: f64,
    /// Glow color: the stroke color at reduced opacity, `#rrggbbaa`.
    pub glow: String,
}

impl ConnectorStyle {
    /// Style for a connector leaving a pin of `pin_type`; `None` gets the
    /// neutral style.
    pub fn for_pin(pin_type: Option<PinType>) -> Self {
        let color = pin_type.map(palette::pin_color).unwrap_or(palette::NEUTRAL);
        let width = match pin_type {
            Some(t) if t.is_execution() => EXEC_STROKE_WIDTH,
            _ => DATA_STROKE_WIDTH,
        };
        Self {
            color,
            width,
            opacity: STROKE_OPACITY,
            glow: format!("{}{}", color, GLOW_ALPHA),
        }
    }

    /// CSS `filter` value producing the glow.
    pub fn glow_filter(&self) -> String {
        format!("drop-shadow(0 0 {}px {})", GLOW_RADIUS, self.glow)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
    pub edge_id: Option<String>,
    pub start: Point,
    pub ctrl1: Point,
    pub ctrl2: Point,
    pub end: Point,
    pub pin_type: Option<PinType>,
    pub style: ConnectorStyle,
}

/// Build the curve and style for one resolved edge.
pub fn build_connector(
    edge_id: Option<&str>,
    anchors: EdgeAnchors,
    pin_type: Option<PinType>,
) -> Connector {
    let EdgeAnchors { start, end } = anchors;
    let half_span = (end.x - start.x).abs() * 0.5;
    Connector {
        edge_id: edge_id.map(str::to_string),
        start,
        ctrl1: Point::new(start.x + half_span, start.y),
        ctrl2: Point::new(end.x - half_span, end.y),
        end,
        pin_type,
        style: ConnectorStyle::for_pin(pin_type),
    }
}

impl Connector {
    /// SVG path data: `M sx sy C c1x c1y, c2x c2y, ex ey`.
    pub fn path_data(&self) -> String {
        format!(
            "M {} {} C {} {}, {} {}, {} {}",
            fmt_num(self.start.x),
            fmt_num(self.start.y),
            fmt_num(self.ctrl1.x),
            fmt_num(self.ctrl1.y),
            fmt_num(self.ctrl2.x),
            fmt_num(self.ctrl2.y),
            fmt_num(self.end.x),
            fmt_num(self.end.y),
        )
    }

    /// Standalone `<path>` element for this connector.
    pub fn to_svg(&self) -> String {
        let mut out = String::with_capacity(256);
        out.push_str("<path");
        if let Some(id) = &self.edge_id {
            let _ = write!(out, " data-edge=\"{}\"", crate::scene::escape_xml(id));
        }
        let _ = write!(
            out,
            " d=\"{}\" stroke=\"{}\" stroke-width=\"{}\" stroke-opacity=\"{}\" fill=\"none\" style=\"filter: {}\"/>",
            self.path_data(),
            self.style.color,
            fmt_num(self.style.width),
            fmt_num(self.style.opacity),
            self.style.glow_filter(),
        );
        out
    }
}

/// Compact number formatting for SVG attributes: integers without a
/// fractional part, everything else trimmed to two decimals.
pub fn fmt_num(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let s = format!("{:.2}", value);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
