//! Full-canvas SVG for a render frame: grid, nodes, then connectors on top.

use std::fmt::Write as _;

use crate::connector::fmt_num;
use crate::geometry::Rect;
use crate::graph::{NodeType, PinType};
use crate::layout::{NodeBox, PinBox, PinSide};
use crate::palette;
use crate::render::RenderFrame;

const FONT_FAMILY: &str = "Inter, sans-serif";
const CORNER_RADIUS: f64 = 4.0;

pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Render `frame` as a standalone SVG document the size of its surface.
pub fn render_scene(frame: &RenderFrame) -> String {
    let surface = frame.layout.surface;
    let mut out = String::with_capacity(4096 + frame.layout.nodes.len() * 1024);

    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = fmt_num(surface.width),
        h = fmt_num(surface.height),
    );
    write_defs(&mut out);
    let _ = write!(
        out,
        r#"<rect width="100%" height="100%" fill="{}"/><rect width="100%" height="100%" fill="url(#grid)"/>"#,
        palette::BACKGROUND
    );

    out.push_str(r#"<g class="nodes">"#);
    for node in &frame.layout.nodes {
        write_node(&mut out, node);
    }
    out.push_str("</g>");

    out.push_str(r#"<g class="connectors" pointer-events="none">"#);
    for connector in &frame.connectors.connectors {
        out.push_str(&connector.to_svg());
    }
    out.push_str("</g></svg>");
    out
}

fn write_defs(out: &mut String) {
    let _ = write!(
        out,
        concat!(
            "<defs>",
            r#"<pattern id="grid-thin" width="16" height="16" patternUnits="userSpaceOnUse">"#,
            r#"<path d="M 16 0 L 0 0 0 16" fill="none" stroke="{thin}" stroke-width="1"/></pattern>"#,
            r#"<pattern id="grid" width="128" height="128" patternUnits="userSpaceOnUse">"#,
            r#"<rect width="128" height="128" fill="url(#grid-thin)"/>"#,
            r#"<path d="M 128 0 L 0 0 0 128" fill="none" stroke="{thick}" stroke-width="1"/></pattern>"#,
            r#"<filter id="glow"><feGaussianBlur stdDeviation="1.5" result="coloredBlur"/>"#,
            r#"<feMerge><feMergeNode in="coloredBlur"/><feMergeNode in="SourceGraphic"/></feMerge></filter>"#,
            "</defs>"
        ),
        thin = palette::GRID_THIN,
        thick = palette::GRID_THICK,
    );
}

fn write_node(out: &mut String, node: &NodeBox) {
    let r = node.rect;
    let header = palette::header_color(node.node_type);
    let _ = write!(
        out,
        r#"<g class="node" data-node="{id}"><rect x="{x}" y="{y}" width="{w}" height="{h}" rx="{rx}" fill="{bg}" stroke="{border}" stroke-opacity="0.5"/>"#,
        id = escape_xml(&node.id),
        x = fmt_num(r.left),
        y = fmt_num(r.top),
        w = fmt_num(r.width),
        h = fmt_num(r.height),
        rx = CORNER_RADIUS,
        bg = palette::NODE_BG,
        border = palette::NODE_BORDER,
    );

    let header_height = node.header_height;
    let _ = write!(
        out,
        r#"<rect x="{x}" y="{y}" width="{w}" height="{h}" rx="{rx}" fill="{fill}"/>"#,
        x = fmt_num(r.left),
        y = fmt_num(r.top),
        w = fmt_num(r.width),
        h = fmt_num(header_height),
        rx = CORNER_RADIUS,
        fill = header,
    );
    let title_x = if node.node_type == Some(NodeType::Event) {
        r.left + 30.0
    } else {
        r.left + 12.0
    };
    if node.node_type == Some(NodeType::Event) {
        write_event_icon(out, r.left + 10.0, r.top + header_height / 2.0 - 7.0);
    }
    let _ = write!(
        out,
        r#"<text x="{x}" y="{y}" fill="{fill}" font-family="{font}" font-size="12" font-weight="bold" dominant-baseline="middle">{title}</text>"#,
        x = fmt_num(title_x),
        fill = palette::NEUTRAL,
        y = fmt_num(r.top + header_height / 2.0),
        font = FONT_FAMILY,
        title = escape_xml(&node.title.to_uppercase()),
    );

    for pin in &node.pins {
        write_pin(out, pin);
    }
    out.push_str("</g>");
}

fn write_event_icon(out: &mut String, x: f64, y: f64) {
    let _ = write!(
        out,
        r#"<path transform="translate({} {}) scale(0.5833)" fill="{}" d="M13 3l-2 3H2v15h20V3h-9zM4 19V8h16v11H4z"/>"#,
        fmt_num(x),
        fmt_num(y),
        palette::NEUTRAL
    );
}

fn write_pin(out: &mut String, pin: &PinBox) {
    let r = pin.rect;
    let glyph = 12.0;
    let (glyph_left, label_x, anchor) = match pin.side {
        PinSide::Input => (r.left, r.left + glyph + 4.0, "start"),
        PinSide::Output => (r.right() - glyph, r.right() - glyph - 4.0, "end"),
    };
    let _ = write!(out, r#"<g class="pin" id="{}">"#, escape_xml(&pin.element_id));
    write_glyph(out, Rect::new(glyph_left, r.center_y() - glyph / 2.0, glyph, glyph), pin.pin_type);
    if !pin.name.is_empty() {
        let _ = write!(
            out,
            r#"<text x="{x}" y="{y}" fill="{fill}" font-family="{font}" font-size="10" text-anchor="{anchor}" dominant-baseline="middle">{name}</text>"#,
            x = fmt_num(label_x),
            y = fmt_num(r.center_y()),
            fill = palette::PIN_LABEL,
            font = FONT_FAMILY,
            anchor = anchor,
            name = escape_xml(&pin.name),
        );
    }
    out.push_str("</g>");
}

fn write_glyph(out: &mut String, b: Rect, pin_type: Option<PinType>) {
    match pin_type {
        Some(PinType::Exec) => {
            // Execution pins are a right-pointing triangle.
            let _ = write!(
                out,
                r#"<path d="M {x0} {y0} L {x1} {ym} L {x0} {y1} Z" fill="{c}" stroke="{c}" stroke-width="1.5"/>"#,
                c = palette::pin_color(PinType::Exec),
                x0 = fmt_num(b.left + 2.0),
                y0 = fmt_num(b.top + 1.0),
                x1 = fmt_num(b.left + 10.0),
                ym = fmt_num(b.center_y()),
                y1 = fmt_num(b.top + 11.0),
            );
        }
        other => {
            let color = other.map(palette::pin_color).unwrap_or(palette::NEUTRAL);
            let _ = write!(
                out,
                r#"<circle cx="{cx}" cy="{cy}" r="5" fill="{c}" stroke="{c}" stroke-width="2"/>"#,
                cx = fmt_num(b.left + b.width / 2.0),
                cy = fmt_num(b.center_y()),
                c = color,
            );
        }
    }
}
