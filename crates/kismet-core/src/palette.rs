//! Colors follow Unreal Engine's standard blueprint scheme.

use crate::graph::{NodeType, PinType};

pub const BACKGROUND: &str = "#0b0b0b";
pub const GRID_THICK: &str = "#252525";
pub const GRID_THIN: &str = "#1a1a1a";
pub const NODE_BG: &str = "#202020";
pub const NODE_BORDER: &str = "#000000";
pub const PIN_LABEL: &str = "#d1d5db";

pub const NODE_HEADER_EVENT: &str = "#7a1c1c";
pub const NODE_HEADER_FUNCTION: &str = "#1a4e8a";
pub const NODE_HEADER_FLOW: &str = "#444444";
pub const NODE_HEADER_VAR: &str = "#1c4a2b";

/// Connector color when the source pin cannot be identified.
pub const NEUTRAL: &str = "#ffffff";

pub fn pin_color(pin_type: PinType) -> &'static str {
    match pin_type {
        PinType::Exec => "#ffffff",
        PinType::Boolean => "#9b0000",
        PinType::Integer => "#1ee0b2",
        PinType::Float => "#97ef2b",
        PinType::String => "#ff00d4",
        PinType::Vector => "#ffc107",
        PinType::Object => "#0070f3",
        PinType::Event => "#ff3b3b",
    }
}

pub fn header_color(node_type: Option<NodeType>) -> &'static str {
    match node_type {
        Some(NodeType::Event) => NODE_HEADER_EVENT,
        Some(NodeType::Function) => NODE_HEADER_FUNCTION,
        Some(NodeType::Variable) => NODE_HEADER_VAR,
        Some(NodeType::ControlFlow) | None => NODE_HEADER_FLOW,
    }
}
