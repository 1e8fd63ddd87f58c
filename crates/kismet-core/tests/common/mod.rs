#![allow(dead_code)]

use std::collections::HashMap;

use kismet_core::anchor::{element_id, SURFACE_ELEMENT_ID};
use kismet_core::{Graph, Rect};

/// "Press F to toggle a light": key event -> flip-flop -> two visibility setters.
pub const LIGHT_TOGGLE: &str = r#"{
  "nodes": [
    {"id": "key_f", "title": "F", "type": "EVENT",
     "inputs": [],
     "outputs": [{"id": "pressed", "name": "Pressed", "type": "EXEC"}],
     "position": {"x": 0, "y": 0}},
    {"id": "flip", "title": "FlipFlop", "type": "CONTROL_FLOW",
     "inputs": [{"id": "exec", "name": "", "type": "EXEC"}],
     "outputs": [{"id": "a", "name": "A", "type": "EXEC"},
                 {"id": "b", "name": "B", "type": "EXEC"},
                 {"id": "is_a", "name": "Is A", "type": "BOOLEAN"}],
     "position": {"x": 260, "y": 0}},
    {"id": "on", "title": "Set Visibility", "type": "FUNCTION",
     "inputs": [{"id": "exec", "name": "", "type": "EXEC"},
                {"id": "visible", "name": "New Visibility", "type": "BOOLEAN"}],
     "outputs": [{"id": "then", "name": "", "type": "EXEC"}],
     "position": {"x": 520, "y": -80}},
    {"id": "off", "title": "Set Visibility", "type": "FUNCTION",
     "inputs": [{"id": "exec", "name": "", "type": "EXEC"},
                {"id": "visible", "name": "New Visibility", "type": "BOOLEAN"}],
     "outputs": [{"id": "then", "name": "", "type": "EXEC"}],
     "position": {"x": 520, "y": 120}}
  ],
  "edges": [
    {"id": "e1", "fromNodeId": "key_f", "fromPinId": "pressed", "toNodeId": "flip", "toPinId": "exec"},
    {"id": "e2", "fromNodeId": "flip", "fromPinId": "a", "toNodeId": "on", "toPinId": "exec"},
    {"id": "e3", "fromNodeId": "flip", "fromPinId": "b", "toNodeId": "off", "toPinId": "exec"},
    {"id": "e4", "fromNodeId": "flip", "fromPinId": "is_a", "toNodeId": "on", "toPinId": "visible"}
  ]
}"#;

pub const DANGLING_PIN: &str = r#"{
  "nodes": [
    {"id": "a", "title": "A", "type": "FUNCTION", "inputs": [],
     "outputs": [{"id": "o", "name": "Out", "type": "EXEC"}], "position": {"x": 0, "y": 0}},
    {"id": "b", "title": "B", "type": "FUNCTION",
     "inputs": [{"id": "i", "name": "In", "type": "EXEC"}], "outputs": [], "position": {"x": 300, "y": 0}}
  ],
  "edges": [
    {"id": "e1", "fromNodeId": "a", "fromPinId": "missing", "toNodeId": "b", "toPinId": "i"}
  ]
}"#;

pub fn light_toggle() -> Graph {
    kismet_core::parse_graph(LIGHT_TOGGLE).expect("fixture parses")
}

/// Simulated DOM: every pin gets a 60x16 box in a grid keyed by node order,
/// inside a surface offset from the page origin.
pub fn simulated_dom(graph: &Graph) -> HashMap<String, Rect> {
    let surface = Rect::new(50.0, 30.0, 8000.0, 8000.0);
    let mut dom = HashMap::new();
    dom.insert(SURFACE_ELEMENT_ID.to_string(), surface);
    for node in &graph.nodes {
        let left = surface.left + node.position.x;
        let top = surface.top + node.position.y + 200.0;
        for (row, pin) in node.inputs.iter().enumerate() {
            dom.insert(element_id(&node.id, &pin.id), Rect::new(left, top + row as f64 * 24.0, 60.0, 16.0));
        }
        for (row, pin) in node.outputs.iter().enumerate() {
            dom.insert(
                element_id(&node.id, &pin.id),
                Rect::new(left + 120.0, top + row as f64 * 24.0, 60.0, 16.0),
            );
        }
    }
    dom
}
