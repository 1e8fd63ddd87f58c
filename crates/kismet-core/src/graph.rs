//! Blueprint graph data model.
//!
//! Graphs arrive from an untrusted generator, so deserialization is lenient:
//! missing or `null` arrays become empty, unknown enum values become `None`,
//! numeric ids are read as strings, and edge or pin entries that are not
//! objects become empty entries the renderer skips. Only a missing node list
//! or a node that is not an object rejects the document. Nothing here
//! enforces referential integrity; consumers re-validate at use time.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PinType {
    Exec,
    Boolean,
    Integer,
    Float,
    String,
    Vector,
    Object,
    Event,
}

impl PinType {
    pub const ALL: [PinType; 8] = [
        PinType::Exec,
        PinType::Boolean,
        PinType::Integer,
        PinType::Float,
        PinType::String,
        PinType::Vector,
        PinType::Object,
        PinType::Event,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PinType::Exec => "EXEC",
            PinType::Boolean => "BOOLEAN",
            PinType::Integer => "INTEGER",
            PinType::Float => "FLOAT",
            PinType::String => "STRING",
            PinType::Vector => "VECTOR",
            PinType::Object => "OBJECT",
            PinType::Event => "EVENT",
        }
    }

    /// Execution pins sequence control flow; everything else carries data.
    pub fn is_execution(self) -> bool {
        self == PinType::Exec
    }
}

impl FromStr for PinType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        PinType::ALL
            .into_iter()
            .find(|t| t.as_str() == upper)
            .ok_or(())
    }
}

impl fmt::Display for PinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    Event,
    Function,
    Variable,
    ControlFlow,
}

impl FromStr for NodeType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace([' ', '-'], "_").as_str() {
            "EVENT" => Ok(NodeType::Event),
            "FUNCTION" => Ok(NodeType::Function),
            "VARIABLE" => Ok(NodeType::Variable),
            "CONTROL_FLOW" => Ok(NodeType::ControlFlow),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Pin {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    /// Semantic type; `None` when the generator sent something outside the closed set.
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient_enum",
        skip_serializing_if = "Option::is_none"
    )]
    pub pin_type: Option<PinType>,
}

/// A blueprint node. `position` is the top-left corner in canvas space and is
/// never recomputed after the generator assigns it.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Node {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient_enum",
        skip_serializing_if = "Option::is_none"
    )]
    pub node_type: Option<NodeType>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub inputs: Vec<Pin>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub outputs: Vec<Pin>,
    #[serde(default, deserialize_with = "lenient_position")]
    pub position: Position,
}

impl Node {
    pub fn output(&self, pin_id: &str) -> Option<&Pin> {
        self.outputs.iter().find(|p| p.id == pin_id)
    }

    pub fn input(&self, pin_id: &str) -> Option<&Pin> {
        self.inputs.iter().find(|p| p.id == pin_id)
    }
}

/// A connection between an output pin and an input pin. Any reference may be
/// missing or dangling.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub from_node_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub from_pin_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub to_node_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub to_pin_id: Option<String>,
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

impl Edge {
    pub fn id(&self) -> Option<&str> {
        present(&self.id)
    }

    pub fn from_node(&self) -> Option<&str> {
        present(&self.from_node_id)
    }

    pub fn from_pin(&self) -> Option<&str> {
        present(&self.from_pin_id)
    }

    pub fn to_node(&self) -> Option<&str> {
        present(&self.to_node_id)
    }

    pub fn to_pin(&self) -> Option<&str> {
        present(&self.to_pin_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Graph {
    #[serde(default, deserialize_with = "null_as_default")]
    pub nodes: Vec<Node>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub edges: Vec<Edge>,
}

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("graph must be an object with a \"nodes\" array")]
    MissingNodes,
    #[error("malformed graph: {0}")]
    Malformed(#[source] serde_json::Error),
}

/// Parse and validate a textual graph. Nothing is returned unless the whole
/// document passes, so callers never apply a partial graph.
pub fn parse_graph(text: &str) -> Result<Graph, GraphError> {
    let value: Value = serde_json::from_str(text).map_err(GraphError::InvalidJson)?;
    Graph::from_value(value)
}

/// True when `value` is an object carrying an array-typed `nodes` field.
pub fn has_node_list(value: &Value) -> bool {
    value.get("nodes").is_some_and(Value::is_array)
}

impl Graph {
    pub fn from_value(value: Value) -> Result<Graph, GraphError> {
        if !has_node_list(&value) {
            return Err(GraphError::MissingNodes);
        }
        serde_json::from_value(value).map_err(GraphError::Malformed)
    }

    pub fn to_json_pretty(&self) -> String {
        // Plain data with string keys; serialization cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First node carrying `id`. Duplicate ids are tolerated; later ones are shadowed.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Semantic type of the output pin an edge leaves from, if both the node
    /// and the pin can be found.
    pub fn source_pin_type(&self, edge: &Edge) -> Option<PinType> {
        let node = self.node(edge.from_node()?)?;
        node.output(edge.from_pin()?)?.pin_type
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Strings pass through, numbers keep their JSON spelling, anything else is absent.
fn scalar_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_string(deserializer)?.unwrap_or_default())
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(scalar_string))
}

/// A list where each entry that does not fit `T` becomes `T::default()`, so
/// one bad entry costs one item instead of the whole graph. A non-array is empty.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let items = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect())
}

fn lenient_position<'de, D>(deserializer: D) -> Result<Position, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?.unwrap_or(Value::Null);
    let coord = |key: &str| match raw.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(Position {
        x: coord("x"),
        y: coord("y"),
    })
}

fn lenient_enum<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok()))
}
