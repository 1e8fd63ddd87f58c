use std::fmt;

use serde_json::Value;

use crate::graph::Graph;

/// Content digest of a graph, used to tell whether a fetched graph differs
/// from the one on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Digest of the compact JSON form of `value`. `serde_json::Map` is a
    /// `BTreeMap` unless `preserve_order` is enabled, which nothing in this
    /// workspace does, so keys are already sorted.
    pub fn of_value(value: &Value) -> Self {
        Fingerprint(*blake3::hash(value.to_string().as_bytes()).as_bytes())
    }

    pub fn of(graph: &Graph) -> Self {
        match serde_json::to_value(graph) {
            Ok(value) => Self::of_value(&value),
            Err(_) => Fingerprint([0; 32]),
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0[..8] {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_order_does_not_matter() {
        let a: Value = serde_json::from_str(r#"{"nodes":[],"edges":[{"id":"e","fromNodeId":"a"}]}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"edges":[{"fromNodeId":"a","id":"e"}],"nodes":[]}"#).unwrap();
        assert_eq!(Fingerprint::of_value(&a), Fingerprint::of_value(&b));
    }

    #[test]
    fn content_changes_change_the_digest() {
        let a = json!({"nodes": [{"id": "a"}]});
        let b = json!({"nodes": [{"id": "b"}]});
        assert_ne!(Fingerprint::of_value(&a), Fingerprint::of_value(&b));
        assert_eq!(Fingerprint::of_value(&a).to_string().len(), 16);
    }
}
