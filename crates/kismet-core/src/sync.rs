//! The "last known graph" slot shared between a producer (the MCP tool) and
//! the viewer. Single slot, last write wins, process lifetime only.

use std::sync::RwLock;

use serde_json::Value;

use crate::graph::has_node_list;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotError {
    #[error("payload must be an object with a \"nodes\" array")]
    MissingNodes,
}

pub trait SyncSlot: Send + Sync {
    /// Last stored payload, `None` if nothing was pushed yet.
    fn read(&self) -> Option<Value>;

    /// Replace the stored payload. Rejects payloads without a node list.
    fn write(&self, payload: Value) -> Result<(), SlotError>;
}

#[derive(Debug, Default)]
pub struct MemorySlot {
    last: RwLock<Option<Value>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SyncSlot for MemorySlot {
    fn read(&self) -> Option<Value> {
        match self.last.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn write(&self, payload: Value) -> Result<(), SlotError> {
        if !has_node_list(&payload) {
            return Err(SlotError::MissingNodes);
        }
        let mut guard = match self.last.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(payload);
        Ok(())
    }
}
