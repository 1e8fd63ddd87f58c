//! Persistent list of text diagrams plus the active selection.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::data_dir;
use crate::diagram::DiagramKind;

pub const STORAGE_KEY: &str = "kismet-diagrams";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no diagram with id {0}")]
    NotFound(String),
    #[error("failed to persist diagrams to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode diagrams: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiagramDocument {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DiagramKind,
    pub code: String,
    /// Milliseconds since the Unix epoch.
    pub last_modified: i64,
}

impl DiagramDocument {
    pub fn starter(kind: DiagramKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: format!("New {}", kind.label()),
            kind,
            code: kind.starter_code().to_string(),
            last_modified: now_millis(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct StoredLibrary {
    diagrams: Vec<DiagramDocument>,
    active_id: Option<String>,
}

#[derive(Debug)]
pub struct DiagramLibrary {
    path: PathBuf,
    diagrams: Vec<DiagramDocument>,
    active_id: String,
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn library_path() -> PathBuf {
    data_dir().join(format!("{}.json", STORAGE_KEY))
}

impl DiagramLibrary {
    pub fn open_default() -> Self {
        Self::open(library_path())
    }

    /// Load from `path`. A missing or corrupt file yields one starter diagram.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let stored = fs::read_to_string(&path)
            .ok()
            .and_then(|raw| match serde_json::from_str::<StoredLibrary>(&raw) {
                Ok(stored) => Some(stored),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "diagram library unreadable, starting fresh");
                    None
                }
            });

        let (diagrams, active) = match stored {
            Some(s) if !s.diagrams.is_empty() => (s.diagrams, s.active_id),
            _ => (vec![DiagramDocument::starter(DiagramKind::Class)], None),
        };
        let active_id = active
            .filter(|id| diagrams.iter().any(|d| &d.id == id))
            .unwrap_or_else(|| diagrams[0].id.clone());

        debug!(count = diagrams.len(), "diagram library loaded");
        Self {
            path,
            diagrams,
            active_id,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn diagrams(&self) -> &[DiagramDocument] {
        &self.diagrams
    }

    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    pub fn active(&self) -> Option<&DiagramDocument> {
        self.get(&self.active_id)
    }

    pub fn get(&self, id: &str) -> Option<&DiagramDocument> {
        self.diagrams.iter().find(|d| d.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut DiagramDocument, StoreError> {
        self.diagrams
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Add a starter diagram of `kind` and make it active.
    pub fn create(&mut self, kind: DiagramKind) -> Result<&DiagramDocument, StoreError> {
        let doc = DiagramDocument::starter(kind);
        self.active_id = doc.id.clone();
        self.diagrams.push(doc);
        self.save()?;
        Ok(&self.diagrams[self.diagrams.len() - 1])
    }

    pub fn select(&mut self, id: &str) -> Result<(), StoreError> {
        if self.get(id).is_none() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.active_id = id.to_string();
        self.save()
    }

    pub fn update_code(&mut self, id: &str, code: &str) -> Result<(), StoreError> {
        let doc = self.get_mut(id)?;
        doc.code = code.to_string();
        doc.last_modified = now_millis();
        self.save()
    }

    pub fn rename(&mut self, id: &str, name: &str) -> Result<(), StoreError> {
        let doc = self.get_mut(id)?;
        doc.name = name.to_string();
        doc.last_modified = now_millis();
        self.save()
    }

    /// Remove a diagram. The list never ends up empty.
    pub fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let before = self.diagrams.len();
        self.diagrams.retain(|d| d.id != id);
        if self.diagrams.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        if self.diagrams.is_empty() {
            self.diagrams.push(DiagramDocument::starter(DiagramKind::Class));
        }
        if self.active_id == id {
            self.active_id = self.diagrams[0].id.clone();
        }
        self.save()
    }

    fn save(&self) -> Result<(), StoreError> {
        let stored = StoredLibrary {
            diagrams: self.diagrams.clone(),
            active_id: Some(self.active_id.clone()),
        };
        let json = serde_json::to_string_pretty(&stored)?;
        crate::write_atomic(&self.path, &json).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_library() -> (tempfile::TempDir, DiagramLibrary) {
        let dir = tempfile::tempdir().unwrap();
        let lib = DiagramLibrary::open(dir.path().join(format!("{STORAGE_KEY}.json")));
        (dir, lib)
    }

    #[test]
    fn fresh_library_has_one_starter() {
        let (_dir, lib) = temp_library();
        assert_eq!(lib.diagrams().len(), 1);
        assert_eq!(lib.active().unwrap().kind, DiagramKind::Class);
        assert!(lib.active().unwrap().code.starts_with("classDiagram"));
    }

    #[test]
    fn changes_survive_reopen() {
        let (dir, mut lib) = temp_library();
        let id = lib.create(DiagramKind::Sequence).unwrap().id.clone();
        lib.rename(&id, "Light switch").unwrap();
        lib.update_code(&id, "sequenceDiagram\n A->>B: hi").unwrap();

        let reopened = DiagramLibrary::open(lib.path().to_path_buf());
        assert_eq!(reopened.diagrams().len(), 2);
        assert_eq!(reopened.active_id(), id);
        let doc = reopened.active().unwrap();
        assert_eq!(doc.name, "Light switch");
        assert_eq!(doc.kind, DiagramKind::Sequence);
        assert!(doc.code.ends_with("hi"));
        drop(dir);
    }

    #[test]
    fn stored_kind_uses_diagram_header() {
        let (_dir, mut lib) = temp_library();
        lib.create(DiagramKind::Flow).unwrap();
        let raw = fs::read_to_string(lib.path()).unwrap();
        assert!(raw.contains(r#""type": "flowchart TD""#));
        assert!(raw.contains("lastModified"));
    }

    #[test]
    fn deleting_last_recreates_starter() {
        let (_dir, mut lib) = temp_library();
        let only = lib.active_id().to_string();
        lib.delete(&only).unwrap();
        assert_eq!(lib.diagrams().len(), 1);
        assert_ne!(lib.active_id(), only);
    }

    #[test]
    fn deleting_active_moves_to_first() {
        let (_dir, mut lib) = temp_library();
        let first = lib.active_id().to_string();
        let second = lib.create(DiagramKind::State).unwrap().id.clone();
        lib.delete(&second).unwrap();
        assert_eq!(lib.active_id(), first);
        assert!(matches!(lib.delete("nope"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn corrupt_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lib.json");
        fs::write(&path, "[[[").unwrap();
        let lib = DiagramLibrary::open(path);
        assert_eq!(lib.diagrams().len(), 1);
    }
}
