//! Storage collaborator for the planner engine.
//!
//! The engine is the sole mutator of the graph; storage only gets the
//! committed snapshot after each mutation and hands back the last snapshot
//! at startup. Two backends:
//!
//! - [`JsonFileStore`] — the planner document in a local JSON file
//! - [`MemoryStore`] — in-process only, for tests and ephemeral sessions
//!
//! A missing or structurally invalid payload loads as `None`; the engine
//! then starts from the empty state instead of failing.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::export;
use crate::state::PlannerState;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Persistence surface the engine commits through.
pub trait StateStore {
    /// Load the last saved snapshot, or `None` when absent or invalid.
    fn load(&self) -> Option<PlannerState>;

    /// Persist a committed snapshot.
    fn save(&self, state: &PlannerState) -> StoreResult<()>;
}

/// Planner document in a local JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Where the document lives.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> Option<PlannerState> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read planner state");
                return None;
            }
        };
        match export::parse_document(&raw) {
            Ok(state) => Some(state),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "stored planner state is invalid, starting empty"
                );
                None
            }
        }
    }

    fn save(&self, state: &PlannerState) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Io {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        let document = serde_json::to_string_pretty(state).map_err(|e| StoreError::Serialize {
            message: e.to_string(),
        })?;
        std::fs::write(&self.path, document).map_err(|e| StoreError::Io {
            path: self.path.display().to_string(),
            source: e,
        })
    }
}

/// In-process store with no persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: RefCell<Option<PlannerState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store so a subsequent `load` returns `state`.
    pub fn with_state(state: PlannerState) -> Self {
        Self {
            snapshot: RefCell::new(Some(state)),
        }
    }

    /// The last saved snapshot, if any.
    pub fn snapshot(&self) -> Option<PlannerState> {
        self.snapshot.borrow().clone()
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Option<PlannerState> {
        self.snapshot.borrow().clone()
    }

    fn save(&self, state: &PlannerState) -> StoreResult<()> {
        *self.snapshot.borrow_mut() = Some(state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));

        assert!(store.load().is_none(), "fresh store has no snapshot");

        let state = PlannerState::default();
        store.save(&state).unwrap();
        assert_eq!(store.load().unwrap(), state);
    }

    #[test]
    fn file_store_creates_parent_dirs() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/dirs/state.json"));
        store.save(&PlannerState::default()).unwrap();
        assert!(store.load().is_some());
    }

    #[test]
    fn corrupt_file_loads_as_none() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{definitely not json").unwrap();
        assert!(JsonFileStore::new(&path).load().is_none());
    }

    #[test]
    fn wrong_shape_loads_as_none() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, r#"{"goals": 42, "classes": []}"#).unwrap();
        assert!(JsonFileStore::new(&path).load().is_none());
    }

    #[test]
    fn memory_store_save_then_load() {
        let store = MemoryStore::new();
        assert!(store.load().is_none());
        store.save(&PlannerState::default()).unwrap();
        assert_eq!(store.load().unwrap(), PlannerState::default());
    }
}
