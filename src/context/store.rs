use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::types::{ContextEntry, ContextSnapshot, ContextState};

pub const DEFAULT_CAPACITY: usize = 20;
pub const DEFAULT_PERSISTED_HISTORY: usize = 10;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("no saved context at {0}")]
    NoData(PathBuf),
    #[error("context file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("context file is not a valid snapshot: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Bounded turn memory plus the whole-file JSON snapshot behind it.
///
/// Every mutator applies the in-memory change first and then saves. A failed
/// save is returned to the caller but never rolls back memory, so the session
/// keeps going on best-effort state.
#[derive(Debug)]
pub struct ContextStore {
    path: Option<PathBuf>,
    capacity: usize,
    persisted_history: usize,
    pub(crate) state: ContextState,
}

impl ContextStore {
    pub fn new(path: impl Into<PathBuf>, capacity: usize, persisted_history: usize) -> Self {
        Self {
            path: Some(path.into()),
            capacity: capacity.max(1),
            persisted_history,
            state: ContextState::default(),
        }
    }

    /// A store that never touches disk.
    pub fn in_memory(capacity: usize) -> Self {
        Self {
            path: None,
            capacity: capacity.max(1),
            persisted_history: DEFAULT_PERSISTED_HISTORY,
            state: ContextState::default(),
        }
    }

    pub fn load(path: impl AsRef<Path>, capacity: usize, persisted_history: usize) -> Result<Self, ContextError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ContextError::NoData(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        let snapshot: ContextSnapshot = serde_json::from_str(&content)?;
        let mut store = Self::new(path, capacity, persisted_history);
        store.state = ContextState::from_snapshot(snapshot, store.capacity);
        Ok(store)
    }

    /// Startup path: never fails, falls back to an empty store.
    pub fn open(path: impl AsRef<Path>, capacity: usize, persisted_history: usize) -> Self {
        let path = path.as_ref();
        match Self::load(path, capacity, persisted_history) {
            Ok(store) => {
                info!(entries = store.len(), "context restored");
                store
            }
            Err(ContextError::NoData(_)) => {
                info!("no saved context, starting fresh");
                Self::new(path, capacity, persisted_history)
            }
            Err(e) => {
                warn!(error = %e, "context load failed, starting fresh");
                Self::new(path, capacity, persisted_history)
            }
        }
    }

    pub fn add_entry(&mut self, entry: ContextEntry) -> Result<(), ContextError> {
        self.state.absorb(&entry);
        self.state.entries.push_back(entry);
        while self.state.entries.len() > self.capacity {
            self.state.entries.pop_front();
        }
        self.save()
    }

    /// Sets the outcome on the latest entry and the scalar field.
    pub fn update_last_outcome(&mut self, outcome: &str) -> Result<(), ContextError> {
        if outcome.trim().is_empty() {
            return Ok(());
        }
        if let Some(last) = self.state.entries.back_mut() {
            last.last_outcome = Some(outcome.to_string());
        }
        self.state.last_action_outcome = Some(outcome.to_string());
        self.save()
    }

    pub fn update_last_scan_result(&mut self, result: &str) -> Result<(), ContextError> {
        if result.trim().is_empty() {
            return Ok(());
        }
        if let Some(last) = self.state.entries.back_mut() {
            last.scan_result = Some(result.to_string());
        }
        self.state.last_scan_result = Some(result.to_string());
        self.save()
    }

    pub fn clear(&mut self) -> Result<(), ContextError> {
        self.state = ContextState::default();
        self.save()
    }

    /// Overwrites the whole file. No-op for in-memory stores.
    pub fn save(&self) -> Result<(), ContextError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.snapshot())?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn snapshot(&self) -> ContextSnapshot {
        self.state.to_snapshot(self.persisted_history)
    }

    pub fn state(&self) -> &ContextState {
        &self.state
    }

    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &ContextEntry> {
        self.state.entries.iter()
    }

    pub fn last_entry(&self) -> Option<&ContextEntry> {
        self.state.entries.back()
    }

    pub fn len(&self) -> usize {
        self.state.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
