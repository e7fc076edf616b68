// SPDX-License-Identifier: MIT OR Apache-2.0
//! Durable storage for the persisted part of the routine.
//!
//! Only the pose order and theme preference survive a restart. The layout
//! on disk is:
//!
//! ```json
//! {
//!   "sequence": [ { "id": "1", "name": "...", "durationSeconds": 30, "description": "..." } ],
//!   "themePreference": true
//! }
//! ```

use crate::sequence::PoseSequence;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or invalid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend refused the write
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// The persisted subset of routine state. Absent keys stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedRoutine {
    /// Pose order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<PoseSequence>,
    /// `true` for dark mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_preference: Option<bool>,
}

/// Where the persisted routine lives
pub trait RoutineStorage {
    /// Read the saved routine; `Ok(None)` if nothing was ever saved
    fn load(&self) -> Result<Option<PersistedRoutine>, StorageError>;

    /// Replace the saved routine
    fn save(&self, routine: &PersistedRoutine) -> Result<(), StorageError>;
}

impl<S: RoutineStorage + ?Sized> RoutineStorage for Box<S> {
    fn load(&self) -> Result<Option<PersistedRoutine>, StorageError> {
        (**self).load()
    }

    fn save(&self, routine: &PersistedRoutine) -> Result<(), StorageError> {
        (**self).save(routine)
    }
}

/// JSON file on disk
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// Use the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RoutineStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<PersistedRoutine>, StorageError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save(&self, routine: &PersistedRoutine) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(routine)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-memory storage for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStorage {
    saved: RefCell<Option<PersistedRoutine>>,
    saves: RefCell<usize>,
    fail_writes: bool,
}

impl MemoryStorage {
    /// Empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-filled with a saved routine
    pub fn with_saved(routine: PersistedRoutine) -> Self {
        Self {
            saved: RefCell::new(Some(routine)),
            ..Self::default()
        }
    }

    /// Storage whose writes always fail
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Last saved routine
    pub fn saved(&self) -> Option<PersistedRoutine> {
        self.saved.borrow().clone()
    }

    /// Number of successful writes
    pub fn save_count(&self) -> usize {
        *self.saves.borrow()
    }
}

impl RoutineStorage for MemoryStorage {
    fn load(&self) -> Result<Option<PersistedRoutine>, StorageError> {
        Ok(self.saved.borrow().clone())
    }

    fn save(&self, routine: &PersistedRoutine) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Unavailable("writes disabled".into()));
        }
        *self.saved.borrow_mut() = Some(routine.clone());
        *self.saves.borrow_mut() += 1;
        Ok(())
    }
}
