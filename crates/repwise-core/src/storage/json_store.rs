//! Flat JSON file store.
//!
//! The whole entry list lives in memory and is rewritten to disk on every
//! upsert. The format is a plain JSON array of `{date, count}` objects, so
//! the file stays inspectable and editable by hand.

use super::{StoreError, WorkoutStore};
use crate::workout::{WorkoutEntry, upsert_entry};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

/// Workout store backed by a single JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Vec<WorkoutEntry>,
}

impl JsonFileStore {
    /// Open a store at `path`, reading existing entries if the file exists.
    ///
    /// A missing file is an empty store; the file is created on the first
    /// upsert. A present but unreadable or unparsable file is an error, not
    /// an empty store, so a corrupt history is never silently overwritten.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            Vec::new()
        };
        Ok(Self { path, entries })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_vec_pretty(&self.entries)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl WorkoutStore for JsonFileStore {
    fn load(&self) -> Result<Vec<WorkoutEntry>, StoreError> {
        Ok(self.entries.clone())
    }

    fn upsert(&mut self, date: NaiveDate, delta: u32) -> Result<WorkoutEntry, StoreError> {
        let entry = upsert_entry(&mut self.entries, date, delta);
        self.persist()?;
        Ok(entry)
    }
}

// =============================================================================
// TESTS
// =============================================================================
