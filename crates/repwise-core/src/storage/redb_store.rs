//! redb-backed workout store.
//!
//! One table, keyed by ISO date string (which sorts chronologically in the
//! B-tree), postcard-encoded totals as values. Every upsert is a single
//! ACID write transaction.

use super::{StoreError, WorkoutStore};
use crate::workout::WorkoutEntry;
use chrono::NaiveDate;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;

const WORKOUTS: TableDefinition<&str, &[u8]> = TableDefinition::new("workouts");

/// Workout store backed by a redb database file.
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Open (or create) a redb store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = Database::create(path)?;
        // Make sure the table exists so a fresh database loads as empty.
        let txn = db.begin_write()?;
        txn.open_table(WORKOUTS)?;
        txn.commit()?;
        Ok(Self { db })
    }
}

impl WorkoutStore for RedbStore {
    fn load(&self) -> Result<Vec<WorkoutEntry>, StoreError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(WORKOUTS)?;

        let mut entries = Vec::new();
        for item in table.iter()? {
            let (key, value) = item?;
            let date: NaiveDate = key
                .value()
                .parse()
                .map_err(|e| StoreError::Corrupt(format!("bad date key {:?}: {e}", key.value())))?;
            let count: u32 = postcard::from_bytes(value.value())?;
            entries.push(WorkoutEntry::new(date, count));
        }
        Ok(entries)
    }

    fn upsert(&mut self, date: NaiveDate, delta: u32) -> Result<WorkoutEntry, StoreError> {
        let txn = self.db.begin_write()?;
        let entry = {
            let mut table = txn.open_table(WORKOUTS)?;
            let key = date.to_string();
            let current: u32 = match table.get(key.as_str())? {
                Some(guard) => postcard::from_bytes(guard.value())?,
                None => 0,
            };
            let total = current.saturating_add(delta);
            let bytes = postcard::to_allocvec(&total)?;
            table.insert(key.as_str(), bytes.as_slice())?;
            WorkoutEntry::new(date, total)
        };
        txn.commit()?;
        Ok(entry)
    }
}

// =============================================================================
// TESTS
// =============================================================================
