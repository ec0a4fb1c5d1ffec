//! # Storage Module
//!
//! Durable backends for the workout log.
//!
//! The store is append/update only: one record per calendar date, updated by
//! increment. Two durable backends are provided, a flat JSON file (the
//! default, readable and trivially portable) and redb (ACID, crash-safe
//! copy-on-write B-trees), plus an in-memory store for tests and ephemeral
//! runs. Failures are surfaced to the caller; workout data is never
//! silently dropped.

mod json_store;
mod redb_store;

pub use json_store::JsonFileStore;
pub use redb_store::RedbStore;

use crate::workout::{WorkoutEntry, upsert_entry};
use chrono::NaiveDate;
use thiserror::Error;

/// Errors from workout persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem read or write failed.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The flat file held something other than a workout entry list.
    #[error("store JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A stored record could not be interpreted.
    #[error("corrupt store record: {0}")]
    Corrupt(String),

    /// redb database open failed.
    #[error("redb database error: {0}")]
    Database(#[from] redb::DatabaseError),

    /// redb transaction begin failed.
    #[error("redb transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    /// redb table open failed.
    #[error("redb table error: {0}")]
    Table(#[from] redb::TableError),

    /// redb read/write failed.
    #[error("redb storage error: {0}")]
    Storage(#[from] redb::StorageError),

    /// redb commit failed.
    #[error("redb commit error: {0}")]
    Commit(#[from] redb::CommitError),

    /// Value encoding or decoding failed.
    #[error("value encoding error: {0}")]
    Encoding(#[from] postcard::Error),
}

/// A durable store of per-day workout totals.
///
/// `upsert` adds `delta` into the record for `date`, creating it when
/// absent, and returns the record as persisted.
pub trait WorkoutStore {
    /// Read every stored entry.
    fn load(&self) -> Result<Vec<WorkoutEntry>, StoreError>;

    /// Add `delta` reps into the entry for `date`.
    fn upsert(&mut self, date: NaiveDate, delta: u32) -> Result<WorkoutEntry, StoreError>;
}

/// In-memory store. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Vec<WorkoutEntry>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl WorkoutStore for MemoryStore {
    fn load(&self) -> Result<Vec<WorkoutEntry>, StoreError> {
        Ok(self.entries.clone())
    }

    fn upsert(&mut self, date: NaiveDate, delta: u32) -> Result<WorkoutEntry, StoreError> {
        Ok(upsert_entry(&mut self.entries, date, delta))
    }
}

// =============================================================================
// TESTS
// =============================================================================
