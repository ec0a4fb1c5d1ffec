//! # Workout Module
//!
//! Per-day workout totals and the 7-day aggregation.
//!
//! One entry exists per calendar date. Flushing a session into a date that
//! already has an entry adds to its count (upsert by increment); the list
//! never holds duplicate dates once it has passed through [`upsert_entry`].

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// A single day's persisted rep total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutEntry {
    /// Calendar date of the workout.
    pub date: NaiveDate,
    /// Total reps flushed for that date.
    pub count: u32,
}

impl WorkoutEntry {
    /// Create a new entry.
    #[must_use]
    pub fn new(date: NaiveDate, count: u32) -> Self {
        Self { date, count }
    }
}

/// One bucket of the weekly aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayTotal {
    /// Bucket date.
    pub date: NaiveDate,
    /// Summed count for the date, 0 when no entry exists.
    pub count: u32,
}

/// Add `delta` into the entry for `date`, creating the entry if absent.
///
/// Returns the entry as stored after the update. A zero delta still creates
/// or touches the entry, so a stop with no reps is recorded as a real
/// (zero-total) workout day.
pub fn upsert_entry(entries: &mut Vec<WorkoutEntry>, date: NaiveDate, delta: u32) -> WorkoutEntry {
    if let Some(existing) = entries.iter_mut().find(|e| e.date == date) {
        existing.count = existing.count.saturating_add(delta);
        return *existing;
    }
    let entry = WorkoutEntry::new(date, delta);
    entries.push(entry);
    entry
}

/// Aggregate entries into exactly 7 calendar-day buckets ending at `end`.
///
/// Buckets are chronological. Days without an entry report 0. Entries
/// outside the window are ignored; duplicate dates (possible in a store
/// file written by hand) are summed into their bucket rather than rejected.
#[must_use]
pub fn weekly_totals(entries: &[WorkoutEntry], end: NaiveDate) -> Vec<DayTotal> {
    let start = end.checked_sub_days(Days::new(6)).unwrap_or(end);
    let mut buckets: Vec<DayTotal> = (0..7)
        .filter_map(|i| start.checked_add_days(Days::new(i)))
        .map(|date| DayTotal { date, count: 0 })
        .collect();

    for entry in entries {
        if let Some(bucket) = buckets.iter_mut().find(|b| b.date == entry.date) {
            bucket.count = bucket.count.saturating_add(entry.count);
        }
    }
    buckets
}

// =============================================================================
// TESTS
// =============================================================================
