//! # Session Module
//!
//! Exercise session lifecycle: start, per-frame observation, stop-and-flush.
//!
//! The session is the single owner of all mutable counter state. Callers in
//! a multi-threaded host must wrap it in a mutex (or drive it from one
//! task); every mutation goes through `&mut self`, so a stop can never
//! interleave with a half-applied frame once the wrapper serializes access.
//!
//! Frames observed while the session is inactive are skipped entirely; the
//! counter only moves between a `start` and the next `stop`.

use crate::angle::arm_angle;
use crate::counter::{ArmSelection, RepCounter, Stage, Thresholds, Transition};
use crate::landmark::{PoseFrame, Side};
use crate::storage::{StoreError, WorkoutStore};
use crate::workout::{DayTotal, WorkoutEntry, weekly_totals};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default visibility confidence a joint must exceed to be used.
pub const DEFAULT_MIN_VISIBILITY: f32 = 0.5;

/// Session construction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Which arms drive the counter.
    pub arms: ArmSelection,
    /// Hysteresis thresholds.
    pub thresholds: Thresholds,
    /// Per-joint visibility gate.
    pub min_visibility: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            arms: ArmSelection::Both,
            thresholds: Thresholds::for_arms(ArmSelection::Both),
            min_visibility: DEFAULT_MIN_VISIBILITY,
        }
    }
}

impl SessionConfig {
    /// Config with default thresholds for an arm selection.
    #[must_use]
    pub fn for_arms(arms: ArmSelection) -> Self {
        Self {
            arms,
            thresholds: Thresholds::for_arms(arms),
            min_visibility: DEFAULT_MIN_VISIBILITY,
        }
    }
}

/// Outcome of a `start` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartOutcome {
    /// The session was inactive and is now running.
    Started,
    /// The session was already running; nothing changed.
    AlreadyActive,
}

/// What `stop` flushed and aggregated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopSummary {
    /// Today's entry as persisted (count includes prior flushes today).
    pub saved: WorkoutEntry,
    /// The last 7 calendar days, oldest first, ending today.
    pub week: Vec<DayTotal>,
}

/// Read-only view of the counter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Current rep count.
    pub counter: u32,
    /// Current stage, if any extension has been seen.
    pub stage: Option<Stage>,
    /// Whether the session is running.
    pub active: bool,
}

/// An exercise session: a rep counter plus the active flag.
#[derive(Debug)]
pub struct ExerciseSession {
    counter: RepCounter,
    min_visibility: f32,
    active: bool,
}

impl ExerciseSession {
    /// Create an inactive session.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            counter: RepCounter::new(config.thresholds, config.arms),
            min_visibility: config.min_visibility,
            active: false,
        }
    }

    /// Whether the session is currently running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Current rep count.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.counter.count()
    }

    /// Current stage.
    #[must_use]
    pub fn stage(&self) -> Option<Stage> {
        self.counter.stage()
    }

    /// Visibility gate applied to incoming poses.
    #[must_use]
    pub fn min_visibility(&self) -> f32 {
        self.min_visibility
    }

    /// Snapshot of counter, stage and active flag.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            counter: self.counter.count(),
            stage: self.counter.stage(),
            active: self.active,
        }
    }

    /// Start the session. Idempotent: an active session reports
    /// [`StartOutcome::AlreadyActive`] and is otherwise untouched.
    pub fn start(&mut self) -> StartOutcome {
        if self.active {
            StartOutcome::AlreadyActive
        } else {
            self.active = true;
            StartOutcome::Started
        }
    }

    /// Feed one pose frame through the counter.
    ///
    /// Extracts the visibility-gated elbow angles and advances the state
    /// machine. Inactive sessions skip the frame.
    pub fn observe_pose(&mut self, pose: &PoseFrame) -> Transition {
        if !self.active {
            return Transition::Skipped;
        }
        let left = arm_angle(pose, Side::Left, self.min_visibility);
        let right = arm_angle(pose, Side::Right, self.min_visibility);
        self.counter.observe(left, right)
    }

    /// Feed pre-computed angles through the counter (for hosts that run
    /// their own angle extraction). Inactive sessions skip the frame.
    pub fn observe_angles(&mut self, left: Option<f32>, right: Option<f32>) -> Transition {
        if !self.active {
            return Transition::Skipped;
        }
        self.counter.observe(left, right)
    }

    /// Stop the session and flush the count into the store.
    ///
    /// Upserts today's entry (a zero count is a zero-delta upsert, so
    /// stopping twice in a row records today once with an unchanged total),
    /// aggregates the trailing week, then resets the counter.
    ///
    /// On a persistence failure the session still deactivates but the count
    /// is retained, so a retried stop flushes the same reps instead of
    /// losing them.
    pub fn stop(
        &mut self,
        store: &mut dyn WorkoutStore,
        today: NaiveDate,
    ) -> Result<StopSummary, StoreError> {
        self.active = false;
        let saved = store.upsert(today, self.counter.count())?;
        let entries = store.load()?;
        let week = weekly_totals(&entries, today);
        self.counter.reset();
        Ok(StopSummary { saved, week })
    }
}

impl Default for ExerciseSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

// =============================================================================
// TESTS
// =============================================================================
