//! # Repwise Core
//!
//! The deterministic rep-counting engine: body landmarks in, discrete
//! repetition events and per-day workout totals out.
//!
//! ## Layers
//!
//! - [`landmark`]: the fixed 33-point body landmark set and pose container.
//! - [`angle`]: elbow angle from a landmark triple, visibility-gated.
//! - [`counter`]: the hysteresis state machine turning angle streams into
//!   counted reps.
//! - [`session`]: start/stop lifecycle, flush-to-store, week aggregation.
//! - [`workout`]: per-date entries and the 7-day bucketing.
//! - [`storage`]: durable backends (flat JSON file, redb) behind one trait.
//!
//! The crate is synchronous and single-writer by construction. Hosts that
//! process frames and control requests from different threads wrap the
//! [`session::ExerciseSession`] in a mutex; nothing in here spawns or
//! shares.

pub mod angle;
pub mod counter;
pub mod landmark;
pub mod session;
pub mod storage;
pub mod workout;

pub use angle::{arm_angle, joint_angle};
pub use counter::{ArmSelection, RepCounter, Stage, Thresholds, Transition};
pub use landmark::{Landmark, LandmarkIndex, PoseFrame, Side};
pub use session::{ExerciseSession, SessionConfig, SessionSnapshot, StartOutcome, StopSummary};
pub use storage::{JsonFileStore, MemoryStore, RedbStore, StoreError, WorkoutStore};
pub use workout::{DayTotal, WorkoutEntry, upsert_entry, weekly_totals};
