//! # Counter Module
//!
//! The repetition state machine.
//!
//! A rep is a full extend-then-curl cycle: every tracked elbow angle rises
//! above the high threshold (stage `Down`, arms extended), then falls below
//! the low threshold (stage `Up`, arms curled), which is the moment the
//! count increments. The gap between the two thresholds is the hysteresis
//! band; an angle oscillating around a single threshold can never
//! double-count because it never completes the cycle.
//!
//! Invariant: the count increases only on a down-to-up transition and never
//! decreases except through [`RepCounter::reset`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default high threshold in degrees (arms considered extended above this).
pub const DEFAULT_HIGH_DEG: f32 = 160.0;

/// Default low threshold when both arms are tracked.
pub const DEFAULT_LOW_DEG_BOTH: f32 = 40.0;

/// Default low threshold when a single arm is tracked.
pub const DEFAULT_LOW_DEG_SINGLE: f32 = 30.0;

/// Errors from threshold configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ThresholdError {
    /// The high threshold must sit strictly above the low one.
    #[error("hysteresis band is empty: high {high} deg <= low {low} deg")]
    EmptyBand { high: f32, low: f32 },

    /// Thresholds are angle measurements and must fit in [0,180].
    #[error("threshold {value} deg outside the valid range 0..=180")]
    OutOfRange { value: f32 },
}

/// The hysteresis band for the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    high_deg: f32,
    low_deg: f32,
}

impl Thresholds {
    /// Create a threshold pair, validating the band.
    pub fn new(high_deg: f32, low_deg: f32) -> Result<Self, ThresholdError> {
        for value in [high_deg, low_deg] {
            if !(0.0..=180.0).contains(&value) {
                return Err(ThresholdError::OutOfRange { value });
            }
        }
        if high_deg <= low_deg {
            return Err(ThresholdError::EmptyBand {
                high: high_deg,
                low: low_deg,
            });
        }
        Ok(Self { high_deg, low_deg })
    }

    /// The conventional defaults for an arm selection: 160/40 when both
    /// arms drive the counter, 160/30 for a single arm.
    #[must_use]
    pub fn for_arms(arms: ArmSelection) -> Self {
        let low = match arms {
            ArmSelection::Both => DEFAULT_LOW_DEG_BOTH,
            ArmSelection::Left | ArmSelection::Right => DEFAULT_LOW_DEG_SINGLE,
        };
        Self {
            high_deg: DEFAULT_HIGH_DEG,
            low_deg: low,
        }
    }

    /// High threshold in degrees.
    #[must_use]
    pub fn high_deg(&self) -> f32 {
        self.high_deg
    }

    /// Low threshold in degrees.
    #[must_use]
    pub fn low_deg(&self) -> f32 {
        self.low_deg
    }
}

/// Which arms drive the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArmSelection {
    /// Both elbows must cross each threshold.
    Both,
    /// Only the left elbow is tracked.
    Left,
    /// Only the right elbow is tracked.
    Right,
}

/// The state machine's current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Arms extended; the next full curl counts a rep.
    Down,
    /// Arms curled; waiting to re-extend.
    Up,
}

/// What a single observed frame did to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A required angle was missing; the frame was skipped.
    Skipped,
    /// Angles were present but crossed no threshold.
    None,
    /// Every tracked angle exceeded the high threshold.
    EnteredDown,
    /// A full cycle completed; the count incremented to `total`.
    RepCounted { total: u32 },
}

/// The per-frame repetition counter.
#[derive(Debug, Clone)]
pub struct RepCounter {
    thresholds: Thresholds,
    arms: ArmSelection,
    stage: Option<Stage>,
    count: u32,
}

impl RepCounter {
    /// Create a counter with explicit thresholds.
    #[must_use]
    pub fn new(thresholds: Thresholds, arms: ArmSelection) -> Self {
        Self {
            thresholds,
            arms,
            stage: None,
            count: 0,
        }
    }

    /// Create a counter with the default thresholds for the arm selection.
    #[must_use]
    pub fn with_defaults(arms: ArmSelection) -> Self {
        Self::new(Thresholds::for_arms(arms), arms)
    }

    /// Current rep count.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Current stage, `None` until the first extension is seen.
    #[must_use]
    pub fn stage(&self) -> Option<Stage> {
        self.stage
    }

    /// Arm selection this counter tracks.
    #[must_use]
    pub fn arms(&self) -> ArmSelection {
        self.arms
    }

    /// Thresholds this counter applies.
    #[must_use]
    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Feed one frame's angle measurements through the machine.
    ///
    /// Angles are per-arm and already visibility-gated; `None` means the arm
    /// had no usable measurement this frame. The frame is skipped unless
    /// every tracked angle is present.
    pub fn observe(&mut self, left: Option<f32>, right: Option<f32>) -> Transition {
        let high = self.thresholds.high_deg;
        let low = self.thresholds.low_deg;
        let (all_high, all_low) = match self.arms {
            ArmSelection::Both => match (left, right) {
                (Some(l), Some(r)) => (l > high && r > high, l < low && r < low),
                _ => return Transition::Skipped,
            },
            ArmSelection::Left => match left {
                Some(l) => (l > high, l < low),
                None => return Transition::Skipped,
            },
            ArmSelection::Right => match right {
                Some(r) => (r > high, r < low),
                None => return Transition::Skipped,
            },
        };

        // Extension is evaluated before completion within a single frame.
        let mut transition = Transition::None;
        if all_high {
            self.stage = Some(Stage::Down);
            transition = Transition::EnteredDown;
        }
        if all_low && self.stage == Some(Stage::Down) {
            self.count += 1;
            self.stage = Some(Stage::Up);
            transition = Transition::RepCounted { total: self.count };
        }
        transition
    }

    /// Reset count and stage to the initial state.
    pub fn reset(&mut self) {
        self.count = 0;
        self.stage = None;
    }
}

// =============================================================================
// TESTS
// =============================================================================
