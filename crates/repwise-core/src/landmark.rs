//! # Landmark Module
//!
//! The fixed 33-point body landmark set and per-frame pose container.
//!
//! Landmark positions are normalized image coordinates in [0,1] with a
//! per-joint visibility confidence. They are supplied by an external pose
//! estimator; this crate never looks inside the estimator, it only consumes
//! the coordinates.

use serde::{Deserialize, Serialize};

/// Index into the 33-point body landmark set.
///
/// The numbering follows the common full-body pose model layout, so
/// client-side estimators can ship their output without remapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum LandmarkIndex {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl LandmarkIndex {
    /// Number of landmarks in the set.
    pub const COUNT: usize = 33;

    /// Convert a raw index into a landmark identifier.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Nose),
            1 => Some(Self::LeftEyeInner),
            2 => Some(Self::LeftEye),
            3 => Some(Self::LeftEyeOuter),
            4 => Some(Self::RightEyeInner),
            5 => Some(Self::RightEye),
            6 => Some(Self::RightEyeOuter),
            7 => Some(Self::LeftEar),
            8 => Some(Self::RightEar),
            9 => Some(Self::MouthLeft),
            10 => Some(Self::MouthRight),
            11 => Some(Self::LeftShoulder),
            12 => Some(Self::RightShoulder),
            13 => Some(Self::LeftElbow),
            14 => Some(Self::RightElbow),
            15 => Some(Self::LeftWrist),
            16 => Some(Self::RightWrist),
            17 => Some(Self::LeftPinky),
            18 => Some(Self::RightPinky),
            19 => Some(Self::LeftIndex),
            20 => Some(Self::RightIndex),
            21 => Some(Self::LeftThumb),
            22 => Some(Self::RightThumb),
            23 => Some(Self::LeftHip),
            24 => Some(Self::RightHip),
            25 => Some(Self::LeftKnee),
            26 => Some(Self::RightKnee),
            27 => Some(Self::LeftAnkle),
            28 => Some(Self::RightAnkle),
            29 => Some(Self::LeftHeel),
            30 => Some(Self::RightHeel),
            31 => Some(Self::LeftFootIndex),
            32 => Some(Self::RightFootIndex),
            _ => None,
        }
    }
}

/// Left or right body side, used to select which arm drives the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// The shoulder/elbow/wrist triple for this side, proximal to distal.
    #[must_use]
    pub fn arm_joints(self) -> [LandmarkIndex; 3] {
        match self {
            Side::Left => [
                LandmarkIndex::LeftShoulder,
                LandmarkIndex::LeftElbow,
                LandmarkIndex::LeftWrist,
            ],
            Side::Right => [
                LandmarkIndex::RightShoulder,
                LandmarkIndex::RightElbow,
                LandmarkIndex::RightWrist,
            ],
        }
    }
}

/// A single body landmark.
///
/// `x` and `y` are normalized image coordinates. A `z` supplied by 3D-capable
/// estimators is ignored at ingestion; the counter works in the image plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Normalized x coordinate (0.0 to 1.0).
    pub x: f32,
    /// Normalized y coordinate (0.0 to 1.0).
    pub y: f32,
    /// Confidence that the joint is visible (0.0 to 1.0).
    #[serde(default)]
    pub visibility: f32,
}

impl Landmark {
    /// Create a new landmark.
    #[must_use]
    pub fn new(x: f32, y: f32, visibility: f32) -> Self {
        Self { x, y, visibility }
    }

    /// Whether the joint clears the visibility threshold.
    ///
    /// The threshold is exclusive: a landmark exactly at the threshold is
    /// treated as not visible, matching the skip rule for low-confidence
    /// frames.
    #[must_use]
    pub fn is_visible(&self, threshold: f32) -> bool {
        self.visibility > threshold
    }

    /// Convert to pixel coordinates for a given frame size.
    #[must_use]
    pub fn to_pixel(&self, width: u32, height: u32) -> (i32, i32) {
        let px = (self.x * width as f32) as i32;
        let py = (self.y * height as f32) as i32;
        (px, py)
    }
}

impl Default for Landmark {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            visibility: 0.0,
        }
    }
}

/// One frame's worth of body landmarks.
#[derive(Debug, Clone)]
pub struct PoseFrame {
    landmarks: [Landmark; LandmarkIndex::COUNT],
}

impl PoseFrame {
    /// Create a pose frame from the full landmark array.
    #[must_use]
    pub fn new(landmarks: [Landmark; LandmarkIndex::COUNT]) -> Self {
        Self { landmarks }
    }

    /// Build a pose frame from a slice.
    ///
    /// Returns `None` unless exactly [`LandmarkIndex::COUNT`] landmarks are
    /// supplied. Estimators that emit a partial or over-long set are treated
    /// as "no detection" for the frame.
    #[must_use]
    pub fn from_slice(landmarks: &[Landmark]) -> Option<Self> {
        let mut fixed = [Landmark::default(); LandmarkIndex::COUNT];
        if landmarks.len() != LandmarkIndex::COUNT {
            return None;
        }
        fixed.copy_from_slice(landmarks);
        Some(Self { landmarks: fixed })
    }

    /// Get a landmark by identifier.
    #[must_use]
    pub fn get(&self, index: LandmarkIndex) -> &Landmark {
        &self.landmarks[index as usize]
    }

    /// All landmarks in index order.
    #[must_use]
    pub fn landmarks(&self) -> &[Landmark; LandmarkIndex::COUNT] {
        &self.landmarks
    }

    /// The shoulder/elbow/wrist triple for one arm, if every joint of the
    /// triple clears the visibility threshold.
    #[must_use]
    pub fn arm(&self, side: Side, min_visibility: f32) -> Option<[Landmark; 3]> {
        let [shoulder, elbow, wrist] = side.arm_joints();
        let triple = [*self.get(shoulder), *self.get(elbow), *self.get(wrist)];
        if triple.iter().all(|l| l.is_visible(min_visibility)) {
            Some(triple)
        } else {
            None
        }
    }
}

impl Default for PoseFrame {
    fn default() -> Self {
        Self {
            landmarks: [Landmark::default(); LandmarkIndex::COUNT],
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
