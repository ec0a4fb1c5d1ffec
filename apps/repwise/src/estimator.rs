//! Pose estimation seam.
//!
//! Landmark detection is an external capability. The server consumes its
//! output in one of two forms: landmarks shipped by the client alongside
//! each pushed frame (the usual deployment, the browser runs the model), or
//! a server-side estimator plugged in through [`PoseEstimator`].

use image::DynamicImage;
use repwise_core::PoseFrame;
use thiserror::Error;

/// Errors from server-side pose estimation.
#[derive(Debug, Error)]
pub enum EstimatorError {
    /// No server-side estimator is wired in; frames must carry landmarks.
    #[error("no pose estimator configured; supply landmarks with each frame")]
    Unavailable,

    /// The estimator itself failed on this frame.
    #[error("pose estimation failed: {0}")]
    Backend(String),
}

/// A server-side pose estimator.
///
/// `detect` returns `Ok(None)` when no body is found in the frame; that is
/// not an error, the frame simply carries no measurement.
pub trait PoseEstimator: Send + Sync {
    fn detect(&self, frame: &DynamicImage) -> Result<Option<PoseFrame>, EstimatorError>;
}

/// Placeholder estimator for deployments where clients supply landmarks.
///
/// Every image-only frame is rejected with [`EstimatorError::Unavailable`]
/// so the caller gets a clear signal instead of a silent "no detection".
#[derive(Debug, Default)]
pub struct NoEstimator;

impl PoseEstimator for NoEstimator {
    fn detect(&self, _frame: &DynamicImage) -> Result<Option<PoseFrame>, EstimatorError> {
        Err(EstimatorError::Unavailable)
    }
}

// =============================================================================
// TESTS
// =============================================================================
