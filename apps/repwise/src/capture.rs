//! Pull-mode ingestion.
//!
//! Instead of clients pushing frames, a background task drains a
//! [`PoseSource`] while the session is active. The source abstracts the
//! camera-plus-estimator pairing; the built-in implementation replays a
//! recorded pose stream from a JSONL file, and a live device binding plugs
//! in behind the same trait.
//!
//! Every counter update goes through the shared session lock, so a stop
//! request cannot observe a half-applied frame; the loop simply sees the
//! inactive flag on its next iteration and goes back to idling.

use crate::state::AppState;
use repwise_core::{Landmark, PoseFrame, Transition};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from a pose source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Reading the source failed.
    #[error("pose source I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A recorded step could not be parsed.
    #[error("pose source parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A recorded step did not carry the full body set.
    #[error("recorded step has {0} landmarks instead of the full body set")]
    BadLandmarkCount(usize),
}

/// One step of a pose stream.
#[derive(Debug, Clone)]
pub enum PoseStep {
    /// A body was detected with these landmarks.
    Detected(PoseFrame),
    /// The frame held no detection. Not an error.
    NoDetection,
}

/// A pull-mode stream of pose estimations.
///
/// `Ok(None)` means the source is exhausted (replay files end; live
/// devices never return it).
pub trait PoseSource: Send {
    fn next_step(&mut self) -> Result<Option<PoseStep>, SourceError>;
}

/// Replays a recorded pose stream from a JSONL file.
///
/// Each line is either `null` (a frame with no detection) or a JSON array
/// of the full 33-landmark body set.
#[derive(Debug)]
pub struct JsonlPoseSource {
    lines: std::vec::IntoIter<String>,
}

impl JsonlPoseSource {
    /// Load a recording. The whole file is read up front; recordings are
    /// short demo artifacts, not unbounded streams.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let raw = fs::read_to_string(path)?;
        let lines: Vec<String> = raw
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(ToOwned::to_owned)
            .collect();
        Ok(Self {
            lines: lines.into_iter(),
        })
    }
}

impl PoseSource for JsonlPoseSource {
    fn next_step(&mut self) -> Result<Option<PoseStep>, SourceError> {
        let Some(line) = self.lines.next() else {
            return Ok(None);
        };
        let landmarks: Option<Vec<Landmark>> = serde_json::from_str(&line)?;
        match landmarks {
            None => Ok(Some(PoseStep::NoDetection)),
            Some(landmarks) => {
                let count = landmarks.len();
                let pose = PoseFrame::from_slice(&landmarks)
                    .ok_or(SourceError::BadLandmarkCount(count))?;
                Ok(Some(PoseStep::Detected(pose)))
            }
        }
    }
}

/// Drain a pose source into the shared session.
///
/// Idles while the session is inactive, applies one step per tick while it
/// is active, and returns when the source is exhausted. Source errors are
/// logged and the offending step is dropped; transient frame trouble is the
/// loop's concern, never the counter's.
pub async fn run_pull_loop(state: Arc<AppState>, mut source: Box<dyn PoseSource>, tick: Duration) {
    info!("pull-mode ingestion loop running");
    loop {
        tokio::time::sleep(tick).await;
        if !state.session().is_active() {
            continue;
        }

        match source.next_step() {
            Ok(Some(PoseStep::Detected(pose))) => {
                let transition = state.session().observe_pose(&pose);
                match transition {
                    Transition::RepCounted { total } => info!(total, "rep counted"),
                    Transition::EnteredDown => debug!("arms extended"),
                    Transition::None | Transition::Skipped => {}
                }
            }
            Ok(Some(PoseStep::NoDetection)) => debug!("no body in frame"),
            Ok(None) => {
                info!("pose source exhausted, pull loop finished");
                return;
            }
            Err(e) => warn!("dropping frame: {e}"),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
