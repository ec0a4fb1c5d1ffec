//! Shared application state.
//!
//! One session, one store, both behind mutexes on a shared `Arc`. Every
//! counter mutation and every stop flush takes the session lock, so a stop
//! request and an in-flight frame serialize instead of racing: the frame is
//! either fully counted before the flush or skipped after it (the active
//! flag is re-checked under the lock).

use crate::chart::ChartRenderer;
use crate::estimator::PoseEstimator;
use chrono::{Local, NaiveDate};
use repwise_core::{ExerciseSession, SessionConfig, WorkoutStore};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Everything the handlers and the pull loop share.
pub struct AppState {
    session: Mutex<ExerciseSession>,
    store: Mutex<Box<dyn WorkoutStore + Send>>,
    estimator: Arc<dyn PoseEstimator>,
    renderer: Box<dyn ChartRenderer>,
}

impl AppState {
    /// Assemble the shared state.
    pub fn new(
        config: SessionConfig,
        store: Box<dyn WorkoutStore + Send>,
        estimator: Arc<dyn PoseEstimator>,
        renderer: Box<dyn ChartRenderer>,
    ) -> Self {
        Self {
            session: Mutex::new(ExerciseSession::new(config)),
            store: Mutex::new(store),
            estimator,
            renderer,
        }
    }

    /// Lock the session. A poisoned lock is recovered: the session state is
    /// plain data and stays consistent even if a holder panicked.
    pub fn session(&self) -> MutexGuard<'_, ExerciseSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock the store.
    pub fn store(&self) -> MutexGuard<'_, Box<dyn WorkoutStore + Send>> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The configured server-side estimator.
    pub fn estimator(&self) -> &dyn PoseEstimator {
        self.estimator.as_ref()
    }

    /// The chart renderer.
    pub fn renderer(&self) -> &dyn ChartRenderer {
        self.renderer.as_ref()
    }

    /// Today's calendar date in local time.
    pub fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}
