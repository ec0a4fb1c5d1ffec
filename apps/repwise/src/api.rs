//! HTTP API.
//!
//! Flat JSON routes for session control, frame push and workout history.
//! Shared state lives behind `Arc<AppState>`; no handler awaits while
//! holding a lock, so control requests and frame pushes serialize cleanly
//! on the session mutex.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::chart::ChartError;
use crate::estimator::EstimatorError;
use crate::frame::{FrameError, decode_data_url, encode_data_url};
use crate::overlay::annotate;
use crate::state::AppState;
use repwise_core::{
    DayTotal, Landmark, PoseFrame, SessionSnapshot, Stage, StartOutcome, StoreError, WorkoutEntry,
};

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/start", post(start))
        .route("/stop", post(stop))
        .route("/status", get(status))
        .route("/rep-count", get(rep_count))
        .route("/workouts", get(workouts))
        .route("/frame", post(frame))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

// =============================================================================
// RESPONSE / REQUEST TYPES
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartResponse {
    pub status: StartOutcome,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StopResponse {
    pub status: String,
    /// Today's entry as persisted.
    pub saved: WorkoutEntry,
    /// The trailing week, oldest first.
    pub week: Vec<DayTotal>,
    /// Base64 PNG of the weekly bar chart.
    pub chart: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RepCountResponse {
    pub count: u32,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct FrameRequest {
    /// `data:image/...;base64,` payload.
    pub image: String,
    /// Landmarks detected client-side; when absent the server-side
    /// estimator runs instead.
    #[serde(default)]
    pub landmarks: Option<Vec<Landmark>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FrameResponse {
    pub counter: u32,
    pub stage: Option<Stage>,
    pub active: bool,
    /// Annotated frame as a JPEG data URL. Unannotated echo when the frame
    /// held no detection; absent when the session is inactive.
    pub frame: Option<String>,
}

impl FrameResponse {
    fn from_snapshot(snapshot: SessionSnapshot, frame: Option<String>) -> Self {
        Self {
            counter: snapshot.counter,
            stage: snapshot.stage,
            active: snapshot.active,
            frame,
        }
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn start(State(state): State<Arc<AppState>>) -> Json<StartResponse> {
    let outcome = state.session().start();
    info!(?outcome, "start requested");
    Json(StartResponse { status: outcome })
}

async fn stop(State(state): State<Arc<AppState>>) -> Result<Json<StopResponse>, ApiError> {
    let today = state.today();
    let summary = {
        let mut session = state.session();
        let mut store = state.store();
        session.stop(store.as_mut(), today)?
    };
    let chart_png = state.renderer().render(&summary.week)?;
    info!(
        date = %summary.saved.date,
        total = summary.saved.count,
        "session stopped, daily total flushed"
    );
    Ok(Json(StopResponse {
        status: "stopped".to_string(),
        saved: summary.saved,
        week: summary.week,
        chart: BASE64.encode(chart_png),
    }))
}

async fn status(State(state): State<Arc<AppState>>) -> Json<SessionSnapshot> {
    Json(state.session().snapshot())
}

async fn rep_count(State(state): State<Arc<AppState>>) -> Json<RepCountResponse> {
    Json(RepCountResponse {
        count: state.session().count(),
    })
}

async fn workouts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<WorkoutEntry>>, ApiError> {
    let entries = state.store().load()?;
    Ok(Json(entries))
}

/// Push-mode frame ingestion.
///
/// Decode, estimate (or take client landmarks), advance the counter, draw
/// the overlay, and return the updated snapshot with the annotated frame.
async fn frame(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FrameRequest>,
) -> Result<Json<FrameResponse>, ApiError> {
    // Inactive sessions do no image work; the counter must not move.
    let min_visibility = {
        let session = state.session();
        if !session.is_active() {
            return Ok(Json(FrameResponse::from_snapshot(session.snapshot(), None)));
        }
        session.min_visibility()
    };

    let img = decode_data_url(&req.image)?;

    let pose = match req.landmarks {
        Some(landmarks) => Some(
            PoseFrame::from_slice(&landmarks)
                .ok_or(ApiError::BadLandmarks(landmarks.len()))?,
        ),
        None => state.estimator().detect(&img)?,
    };

    // Counter update is atomic under the session lock; a concurrent stop
    // lands entirely before or after this frame.
    let snapshot = {
        let mut session = state.session();
        if let Some(pose) = &pose {
            session.observe_pose(pose);
        }
        session.snapshot()
    };

    let annotated = match &pose {
        Some(pose) => annotate(&img, pose, min_visibility),
        None => img,
    };
    let data_url = encode_data_url(&annotated)?;

    Ok(Json(FrameResponse::from_snapshot(
        snapshot,
        Some(data_url),
    )))
}

// =============================================================================
// ERROR MAPPING
// =============================================================================

/// API-facing error with an HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad frame payload; the frame was dropped, state unchanged.
    #[error("frame decode error: {0}")]
    Frame(#[from] FrameError),

    /// Landmark list was not the full body set.
    #[error("landmark list must contain the full 33-point body set, got {0}")]
    BadLandmarks(usize),

    /// Server-side estimation unavailable or failed.
    #[error(transparent)]
    Estimator(#[from] EstimatorError),

    /// Workout data could not be read or written.
    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),

    /// Chart artifact could not be produced.
    #[error("chart rendering failure: {0}")]
    Chart(#[from] ChartError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Frame(_) | ApiError::BadLandmarks(_) => StatusCode::BAD_REQUEST,
            ApiError::Estimator(EstimatorError::Unavailable) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Estimator(_) | ApiError::Persistence(_) | ApiError::Chart(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = self.to_string();
        if status.is_server_error() {
            error!("{message}");
        } else {
            warn!("{message}");
        }

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

// =============================================================================
// TESTS
// =============================================================================
