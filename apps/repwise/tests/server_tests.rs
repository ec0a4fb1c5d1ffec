//! Integration tests for the Repwise HTTP API.
//!
//! Drives the full router with axum-test: session control, pushed frames
//! with client-side landmarks, and the stop flush with its chart artifact.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use axum_test::TestServer;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::{DynamicImage, ImageFormat};
use repwise::api::{FrameResponse, RepCountResponse, StartResponse, StopResponse, router};
use repwise::chart::BarChartRenderer;
use repwise::estimator::NoEstimator;
use repwise::state::AppState;
use repwise_core::{
    JsonFileStore, Landmark, LandmarkIndex, MemoryStore, SessionConfig, SessionSnapshot, Stage,
    StartOutcome, WorkoutStore,
};
use std::io::Cursor;
use std::sync::Arc;
use tempfile::TempDir;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn server_with_store(store: Box<dyn WorkoutStore + Send>) -> TestServer {
    let state = Arc::new(AppState::new(
        SessionConfig::default(),
        store,
        Arc::new(NoEstimator),
        Box::new(BarChartRenderer::default()),
    ));
    TestServer::new(router(state)).expect("test server")
}

fn server() -> TestServer {
    server_with_store(Box::new(MemoryStore::new()))
}

/// Small valid PNG as a data URL.
fn image_data_url() -> String {
    let img = DynamicImage::new_rgb8(64, 64);
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageFormat::Png).expect("encode");
    format!("data:image/png;base64,{}", BASE64.encode(bytes.into_inner()))
}

/// Full 33-landmark set with both elbows bent to `deg` degrees.
fn landmarks_with_elbow_angle(deg: f32) -> Vec<Landmark> {
    let mut landmarks = vec![Landmark::default(); LandmarkIndex::COUNT];
    let phi = -std::f32::consts::FRAC_PI_2 + deg.to_radians();
    for (shoulder, elbow, wrist, x) in [
        (
            LandmarkIndex::LeftShoulder,
            LandmarkIndex::LeftElbow,
            LandmarkIndex::LeftWrist,
            0.35,
        ),
        (
            LandmarkIndex::RightShoulder,
            LandmarkIndex::RightElbow,
            LandmarkIndex::RightWrist,
            0.65,
        ),
    ] {
        landmarks[shoulder as usize] = Landmark::new(x, 0.3, 0.9);
        landmarks[elbow as usize] = Landmark::new(x, 0.5, 0.9);
        landmarks[wrist as usize] = Landmark::new(x + 0.2 * phi.cos(), 0.5 + 0.2 * phi.sin(), 0.9);
    }
    landmarks
}

async fn push_frame(server: &TestServer, deg: f32) -> FrameResponse {
    let response = server
        .post("/frame")
        .json(&serde_json::json!({
            "image": image_data_url(),
            "landmarks": landmarks_with_elbow_angle(deg),
        }))
        .await;
    response.assert_status_ok();
    response.json::<FrameResponse>()
}

// =============================================================================
// HEALTH AND STATUS
// =============================================================================

#[tokio::test]
async fn health_reports_ok() {
    let server = server();
    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn status_is_initially_idle() {
    let server = server();
    let snapshot: SessionSnapshot = server.get("/status").await.json();

    assert_eq!(snapshot.counter, 0);
    assert_eq!(snapshot.stage, None);
    assert!(!snapshot.active);
}

// =============================================================================
// SESSION CONTROL
// =============================================================================

#[tokio::test]
async fn start_is_idempotent() {
    let server = server();

    let first: StartResponse = server.post("/start").await.json();
    assert_eq!(first.status, StartOutcome::Started);

    let second: StartResponse = server.post("/start").await.json();
    assert_eq!(second.status, StartOutcome::AlreadyActive);

    let snapshot: SessionSnapshot = server.get("/status").await.json();
    assert!(snapshot.active);
}

#[tokio::test]
async fn stop_returns_week_and_chart() {
    let server = server();
    server.post("/start").await.assert_status_ok();

    // Two full extend-then-curl cycles.
    for _ in 0..2 {
        push_frame(&server, 170.0).await;
        push_frame(&server, 20.0).await;
    }

    let response = server.post("/stop").await;
    response.assert_status_ok();
    let body: StopResponse = response.json();

    assert_eq!(body.status, "stopped");
    assert_eq!(body.saved.count, 2);
    assert_eq!(body.week.len(), 7);
    assert_eq!(body.week[6].count, 2, "today is the last bucket");

    // The chart artifact is a decodable PNG.
    let png = BASE64.decode(&body.chart).expect("base64 chart");
    assert!(image::load_from_memory(&png).is_ok());

    // Counter is reset for the next session.
    let count: RepCountResponse = server.get("/rep-count").await.json();
    assert_eq!(count.count, 0);
}

#[tokio::test]
async fn stop_then_start_preserves_flushed_entries() {
    let server = server();
    server.post("/start").await.assert_status_ok();
    push_frame(&server, 170.0).await;
    push_frame(&server, 20.0).await;
    server.post("/stop").await.assert_status_ok();

    let restart: StartResponse = server.post("/start").await.json();
    assert_eq!(restart.status, StartOutcome::Started);

    let snapshot: SessionSnapshot = server.get("/status").await.json();
    assert_eq!(snapshot.counter, 0);

    let workouts: serde_json::Value = server.get("/workouts").await.json();
    assert_eq!(workouts.as_array().map(Vec::len), Some(1));
    assert_eq!(workouts[0]["count"], 1);
}

#[tokio::test]
async fn double_stop_upserts_today_once() {
    let temp = TempDir::new().expect("temp dir");
    let store = JsonFileStore::open(temp.path().join("workouts.json")).expect("open");
    let server = server_with_store(Box::new(store));

    server.post("/start").await.assert_status_ok();
    push_frame(&server, 170.0).await;
    push_frame(&server, 20.0).await;

    let first: StopResponse = server.post("/stop").await.json();
    let second: StopResponse = server.post("/stop").await.json();

    assert_eq!(first.saved.count, 1);
    assert_eq!(second.saved.count, 1, "zero-delta stop keeps the total");

    let workouts: serde_json::Value = server.get("/workouts").await.json();
    assert_eq!(workouts.as_array().map(Vec::len), Some(1));
}

// =============================================================================
// FRAME PUSH
// =============================================================================

#[tokio::test]
async fn scripted_frames_count_one_rep() {
    let server = server();
    server.post("/start").await.assert_status_ok();

    let first = push_frame(&server, 170.0).await;
    assert_eq!(first.stage, Some(Stage::Down));
    assert_eq!(first.counter, 0);

    let second = push_frame(&server, 170.0).await;
    assert_eq!(second.stage, Some(Stage::Down));
    assert_eq!(second.counter, 0);

    let third = push_frame(&server, 30.0).await;
    assert_eq!(third.stage, Some(Stage::Up));
    assert_eq!(third.counter, 1);

    let fourth = push_frame(&server, 30.0).await;
    assert_eq!(fourth.counter, 1, "staying curled never double-counts");
}

#[tokio::test]
async fn oscillation_above_the_low_threshold_never_counts() {
    let server = server();
    server.post("/start").await.assert_status_ok();

    for _ in 0..10 {
        push_frame(&server, 170.0).await;
        push_frame(&server, 90.0).await;
    }

    let count: RepCountResponse = server.get("/rep-count").await.json();
    assert_eq!(count.count, 0);
}

#[tokio::test]
async fn frames_while_inactive_leave_state_unchanged() {
    let server = server();

    let response = server
        .post("/frame")
        .json(&serde_json::json!({
            "image": image_data_url(),
            "landmarks": landmarks_with_elbow_angle(170.0),
        }))
        .await;
    response.assert_status_ok();

    let body: FrameResponse = response.json();
    assert!(!body.active);
    assert_eq!(body.counter, 0);
    assert_eq!(body.stage, None);
    assert!(body.frame.is_none(), "no image work for idle sessions");
}

#[tokio::test]
async fn annotated_frame_comes_back_as_jpeg_data_url() {
    let server = server();
    server.post("/start").await.assert_status_ok();

    let body = push_frame(&server, 170.0).await;
    let frame = body.frame.expect("annotated frame");
    assert!(frame.starts_with("data:image/jpeg;base64,"));

    let png = BASE64
        .decode(frame.trim_start_matches("data:image/jpeg;base64,"))
        .expect("base64 frame");
    let img = image::load_from_memory(&png).expect("decodable jpeg");
    assert_eq!((img.width(), img.height()), (64, 64));
}

#[tokio::test]
async fn malformed_image_is_a_decode_error() {
    let server = server();
    server.post("/start").await.assert_status_ok();

    let response = server
        .post("/frame")
        .json(&serde_json::json!({ "image": "not a data url" }))
        .await;
    response.assert_status_bad_request();

    // The dropped frame left the counter untouched.
    let count: RepCountResponse = server.get("/rep-count").await.json();
    assert_eq!(count.count, 0);
}

#[tokio::test]
async fn undecodable_image_bytes_are_a_decode_error() {
    let server = server();
    server.post("/start").await.assert_status_ok();

    let data_url = format!("data:image/png;base64,{}", BASE64.encode(b"junk bytes"));
    let response = server
        .post("/frame")
        .json(&serde_json::json!({ "image": data_url }))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn partial_landmark_set_is_rejected() {
    let server = server();
    server.post("/start").await.assert_status_ok();

    let response = server
        .post("/frame")
        .json(&serde_json::json!({
            "image": image_data_url(),
            "landmarks": vec![Landmark::default(); 17],
        }))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn image_only_frame_without_estimator_is_unavailable() {
    let server = server();
    server.post("/start").await.assert_status_ok();

    let response = server
        .post("/frame")
        .json(&serde_json::json!({ "image": image_data_url() }))
        .await;
    response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);
}

// =============================================================================
// OCCLUSION
// =============================================================================

#[tokio::test]
async fn occluded_arm_skips_the_frame() {
    let server = server();
    server.post("/start").await.assert_status_ok();

    push_frame(&server, 170.0).await;

    // Hide the right wrist; the curl must not land.
    let mut landmarks = landmarks_with_elbow_angle(20.0);
    landmarks[LandmarkIndex::RightWrist as usize].visibility = 0.1;
    let response = server
        .post("/frame")
        .json(&serde_json::json!({
            "image": image_data_url(),
            "landmarks": landmarks,
        }))
        .await;
    response.assert_status_ok();

    let body: FrameResponse = response.json();
    assert_eq!(body.counter, 0);
    assert_eq!(body.stage, Some(Stage::Down), "stage holds across skips");
}
