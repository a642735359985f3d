//! HTTP and WebSocket route handlers.
//!
//! - `health`: health, readiness, metrics and version endpoints
//! - `live`: producer pushes, live subscriptions and per-camera stats

pub mod health;
pub mod live;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Largest inspection result a producer may push.
pub const MAX_PUSH_BODY_BYTES: usize = 1024 * 1024;

/// All routes with their state applied. Transport layers (tracing, CORS) are added by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route("/metrics", get(health::metrics))
        .route("/metrics/prometheus", get(health::metrics_prometheus))
        .route("/version", get(health::version))
        .route("/live_inspection", get(live::list_cameras))
        .route(
            "/live_inspection/{camera_id}",
            post(live::push_inspection).get(live::camera_stats),
        )
        .route("/ws/live", get(live::subscribe))
        .route("/ws/live/{camera_id}", get(live::subscribe_camera))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_PUSH_BODY_BYTES))
}
