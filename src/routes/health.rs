use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

// Health check endpoint - lightweight
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

// Readiness probe: checks DB connectivity with timeout protection
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let query = sqlx::query("SELECT 1").fetch_one(&state.db);
    match tokio::time::timeout(std::time::Duration::from_secs(5), query).await {
        Ok(Ok(_)) => (StatusCode::OK, "ready").into_response(),
        Ok(Err(e)) => (StatusCode::SERVICE_UNAVAILABLE, format!("not ready: {}", e)).into_response(),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "not ready: timeout").into_response(),
    }
}

// Metrics endpoint: returns JSON snapshot
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state
        .metrics
        .get_snapshot(state.live.camera_count().await, state.live.subscriber_count().await);
    Json(snapshot)
}

// Prometheus-compatible text exposition format
pub async fn metrics_prometheus(State(state): State<AppState>) -> impl IntoResponse {
    let m = state
        .metrics
        .get_snapshot(state.live.camera_count().await, state.live.subscriber_count().await);
    let counters = [
        ("pushes_received", "Inspection results pushed by producers", m.pushes_received),
        ("pushes_queued", "Pushes queued for at least one subscriber", m.pushes_queued),
        ("pushes_dropped", "Pushes for cameras without subscribers", m.pushes_dropped),
        ("sessions_opened", "Live sessions opened", m.sessions_opened),
        ("sessions_closed", "Live sessions closed", m.sessions_closed),
        ("results_delivered", "Messages delivered to subscribers", m.results_delivered),
        ("lookup_misses", "Results without planning/defect metadata", m.lookup_misses),
        ("lookup_failures", "Failed metadata lookups", m.lookup_failures),
        ("payloads_lagged", "Results dropped for lagging subscribers", m.payloads_lagged),
    ];
    let gauges = [
        ("active_cameras", "Cameras with at least one subscriber", m.active_cameras as u64),
        ("active_subscribers", "Connected live subscribers", m.active_subscribers as u64),
        ("uptime_seconds", "Uptime seconds", m.uptime_seconds),
    ];

    let mut body = String::new();
    for (name, help, value) in counters {
        body.push_str(&format!(
            "# HELP inspection_live_{name} {help}\n# TYPE inspection_live_{name} counter\ninspection_live_{name} {value}\n"
        ));
    }
    for (name, help, value) in gauges {
        body.push_str(&format!(
            "# HELP inspection_live_{name} {help}\n# TYPE inspection_live_{name} gauge\ninspection_live_{name} {value}\n"
        ));
    }
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}

// Version/Build info endpoint (JSON)
pub async fn version() -> impl IntoResponse {
    let body = serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "package": {
            "description": env!("CARGO_PKG_DESCRIPTION"),
            "authors": env!("CARGO_PKG_AUTHORS"),
            "license": env!("CARGO_PKG_LICENSE"),
        },
        "build": {
            "profile": if cfg!(debug_assertions) { "debug" } else { "release" },
            "os": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
        }
    });
    (StatusCode::OK, Json(body))
}
