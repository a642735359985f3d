#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response};
use inspection_live::config::AppConfig;
use inspection_live::error::{AppError, AppResult};
use inspection_live::live::MetadataStore;
use inspection_live::state::AppState;
use inspection_live::types::InspectionMetadata;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

pub const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// Single-connection in-memory database; the schema lives as long as the pool.
pub async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap()
}

pub fn lazy_pool() -> SqlitePool {
    SqlitePoolOptions::new().connect_lazy("sqlite::memory:").unwrap()
}

pub fn metadata_for(camera: &str) -> InspectionMetadata {
    InspectionMetadata {
        camera_id: camera.to_string(),
        camera_name: format!("CAM {}", camera),
        location: format!("Location {}", camera),
        lot_no: "LOT-2025".to_string(),
        product_id: "PROD-1".to_string(),
        product_name: "Bottle".to_string(),
        serial_no: "CB550GT50".to_string(),
        product_date_time: "2025-06-01T08:00:00Z".to_string(),
        total_ng: 10,
        total_product: 5000,
        actual_product: 4000,
    }
}

/// Answers every camera with the same record shape.
pub struct EchoStore;

#[async_trait]
impl MetadataStore for EchoStore {
    async fn latest_for_camera(&self, camera: &str) -> AppResult<Option<InspectionMetadata>> {
        Ok(Some(metadata_for(camera)))
    }
}

/// Nothing planned for any camera.
pub struct EmptyStore;

#[async_trait]
impl MetadataStore for EmptyStore {
    async fn latest_for_camera(&self, _camera: &str) -> AppResult<Option<InspectionMetadata>> {
        Ok(None)
    }
}

/// Every lookup fails.
pub struct FailingStore;

#[async_trait]
impl MetadataStore for FailingStore {
    async fn latest_for_camera(&self, _camera: &str) -> AppResult<Option<InspectionMetadata>> {
        Err(AppError::ServiceUnavailable("metadata store offline".to_string()))
    }
}

pub fn state_with(store: impl MetadataStore + 'static) -> AppState {
    AppState::with_metadata(lazy_pool(), AppConfig::default(), Arc::new(store))
}

/// Like [`state_with`], with each camera queue bounded to `buffer` entries.
pub fn state_with_buffer(store: impl MetadataStore + 'static, buffer: usize) -> AppState {
    let mut config = AppConfig::default();
    config.live.subscriber_buffer = buffer;
    AppState::with_metadata(lazy_pool(), config, Arc::new(store))
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

pub fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}
