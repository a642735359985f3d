use std::{sync::Arc, time::Duration};

use crate::config::AppConfig;
use crate::live::{LiveHub, MetadataStore, SqliteMetadataStore};
use crate::metrics::Metrics;

/// The shared application state.
///
/// Created once at startup and handed to every handler through Axum's `State`
/// extractor. Clones share the same hub, store and counters.
#[derive(Clone)]
pub struct AppState {
    /// The database connection pool, used by the readiness probe and the metadata store.
    pub db: sqlx::SqlitePool,
    /// Per-camera subscribers and pending updates.
    pub live: LiveHub,
    /// Where live results get their camera/product/lot fields from.
    pub metadata: Arc<dyn MetadataStore>,
    pub config: Arc<AppConfig>,
    pub metrics: Metrics,
}

impl AppState {
    /// Creates the state with a SQLite-backed metadata store on `db`.
    pub fn new(db: sqlx::SqlitePool, config: AppConfig) -> Self {
        let store = SqliteMetadataStore::new(
            db.clone(),
            Duration::from_millis(config.live.lookup_timeout_ms),
        );
        Self::with_metadata(db, config, Arc::new(store))
    }

    /// Creates the state with a caller-supplied metadata store.
    pub fn with_metadata(db: sqlx::SqlitePool, config: AppConfig, metadata: Arc<dyn MetadataStore>) -> Self {
        Self {
            db,
            live: LiveHub::new(config.live.subscriber_buffer),
            metadata,
            config: Arc::new(config),
            metrics: Metrics::new(),
        }
    }
}
