//! # Inspection Live Backend Library
//!
//! Live fan-out of camera inspection results. An external producer pushes the
//! result of each inspected item; every client watching that camera receives
//! it over a WebSocket, merged with the camera's current lot, product and
//! defect counters from the inspection database.
//!
//! ## Architecture
//!
//! - **Axum**: HTTP server, routing and WebSocket upgrades
//! - **SQLx**: Asynchronous metadata queries against SQLite
//! - **Tokio**: Async runtime, broadcast channels and cancellation
//! - **Serde**: JSON wire formats
//!
//! ## Core Components
//!
//! - [`config`]: Application configuration management
//! - [`db`]: Database schema initialization
//! - [`error`]: Centralized error handling and HTTP error responses
//! - [`live`]: Subscriber registry, delivery sessions, metadata lookup and merging
//! - [`metrics`]: Pipeline counters
//! - [`routes`]: HTTP and WebSocket handlers
//! - [`state`]: Shared application state
//! - [`types`]: Wire types shared by producers, subscribers and the store

pub mod config;
pub mod db;
pub mod error;
pub mod live;
pub mod metrics;
pub mod routes;
pub mod state;
pub mod types;
