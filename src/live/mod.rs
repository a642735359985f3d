//! Live inspection fan-out.
//!
//! - [`hub`]: per-camera subscriber sets and bounded pending queues
//! - [`session`]: the per-connection wait/enrich/send loop
//! - [`metadata`]: lookup of the camera/plan/product record a result is merged with
//! - [`merge`]: how a producer payload and that record become one message

pub mod hub;
pub mod merge;
pub mod metadata;
pub mod session;

pub use hub::{LiveHub, SubscriberHandle};
pub use metadata::{MetadataStore, SqliteMetadataStore};
pub use session::{LiveSession, SessionEnd, SessionState};
