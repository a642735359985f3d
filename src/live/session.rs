//! Delivery loop of one live subscriber.
//!
//! `CONNECTED -> WAITING -> ENRICHING -> SENDING -> WAITING -> ... -> CLOSED`
//!
//! Every suspension point races the session's [`CancellationToken`], so a
//! client that goes away while the session waits for a payload, a lookup or a
//! send is unregistered right away.

use std::fmt;
use std::time::Duration;

use futures::{Sink, SinkExt};
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::AppError;
use crate::live::hub::SubscriberHandle;
use crate::live::merge::{merge, LOOKUP_FAILED_ERROR, NO_METADATA_ERROR};
use crate::state::AppState;
use crate::types::{ErrorPayload, UpdatePayload};

const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    Waiting,
    Enriching,
    Sending,
    Closed,
}

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The client went away or asked to leave.
    Disconnected,
    /// Writing to the client failed.
    TransmitFailed,
    /// The camera's queue was closed underneath the session.
    TornDown,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("metadata lookup failed: {0}")]
    Lookup(AppError),
    #[error("failed to serialize live message: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One subscriber connection. Owns its [`SubscriberHandle`] until closed.
pub struct LiveSession<S> {
    state: AppState,
    camera: String,
    handle: Option<SubscriberHandle>,
    sink: S,
    cancel: CancellationToken,
    phase: SessionState,
}

impl<S> LiveSession<S>
where
    S: Sink<String> + Unpin + Send,
    S::Error: fmt::Display,
{
    /// Registers a new subscriber for `camera` and leaves the session waiting.
    pub async fn connect(state: AppState, camera: &str, sink: S, cancel: CancellationToken) -> Self {
        let handle = state.live.register(camera).await;
        state.metrics.inc_sessions_opened();

        let mut session = Self {
            state,
            camera: camera.to_string(),
            handle: Some(handle),
            sink,
            cancel,
            phase: SessionState::Connected,
        };
        session.transition(SessionState::Waiting);
        session
    }

    pub fn phase(&self) -> SessionState {
        self.phase
    }

    pub fn subscriber_id(&self) -> Option<Uuid> {
        self.handle.as_ref().map(SubscriberHandle::id)
    }

    /// Delivers payloads until the client disconnects or a send fails, then closes.
    pub async fn run(mut self) -> SessionEnd {
        let end = loop {
            let Some(handle) = self.handle.as_mut() else {
                break SessionEnd::Disconnected;
            };

            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break SessionEnd::Disconnected,
                next = handle.recv() => next,
            };
            let payload = match next {
                Ok(payload) => payload,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(camera_id = %self.camera, skipped, "Subscriber lagging, oldest results dropped");
                    self.state.metrics.add_lagged(skipped);
                    continue;
                }
                Err(RecvError::Closed) => break SessionEnd::TornDown,
            };

            self.transition(SessionState::Enriching);
            let enriched = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break SessionEnd::Disconnected,
                res = enrich(&self.state, &self.camera, &payload) => res,
            };
            let text = match enriched {
                Ok(text) => text,
                Err(SessionError::Lookup(e)) => {
                    tracing::error!(camera_id = %self.camera, error = %e, "Metadata lookup failed");
                    self.state.metrics.inc_lookup_failures();
                    match error_message(LOOKUP_FAILED_ERROR) {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to serialize error payload");
                            self.transition(SessionState::Waiting);
                            continue;
                        }
                    }
                }
                Err(e) => {
                    tracing::error!(camera_id = %self.camera, error = %e, "Dropping live result");
                    self.transition(SessionState::Waiting);
                    continue;
                }
            };

            self.transition(SessionState::Sending);
            let sent = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break SessionEnd::Disconnected,
                res = self.sink.send(text) => res,
            };
            if let Err(e) = sent {
                tracing::warn!(camera_id = %self.camera, error = %e, "Failed to send to subscriber");
                break SessionEnd::TransmitFailed;
            }
            self.state.metrics.inc_results_delivered();
            self.transition(SessionState::Waiting);
        };

        self.close().await;
        tracing::info!(camera_id = %self.camera, reason = ?end, "Live session ended");
        end
    }

    /// Unregisters the subscriber and closes the sink. Safe to call twice.
    pub async fn close(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.state.live.unregister(handle.camera(), handle.id()).await;
        self.state.metrics.inc_sessions_closed();
        if tokio::time::timeout(CLOSE_TIMEOUT, self.sink.close()).await.is_err() {
            tracing::debug!(camera_id = %self.camera, "Timed out closing subscriber connection");
        }
        self.transition(SessionState::Closed);
    }

    fn transition(&mut self, next: SessionState) {
        tracing::trace!(camera_id = %self.camera, from = ?self.phase, to = ?next, "Session state");
        self.phase = next;
    }
}

impl<S> Drop for LiveSession<S> {
    // A session future dropped mid-flight still has to leave the registry.
    fn drop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let hub = self.state.live.clone();
        let metrics = self.state.metrics.clone();
        runtime.spawn(async move {
            hub.unregister(handle.camera(), handle.id()).await;
            metrics.inc_sessions_closed();
        });
    }
}

async fn enrich(state: &AppState, camera: &str, payload: &UpdatePayload) -> Result<String, SessionError> {
    let meta = state
        .metadata
        .latest_for_camera(camera)
        .await
        .map_err(SessionError::Lookup)?;

    match meta {
        Some(meta) => {
            let merged = merge(camera, payload, &meta, &state.config.live.stream_url_template);
            Ok(serde_json::to_string(&merged)?)
        }
        None => {
            tracing::debug!(camera_id = %camera, "No planning/defect record for camera");
            state.metrics.inc_lookup_misses();
            Ok(error_message(NO_METADATA_ERROR)?)
        }
    }
}

fn error_message(message: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string(&ErrorPayload { error: message.to_string() })
}
