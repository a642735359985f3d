use std::time::Duration;

use axum::{
    extract::{
        rejection::JsonRejection,
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::Response,
    Json,
};
use futures::{future, stream::SplitStream, SinkExt, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::{
    error::{validation::validate_camera_id, AppResult, OptionExt},
    live::LiveSession,
    state::AppState,
    types::{CameraStats, ClientCommand, PushStatus, UpdatePayload},
};

/// How long a client on `/ws/live` may take to send its `join`.
const JOIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Producer push: queue one inspection result for every subscriber of the camera.
pub async fn push_inspection(
    State(state): State<AppState>,
    Path(camera_id): Path<String>,
    payload: Result<Json<UpdatePayload>, JsonRejection>,
) -> AppResult<Json<PushStatus>> {
    let camera = validate_camera_id(&camera_id)?;
    let Json(payload) = payload.inspect_err(|e| {
        tracing::debug!(camera_id = %camera, error = %e, "Rejected push body");
    })?;
    state.metrics.inc_pushes_received();

    let status = state.live.enqueue(&camera, payload).await;
    match &status {
        PushStatus::Queued { clients } => {
            state.metrics.inc_pushes_queued();
            tracing::debug!(camera_id = %camera, clients, "Inspection result queued");
        }
        PushStatus::NoActiveSocket => {
            state.metrics.inc_pushes_dropped();
        }
    }
    Ok(Json(status))
}

pub async fn list_cameras(State(state): State<AppState>) -> Json<Vec<CameraStats>> {
    Json(state.live.snapshot().await)
}

pub async fn camera_stats(
    State(state): State<AppState>,
    Path(camera_id): Path<String>,
) -> AppResult<Json<CameraStats>> {
    let camera = validate_camera_id(&camera_id)?;
    let stats = state.live.stats(&camera).await.ok_or_not_found("live camera")?;
    Ok(Json(stats))
}

/// `GET /ws/live/{camera_id}`: subscribe straight away.
pub async fn subscribe_camera(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(camera_id): Path<String>,
) -> AppResult<Response> {
    let camera = validate_camera_id(&camera_id)?;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, Some(camera))))
}

/// `GET /ws/live`: the client picks its camera with `{"action": "join", "cameraId": ...}`.
pub async fn subscribe(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, None))
}

async fn handle_socket(socket: WebSocket, state: AppState, camera: Option<String>) {
    let (sender, mut receiver) = socket.split();

    let camera = match camera {
        Some(camera) => camera,
        None => match tokio::time::timeout(JOIN_TIMEOUT, await_join(&mut receiver)).await {
            Ok(Some(camera)) => camera,
            Ok(None) => return,
            Err(_) => {
                tracing::debug!("Live client did not join in time");
                return;
            }
        },
    };

    let cancel = CancellationToken::new();
    let sink = sender.with(|text: String| future::ready(Ok::<Message, axum::Error>(Message::Text(text.into()))));
    let session = LiveSession::connect(state, &camera, sink, cancel.clone()).await;
    tracing::info!(camera_id = %camera, subscriber_id = ?session.subscriber_id(), "Live client connected");

    let watcher = tokio::spawn(watch_client(receiver, cancel.clone(), camera));
    session.run().await;
    cancel.cancel();
    let _ = watcher.await;
}

async fn await_join(receiver: &mut SplitStream<WebSocket>) -> Option<String> {
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientCommand>(text.as_str()) {
                Ok(ClientCommand::Join { camera_id }) => match validate_camera_id(&camera_id) {
                    Ok(camera) => return Some(camera),
                    Err(e) => tracing::debug!(error = %e, "Rejected join"),
                },
                Ok(ClientCommand::Leave) => return None,
                Err(e) => tracing::debug!(error = %e, "Ignoring client message"),
            },
            Ok(Message::Close(_)) => return None,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "WebSocket error before join");
                return None;
            }
        }
    }
    None
}

/// Reads the client side until it closes or leaves, then cancels the session.
async fn watch_client(mut receiver: SplitStream<WebSocket>, cancel: CancellationToken, camera: String) {
    loop {
        let msg = tokio::select! {
            _ = cancel.cancelled() => return,
            msg = receiver.next() => msg,
        };
        match msg {
            None | Some(Ok(Message::Close(_))) => {
                tracing::info!(camera_id = %camera, "Live client disconnected");
                break;
            }
            Some(Err(e)) => {
                tracing::warn!(camera_id = %camera, error = %e, "WebSocket error");
                break;
            }
            Some(Ok(Message::Text(text))) => match serde_json::from_str::<ClientCommand>(text.as_str()) {
                Ok(ClientCommand::Leave) => {
                    tracing::info!(camera_id = %camera, "Live client left");
                    break;
                }
                Ok(ClientCommand::Join { camera_id }) => {
                    tracing::debug!(camera_id = %camera, requested = %camera_id, "Ignoring join on subscribed socket");
                }
                Err(e) => tracing::trace!(error = %e, "Ignoring client message"),
            },
            // Pong is handled automatically by axum
            Some(Ok(_)) => {}
        }
    }
    cancel.cancel();
}
