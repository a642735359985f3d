//! Per-camera subscriber sets and pending-update queues.
//!
//! Each camera with at least one subscriber owns a bounded `broadcast` channel.
//! Every subscriber holds its own receiver, so one push reaches all of them in
//! arrival order. A subscriber that falls more than `capacity` entries behind
//! loses the oldest entries (`RecvError::Lagged`). The camera entry, channel
//! included, disappears together with its last subscriber.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::types::{CameraKey, CameraStats, PushStatus, UpdatePayload};

struct CameraTopic {
    sender: broadcast::Sender<Arc<UpdatePayload>>,
    subscribers: HashSet<Uuid>,
}

/// Registry of live cameras. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct LiveHub {
    topics: Arc<RwLock<HashMap<CameraKey, CameraTopic>>>,
    capacity: usize,
}

/// One subscription to one camera, owned by its session.
pub struct SubscriberHandle {
    id: Uuid,
    camera: CameraKey,
    receiver: broadcast::Receiver<Arc<UpdatePayload>>,
}

impl SubscriberHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn camera(&self) -> &str {
        &self.camera
    }

    /// Waits for the next payload of this camera.
    ///
    /// Cancel-safe: dropping the future never loses a payload.
    pub async fn recv(&mut self) -> Result<Arc<UpdatePayload>, RecvError> {
        self.receiver.recv().await
    }
}

impl LiveHub {
    /// `capacity` bounds each camera's queue; values below 1 are raised to 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Adds a subscriber to `camera`, creating the camera entry if needed.
    pub async fn register(&self, camera: &str) -> SubscriberHandle {
        let id = Uuid::new_v4();
        let mut topics = self.topics.write().await;
        let topic = topics.entry(camera.to_string()).or_insert_with(|| {
            tracing::debug!(camera_id = %camera, "Creating live topic");
            let (sender, _rx) = broadcast::channel(self.capacity);
            CameraTopic { sender, subscribers: HashSet::new() }
        });
        let receiver = topic.sender.subscribe();
        topic.subscribers.insert(id);
        tracing::info!(
            camera_id = %camera,
            subscriber_id = %id,
            clients = topic.subscribers.len(),
            "Subscriber registered"
        );

        SubscriberHandle { id, camera: camera.to_string(), receiver }
    }

    /// Removes a subscriber. The last one out tears the camera entry down and
    /// discards whatever is still queued. Returns `false` if it was not registered.
    pub async fn unregister(&self, camera: &str, id: Uuid) -> bool {
        let mut topics = self.topics.write().await;
        let Some(topic) = topics.get_mut(camera) else {
            return false;
        };
        if !topic.subscribers.remove(&id) {
            return false;
        }

        let remaining = topic.subscribers.len();
        if remaining == 0 {
            topics.remove(camera);
            tracing::debug!(camera_id = %camera, "Live topic torn down");
        }
        tracing::info!(camera_id = %camera, subscriber_id = %id, clients = remaining, "Subscriber unregistered");
        true
    }

    /// Queues `payload` for every current subscriber of `camera`.
    pub async fn enqueue(&self, camera: &str, payload: UpdatePayload) -> PushStatus {
        let topics = self.topics.read().await;
        let Some(topic) = topics.get(camera) else {
            tracing::debug!(camera_id = %camera, "Push for camera without subscribers dropped");
            return PushStatus::NoActiveSocket;
        };

        let clients = topic.subscribers.len();
        if let Err(e) = topic.sender.send(Arc::new(payload)) {
            // Receivers live inside the handles, so this only happens if a
            // handle was dropped without unregistering.
            tracing::warn!(camera_id = %camera, error = %e, "Live topic has no receivers");
        }
        PushStatus::Queued { clients }
    }

    pub async fn stats(&self, camera: &str) -> Option<CameraStats> {
        let topics = self.topics.read().await;
        topics.get(camera).map(|topic| Self::topic_stats(camera, topic))
    }

    /// Stats for every active camera, sorted by camera id.
    pub async fn snapshot(&self) -> Vec<CameraStats> {
        let topics = self.topics.read().await;
        let mut all: Vec<CameraStats> =
            topics.iter().map(|(camera, topic)| Self::topic_stats(camera, topic)).collect();
        all.sort_by(|a, b| a.camera_id.cmp(&b.camera_id));
        all
    }

    pub async fn camera_count(&self) -> usize {
        self.topics.read().await.len()
    }

    pub async fn subscriber_count(&self) -> usize {
        self.topics.read().await.values().map(|t| t.subscribers.len()).sum()
    }

    fn topic_stats(camera: &str, topic: &CameraTopic) -> CameraStats {
        CameraStats {
            camera_id: camera.to_string(),
            clients: topic.subscribers.len(),
            pending: topic.sender.len(),
        }
    }
}
