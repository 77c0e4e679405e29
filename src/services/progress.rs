use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::sse::Event;
use chrono::{DateTime, Utc};
use futures::{stream::BoxStream, StreamExt};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 1024;

/// Rows between import progress notifications
pub const PROGRESS_STEP: usize = 50;

/// Notification pushed to every open `/api/progress` stream
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ProgressEvent {
    #[serde(rename_all = "camelCase")]
    Import { meeting_id: i32, processed: usize, total: usize },
    #[serde(rename_all = "camelCase")]
    CheckIn { shareholder_id: String, checked_in: bool },
    #[serde(rename_all = "camelCase")]
    CheckInsReset { properties: u64, shareholders: u64 },
    #[serde(rename_all = "camelCase")]
    PropertyTransferred { property_id: i32, to_shareholder_id: String },
}

impl ProgressEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ProgressEvent::Import { .. } => "import",
            ProgressEvent::CheckIn { .. } => "checkin",
            ProgressEvent::CheckInsReset { .. } => "checkins_reset",
            ProgressEvent::PropertyTransferred { .. } => "transfer",
        }
    }

    pub fn to_sse_event(&self) -> Event {
        match Event::default().event(self.name()).json_data(self) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("Failed to encode progress event: {}", e);
                Event::default().event(self.name())
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    pub id: Uuid,
    pub connected_at: DateTime<Utc>,
}

/// Fan-out of progress events plus the set of currently open streams.
#[derive(Clone)]
pub struct ProgressHub {
    sender: broadcast::Sender<ProgressEvent>,
    connections: Arc<Mutex<HashMap<Uuid, DateTime<Utc>>>>,
}

impl Default for ProgressHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            sender,
            connections: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Deliver to every open stream; a hub with no listeners drops the event
    pub fn publish(&self, event: ProgressEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("No progress listeners connected");
        }
    }

    pub fn connection_count(&self) -> usize {
        self.lock().len()
    }

    pub fn connections(&self) -> Vec<ConnectionInfo> {
        let mut out: Vec<ConnectionInfo> = self
            .lock()
            .iter()
            .map(|(id, connected_at)| ConnectionInfo { id: *id, connected_at: *connected_at })
            .collect();
        out.sort_by_key(|c| c.connected_at);
        out
    }

    /// Register a connection and return its live event stream.
    /// The connection leaves the set when the returned stream is dropped.
    pub fn subscribe(&self) -> (Uuid, BoxStream<'static, ProgressEvent>) {
        let guard = self.register();
        let id = guard.id;
        let stream = BroadcastStream::new(self.sender.subscribe())
            .filter_map(|res| async move {
                match res {
                    Ok(event) => Some(event),
                    Err(e) => {
                        tracing::warn!("Progress stream lagged: {}", e);
                        None
                    }
                }
            })
            .map(move |event| {
                let _held = &guard;
                event
            })
            .boxed();
        (id, stream)
    }

    /// SSE form of [`ProgressHub::subscribe`]
    pub fn sse_stream(&self) -> BoxStream<'static, Result<Event, std::convert::Infallible>> {
        let (id, stream) = self.subscribe();
        tracing::debug!(connection = %id, "Progress stream opened");
        stream.map(|event| Ok(event.to_sse_event())).boxed()
    }

    fn register(&self) -> ConnectionGuard {
        let id = Uuid::new_v4();
        self.lock().insert(id, Utc::now());
        ConnectionGuard { id, connections: self.connections.clone() }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, DateTime<Utc>>> {
        self.connections.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

struct ConnectionGuard {
    id: Uuid,
    connections: Arc<Mutex<HashMap<Uuid, DateTime<Utc>>>>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let mut connections = self.connections.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        connections.remove(&self.id);
        tracing::debug!(connection = %self.id, "Progress stream closed");
    }
}
