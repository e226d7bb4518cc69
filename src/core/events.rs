//! Page-cache invalidation
//!
//! Mutations never render pages themselves; they only announce that a cached
//! view is stale. The [`PageCache`] trait is that announcement, and
//! [`RevalidationBus`] is the default implementation: a
//! `tokio::sync::broadcast` channel that page renderers subscribe to.
//!
//! # Architecture
//!
//! ```text
//! create/update/delete handler ──▶ PageCache::revalidate() ──▶ broadcast ──▶ renderer A
//!                                                                         ──▶ renderer B
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! let bus = RevalidationBus::new(256);
//! let mut rx = bus.subscribe();
//!
//! bus.revalidate("/dashboard/invoices");
//!
//! if let Ok(event) = rx.recv().await {
//!     println!("stale: {}", event.path);
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Cache-invalidation collaborator
///
/// Fire-and-forget: nothing is returned and nothing can fail from the
/// caller's point of view.
pub trait PageCache: Send + Sync {
    /// Mark the cached view at `path` stale
    fn revalidate(&self, path: &str);
}

/// A single "this path is stale" notice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevalidationEvent {
    /// Unique event ID
    pub id: Uuid,
    /// When the path was invalidated
    pub timestamp: DateTime<Utc>,
    /// The stale view
    pub path: String,
}

impl RevalidationEvent {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            path: path.into(),
        }
    }
}

/// Broadcast-based revalidation bus
///
/// Cheap to clone (the sender is reference counted) and shareable across
/// threads.
#[derive(Debug, Clone)]
pub struct RevalidationBus {
    sender: broadcast::Sender<RevalidationEvent>,
}

impl RevalidationBus {
    /// Create a bus buffering up to `capacity` events per lagging receiver
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an invalidation and return how many receivers got it
    ///
    /// With no subscribers the event is dropped.
    pub fn publish(&self, path: &str) -> usize {
        self.sender.send(RevalidationEvent::new(path)).unwrap_or(0)
    }

    /// Receive every invalidation published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<RevalidationEvent> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Hand every event from `receiver` to `on_event` until the bus is dropped
///
/// A receiver that falls behind loses the oldest events; that is logged and
/// following resumes with the oldest event still buffered.
pub async fn follow(
    mut receiver: broadcast::Receiver<RevalidationEvent>,
    mut on_event: impl FnMut(RevalidationEvent),
) {
    loop {
        match receiver.recv().await {
            Ok(event) => on_event(event),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "revalidation receiver fell behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

impl Default for RevalidationBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl PageCache for RevalidationBus {
    fn revalidate(&self, path: &str) {
        let receivers = self.publish(path);
        tracing::debug!(path, receivers, "revalidated cached view");
    }
}
