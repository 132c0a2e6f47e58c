//! Attachment change events.
//!
//! The realtime channel is an external collaborator pushing attachment-list
//! changes (the TV viewer consumes these). [`AttachmentEvents`] is the
//! subscription seam; [`BroadcastEvents`] is the in-memory implementation
//! used by tests and local tooling.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::debug;

use attachkit_core::{AttachmentRecord, TargetId};

/// Server-pushed change: the full attachment list for one target.
#[derive(Debug, Clone)]
pub struct AttachmentListChanged {
    pub target: TargetId,
    pub attachments: Vec<AttachmentRecord>,
}

pub type EventHandler = Box<dyn Fn(AttachmentListChanged) + Send + Sync>;

/// Subscription-style collaborator: register a handler for one target's
/// changes; dropping the returned subscription (or calling
/// [`unsubscribe`](EventSubscription::unsubscribe)) detaches it.
pub trait AttachmentEvents: Send + Sync {
    fn subscribe(&self, target: &TargetId, handler: EventHandler) -> EventSubscription;
}

pub struct EventSubscription {
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl EventSubscription {
    fn new(handle: tokio::task::JoinHandle<()>) -> Self {
        EventSubscription {
            handle: Some(handle),
        }
    }

    pub fn unsubscribe(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// In-memory event channel backed by `tokio::sync::broadcast`.
#[derive(Clone)]
pub struct BroadcastEvents {
    sender: Arc<broadcast::Sender<AttachmentListChanged>>,
}

impl BroadcastEvents {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        BroadcastEvents {
            sender: Arc::new(sender),
        }
    }

    /// Push a change to every live subscriber of the event's target.
    pub fn publish(&self, event: AttachmentListChanged) {
        // Send fails only when nobody is subscribed, which is fine.
        let _ = self.sender.send(event);
    }
}

impl Default for BroadcastEvents {
    fn default() -> Self {
        Self::new(64)
    }
}

impl AttachmentEvents for BroadcastEvents {
    fn subscribe(&self, target: &TargetId, handler: EventHandler) -> EventSubscription {
        let mut receiver = self.sender.subscribe();
        let target = target.clone();
        let handle = tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) if event.target == target => handler(event),
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(%target, skipped, "event subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        EventSubscription::new(handle)
    }
}
