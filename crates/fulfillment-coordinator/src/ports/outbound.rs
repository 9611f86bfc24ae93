//! Driven Ports (SPI - Outbound Dependencies)
//!
//! The coordinator's only boundary besides the caller's action: a channel of
//! completion events it can subscribe a handler to.

use shared_types::{CompletionEvent, RequestId};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Identifier of one handler registration
pub type SubscriptionId = Uuid;

/// What a handler did with an offered event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// The event completed the handler's request
    Claimed,
    /// The handler's request id is not known yet; the event was kept
    Held,
    /// Not for this handler (or it is already terminal)
    Ignored,
}

/// Handler invoked for every completion event on the channel.
///
/// Called from the dispatching task; must not block.
pub type CompletionHandler = Arc<dyn Fn(&CompletionEvent) -> Disposition + Send + Sync>;

/// Completion-event channel.
///
/// Many unrelated waits register concurrently; handlers filter by request id,
/// never by arrival order.
pub trait CompletionChannel: Send + Sync {
    /// Register a handler. It receives every event until the returned
    /// subscription is unsubscribed or dropped.
    fn subscribe(&self, handler: CompletionHandler) -> Subscription;

    /// Remove a registration.
    fn unsubscribe(&self, subscription: Subscription);

    /// Number of registered handlers.
    fn listener_count(&self) -> usize;

    /// Note that a request reached a terminal outcome, so later events for
    /// it can be recognised as duplicates.
    fn mark_resolved(&self, _request_id: &RequestId) {}
}

type ReleaseFn = Box<dyn FnOnce(SubscriptionId) + Send + Sync>;

/// Registration handle.
///
/// Releases its registration exactly once: on explicit unsubscribe or on
/// drop, whichever comes first.
pub struct Subscription {
    id: SubscriptionId,
    release: Option<ReleaseFn>,
}

impl Subscription {
    /// Create a handle that calls `release` when the registration ends.
    pub fn new(id: SubscriptionId, release: impl FnOnce(SubscriptionId) + Send + Sync + 'static) -> Self {
        Self {
            id,
            release: Some(Box::new(release)),
        }
    }

    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.release.is_some())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release(self.id);
        }
    }
}
