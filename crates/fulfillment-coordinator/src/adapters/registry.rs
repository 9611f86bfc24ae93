//! In-memory completion channel.
//!
//! Holds every active listener keyed by subscription id and fans each
//! completion event out to all of them. An event nobody claims or holds is a
//! stray: logged, counted, dropped.

use crate::metrics;
use crate::ports::outbound::{
    CompletionChannel, CompletionHandler, Disposition, Subscription, SubscriptionId,
};
use dashmap::DashMap;
use parking_lot::Mutex;
use shared_bus::ResolvedRequestCache;
use shared_types::{CompletionEvent, RequestId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

/// Why an event was stray
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrayKind {
    /// The request already reached a terminal outcome
    Duplicate,
    /// No wait for this id was seen recently
    Unknown,
}

impl StrayKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Duplicate => "duplicate",
            Self::Unknown => "unknown",
        }
    }
}

/// Result of dispatching one event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// A listener claimed it
    Delivered,
    /// At least one listener still waiting on its action kept it
    Held,
    /// Nobody wanted it
    Stray(StrayKind),
}

/// Dispatch statistics
#[derive(Debug, Default)]
pub struct RegistryStats {
    /// Total events dispatched
    pub total_dispatched: AtomicU64,
    /// Events claimed by a listener
    pub total_delivered: AtomicU64,
    /// Events held by listeners whose id was not yet known
    pub total_held: AtomicU64,
    /// Stray events for already-resolved requests
    pub total_duplicates: AtomicU64,
    /// Stray events for unknown requests
    pub total_unknown: AtomicU64,
}

/// Listener registry implementing [`CompletionChannel`].
pub struct ListenerRegistry {
    listeners: Arc<DashMap<SubscriptionId, CompletionHandler>>,
    resolved: Mutex<ResolvedRequestCache>,
    stats: RegistryStats,
}

impl ListenerRegistry {
    /// Create a registry with the default resolved-id retention.
    #[must_use]
    pub fn new() -> Self {
        Self::with_resolved_ttl(ResolvedRequestCache::DEFAULT_TTL)
    }

    /// Create a registry remembering resolved ids for `ttl`.
    #[must_use]
    pub fn with_resolved_ttl(ttl: Duration) -> Self {
        Self {
            listeners: Arc::new(DashMap::new()),
            resolved: Mutex::new(ResolvedRequestCache::with_config(
                ttl,
                ResolvedRequestCache::DEFAULT_GC_INTERVAL,
            )),
            stats: RegistryStats::default(),
        }
    }

    /// Offer `event` to every registered listener.
    ///
    /// An event for a request that already resolved is a duplicate and never
    /// reaches the listeners, so an unbound listener cannot hold it.
    pub fn dispatch(&self, event: &CompletionEvent) -> Dispatch {
        self.stats.total_dispatched.fetch_add(1, Ordering::Relaxed);

        if self.is_resolved(&event.request_id) {
            return self.stray(event, StrayKind::Duplicate);
        }

        // Snapshot first so handlers never run under a shard lock
        let handlers: Vec<CompletionHandler> = self
            .listeners
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let mut claimed = false;
        let mut held = false;
        for handler in &handlers {
            match handler(event) {
                Disposition::Claimed => claimed = true,
                Disposition::Held => held = true,
                Disposition::Ignored => {}
            }
        }

        if claimed {
            self.stats.total_delivered.fetch_add(1, Ordering::Relaxed);
            self.resolved.lock().record(event.request_id.clone());
            debug!(request_id = %event.request_id, "Completion event delivered");
            return Dispatch::Delivered;
        }

        if held {
            self.stats.total_held.fetch_add(1, Ordering::Relaxed);
            debug!(request_id = %event.request_id, "Completion event held by pending submission");
            return Dispatch::Held;
        }

        // The wait may have resolved while the handlers ran
        let kind = if self.is_resolved(&event.request_id) {
            StrayKind::Duplicate
        } else {
            StrayKind::Unknown
        };
        self.stray(event, kind)
    }

    fn stray(&self, event: &CompletionEvent, kind: StrayKind) -> Dispatch {
        let counter = match kind {
            StrayKind::Duplicate => &self.stats.total_duplicates,
            StrayKind::Unknown => &self.stats.total_unknown,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        metrics::record_stray_event(kind.label());
        warn!(
            request_id = %event.request_id,
            kind = kind.label(),
            listeners = self.listeners.len(),
            "Stray completion event dropped"
        );
        Dispatch::Stray(kind)
    }

    /// Get statistics
    pub fn stats(&self) -> &RegistryStats {
        &self.stats
    }

    /// Whether `request_id` resolved within the retention window
    pub fn is_resolved(&self, request_id: &RequestId) -> bool {
        self.resolved.lock().contains(request_id)
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionChannel for ListenerRegistry {
    fn subscribe(&self, handler: CompletionHandler) -> Subscription {
        let id = Uuid::now_v7();
        self.listeners.insert(id, handler);
        metrics::set_active_listeners(self.listeners.len());
        debug!(subscription_id = %id, listeners = self.listeners.len(), "Listener registered");

        let listeners = Arc::downgrade(&self.listeners);
        Subscription::new(id, move |id| {
            if let Some(listeners) = listeners.upgrade() {
                listeners.remove(&id);
                metrics::set_active_listeners(listeners.len());
                debug!(subscription_id = %id, listeners = listeners.len(), "Listener removed");
            }
        })
    }

    fn unsubscribe(&self, subscription: Subscription) {
        drop(subscription);
    }

    fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn mark_resolved(&self, request_id: &RequestId) {
        self.resolved.lock().record(request_id.clone());
    }
}
