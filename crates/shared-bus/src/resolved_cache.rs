//! # Resolved Request Cache
//!
//! Time-bounded memory of request ids that already reached a terminal
//! outcome. A completion event arriving for one of them is a duplicate
//! delivery; one arriving for an id not in the cache was never awaited here.
//!
//! - Entries live for `ttl` after they are recorded
//! - Expired entries are garbage-collected at most once per `gc_interval`
//! - Memory stays bounded by the number of requests resolved within one TTL

use shared_types::RequestId;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Time-bounded set of resolved request ids.
#[derive(Debug)]
pub struct ResolvedRequestCache {
    /// Map of request id -> when it was resolved.
    resolved: HashMap<RequestId, Instant>,

    /// How long a resolved id is remembered.
    ttl: Duration,

    /// Last garbage collection.
    last_gc: Instant,

    /// Garbage collection interval.
    gc_interval: Duration,
}

impl ResolvedRequestCache {
    /// Default retention: matches the longest default wait.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

    /// Default garbage collection interval.
    pub const DEFAULT_GC_INTERVAL: Duration = Duration::from_secs(10);

    /// Create a cache with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Self::DEFAULT_TTL, Self::DEFAULT_GC_INTERVAL)
    }

    /// Create a cache with custom settings.
    #[must_use]
    pub fn with_config(ttl: Duration, gc_interval: Duration) -> Self {
        Self {
            resolved: HashMap::new(),
            ttl,
            last_gc: Instant::now(),
            gc_interval,
        }
    }

    /// Record that `request_id` reached a terminal outcome.
    ///
    /// Returns `false` if it was already recorded (and still remembered).
    pub fn record(&mut self, request_id: RequestId) -> bool {
        let now = Instant::now();

        if now.duration_since(self.last_gc) > self.gc_interval {
            self.garbage_collect(now);
            self.last_gc = now;
        }

        if self.is_live(&request_id, now) {
            return false;
        }
        self.resolved.insert(request_id, now);
        true
    }

    /// Whether `request_id` was resolved within the retention window.
    #[must_use]
    pub fn contains(&self, request_id: &RequestId) -> bool {
        self.is_live(request_id, Instant::now())
    }

    /// Get the number of remembered ids (including not-yet-collected expired ones).
    #[must_use]
    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    /// Check if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    fn is_live(&self, request_id: &RequestId, now: Instant) -> bool {
        self.resolved
            .get(request_id)
            .is_some_and(|at| now.duration_since(*at) <= self.ttl)
    }

    fn garbage_collect(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.resolved.retain(|_, at| now.duration_since(*at) <= ttl);
    }
}

impl Default for ResolvedRequestCache {
    fn default() -> Self {
        Self::new()
    }
}
