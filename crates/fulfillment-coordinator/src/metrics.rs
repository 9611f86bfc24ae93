//! # Coordinator Metrics
//!
//! Prometheus metrics for request/fulfilment waits.
//!
//! Enable with the `metrics` feature:
//! ```toml
//! fulfillment-coordinator = { path = "...", features = ["metrics"] }
//! ```
//!
//! - `mint_fulfillment_outcomes_total` - Counter of wait outcomes (by outcome)
//! - `mint_fulfillment_stray_events_total` - Counter of stray events (by kind)
//! - `mint_fulfillment_wait_seconds` - Histogram of time from submission to outcome
//! - `mint_fulfillment_active_listeners` - Gauge of registered listeners

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_histogram, register_int_counter_vec, register_int_gauge, Histogram, IntCounterVec,
    IntGauge,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Wait outcomes, labeled fulfilled / timed_out / cancelled / submission_failed
    pub static ref OUTCOMES: IntCounterVec = register_int_counter_vec!(
        "mint_fulfillment_outcomes_total",
        "Total number of completed waits by outcome",
        &["outcome"]
    )
    .expect("Failed to create OUTCOMES metric");

    /// Stray completion events, labeled duplicate / unknown
    pub static ref STRAY_EVENTS: IntCounterVec = register_int_counter_vec!(
        "mint_fulfillment_stray_events_total",
        "Total number of completion events no listener wanted",
        &["kind"]
    )
    .expect("Failed to create STRAY_EVENTS metric");

    /// Submission-to-outcome latency
    pub static ref WAIT_SECONDS: Histogram = register_histogram!(
        "mint_fulfillment_wait_seconds",
        "Time from submission to terminal outcome",
        vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 15.0, 60.0, 300.0]
    )
    .expect("Failed to create WAIT_SECONDS metric");

    /// Currently registered listeners
    pub static ref ACTIVE_LISTENERS: IntGauge = register_int_gauge!(
        "mint_fulfillment_active_listeners",
        "Number of listeners registered on the completion channel"
    )
    .expect("Failed to create ACTIVE_LISTENERS metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record a terminal outcome (or submission failure)
#[cfg(feature = "metrics")]
pub fn record_outcome(outcome: &str) {
    OUTCOMES.with_label_values(&[outcome]).inc();
}

/// Record a stray completion event
#[cfg(feature = "metrics")]
pub fn record_stray_event(kind: &str) {
    STRAY_EVENTS.with_label_values(&[kind]).inc();
}

/// Observe how long a wait took
#[cfg(feature = "metrics")]
pub fn observe_wait_seconds(seconds: f64) {
    WAIT_SECONDS.observe(seconds);
}

/// Update the listener gauge
#[cfg(feature = "metrics")]
pub fn set_active_listeners(count: usize) {
    ACTIVE_LISTENERS.set(i64::try_from(count).unwrap_or(i64::MAX));
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_outcome(_outcome: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_stray_event(_kind: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn observe_wait_seconds(_seconds: f64) {}

#[cfg(not(feature = "metrics"))]
pub fn set_active_listeners(_count: usize) {}
