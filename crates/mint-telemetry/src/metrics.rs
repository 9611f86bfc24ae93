//! Prometheus metrics for the mint runtime.
//!
//! Metrics follow the naming convention `mint_<area>_<metric>_<unit>`. The
//! coordinator's `mint_fulfillment_*` series register themselves in the
//! default registry when its `metrics` feature is on; [`MetricsHandle`]
//! renders everything in that registry.

use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Mint flow runs, labeled by result (fulfilled / timed_out / cancelled / failed)
    pub static ref MINT_FLOWS: IntCounterVec = register_int_counter_vec!(
        "mint_flows_total",
        "Total number of mint flow runs by result",
        &["result"]
    )
    .expect("metric creation failed");

    /// Chain transactions sent, labeled by call (mint_basic / request_nft)
    pub static ref CHAIN_TRANSACTIONS: IntCounterVec = register_int_counter_vec!(
        "mint_chain_transactions_total",
        "Total number of transactions sent to the chain by call",
        &["call"]
    )
    .expect("metric creation failed");
}

/// Handle onto the process metrics registry.
#[derive(Clone)]
pub struct MetricsHandle {
    registry: Registry,
}

impl MetricsHandle {
    /// Text exposition of every registered metric.
    pub fn render(&self) -> Result<String, TelemetryError> {
        encode_registry(&self.registry)
    }
}

/// Force registration of the runtime metrics and return a handle.
pub fn register_metrics() -> MetricsHandle {
    lazy_static::initialize(&MINT_FLOWS);
    lazy_static::initialize(&CHAIN_TRANSACTIONS);

    MetricsHandle {
        registry: prometheus::default_registry().clone(),
    }
}

fn encode_registry(registry: &Registry) -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
