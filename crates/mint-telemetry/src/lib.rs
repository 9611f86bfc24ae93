//! # Mint Telemetry
//!
//! Logging and metrics for the VRF mint runtime.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mint_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(TelemetryConfig::from_env())?;
//!     // Logs and metrics are now being collected
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `MINT_SERVICE_NAME` | `vrf-mint` | Service name in log lines |
//! | `MINT_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `MINT_JSON_LOGS` | `false` | JSON output (on by default in containers) |
//! | `MINT_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `MINT_NETWORK` | `hardhat` | Network name |

mod config;
mod logging;
mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{register_metrics, MetricsHandle, CHAIN_TRANSACTIONS, MINT_FLOWS};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and metrics.
///
/// Returns a guard to hold for the lifetime of the application. It exposes
/// the metrics handle for rendering.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = register_metrics();
    logging::init_logging(&config)?;

    Ok(TelemetryGuard { config, metrics })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    config: TelemetryConfig,
    metrics: MetricsHandle,
}

impl TelemetryGuard {
    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    pub fn metrics(&self) -> &MetricsHandle {
        &self.metrics
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.config.service_name, "Shutting down telemetry");
    }
}
