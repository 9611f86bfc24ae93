//! # VRF Mint Runtime
//!
//! Mints a basic NFT, then requests a random NFT and waits for the oracle to
//! fulfil it.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry
//! 2. Load and validate configuration
//! 3. Start the bus bridge
//! 4. Run the mint flow (Ctrl+C cancels the wait)
//! 5. Shut down

use anyhow::{Context, Result};
use fulfillment_coordinator::CancelHandle;
use mint_runtime::{MintRuntime, RuntimeConfig};
use mint_telemetry::{init_telemetry, TelemetryConfig};
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = init_telemetry(TelemetryConfig::from_env()).context("Failed to init telemetry")?;

    let config = RuntimeConfig::from_env();
    info!(
        network = %config.network,
        timeout_secs = config.timeout_secs,
        development = config.is_development_chain(),
        "Configuration loaded"
    );

    let runtime = MintRuntime::new(config).context("Invalid runtime configuration")?;
    runtime.start();

    let cancel = CancelHandle::new();
    let signal = cancel.signal();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Ctrl+C received, cancelling the fulfilment wait");
            cancel.cancel();
        }
    });

    let result = runtime.run_flow(signal).await;
    runtime.shutdown().await;

    let report = result.context("Mint flow failed")?;
    info!(
        report = %serde_json::to_string(&report).context("Failed to encode report")?,
        "Mint flow finished"
    );

    match telemetry.metrics().render() {
        Ok(text) => debug!(metrics = %text, "Metrics snapshot"),
        Err(err) => warn!(error = %err, "Could not render metrics"),
    }

    Ok(())
}
