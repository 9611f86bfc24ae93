//! # Mint Runtime
//!
//! Owns the shared infrastructure and wires it together:
//!
//! ```text
//! DevChain ──publish──→ InMemoryEventBus ──NftMinted──→ BusBridge ──dispatch──→ ListenerRegistry
//!    ↑                                                                                 ↑
//!    └──── MintFlow ──submit_and_await──→ FulfillmentCoordinator ──subscribe───────────┘
//! ```

use crate::adapters::{DevChain, DevChainConfig, DevRandomnessOracle};
use crate::config::{RuntimeConfig, RuntimeConfigError};
use crate::flows::{FlowError, MintFlow, MintReport};
use fulfillment_coordinator::{
    BridgeSummary, BusBridge, CancelSignal, CoordinatorError, FulfillmentCoordinator,
    ListenerRegistry, StatsSnapshot,
};
use parking_lot::Mutex;
use shared_bus::InMemoryEventBus;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Runtime construction errors.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] RuntimeConfigError),

    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),
}

/// The runtime: bus, listener registry, bridge task and mint flow.
pub struct MintRuntime {
    config: RuntimeConfig,
    bus: Arc<InMemoryEventBus>,
    registry: Arc<ListenerRegistry>,
    chain: Arc<DevChain>,
    flow: MintFlow<DevChain>,
    bridge: Mutex<Option<JoinHandle<BridgeSummary>>>,
    shutdown_tx: watch::Sender<bool>,
}

impl MintRuntime {
    /// Validate `config` and build every component. Nothing runs until
    /// [`Self::start`].
    pub fn new(config: RuntimeConfig) -> Result<Self, RuntimeError> {
        config.validate()?;
        info!(network = %config.network, "Creating mint runtime");

        let bus = Arc::new(InMemoryEventBus::new());
        let registry = Arc::new(ListenerRegistry::with_resolved_ttl(
            config.coordinator.resolved_ttl(),
        ));
        let coordinator =
            FulfillmentCoordinator::new(Arc::clone(&registry), config.coordinator.clone())?;

        let chain = Arc::new(DevChain::new(Arc::clone(&bus), DevChainConfig::from(&config)));
        let mut flow = MintFlow::new(Arc::clone(&chain), coordinator, &config);

        if config.is_development_chain() {
            let oracle = DevRandomnessOracle::new(Arc::clone(&chain), config.random_token_uris.clone());
            flow = flow.with_oracle(Arc::new(oracle));
        } else {
            warn!(
                network = %config.network,
                "Not a development chain, randomness requests are left to the live oracle"
            );
        }

        let (shutdown_tx, _) = watch::channel(false);

        Ok(Self {
            config,
            bus,
            registry,
            chain,
            flow,
            bridge: Mutex::new(None),
            shutdown_tx,
        })
    }

    /// Start the bus bridge. Calling it twice is a no-op.
    pub fn start(&self) {
        let mut bridge = self.bridge.lock();
        if bridge.is_some() {
            return;
        }
        *bridge = Some(BusBridge::spawn(
            &self.bus,
            Arc::clone(&self.registry),
            self.shutdown_tx.subscribe(),
        ));
        info!("Mint runtime started");
    }

    /// Run the mint flow once.
    pub async fn run_flow(&self, cancel: CancelSignal) -> Result<MintReport, FlowError> {
        self.flow.run(cancel).await
    }

    /// Stop the bridge and wait for it to drain.
    pub async fn shutdown(&self) -> Option<BridgeSummary> {
        info!("Initiating graceful shutdown...");
        self.shutdown_tx.send_replace(true);

        let handle = self.bridge.lock().take()?;
        match handle.await {
            Ok(summary) => {
                info!(forwarded = summary.forwarded, stray = summary.stray, "Shutdown complete");
                Some(summary)
            }
            Err(err) => {
                error!(error = %err, "Bridge task failed");
                None
            }
        }
    }

    /// Coordinator counters across every flow run so far.
    pub fn flow_stats(&self) -> StatsSnapshot {
        self.flow.coordinator().stats().snapshot()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ListenerRegistry> {
        &self.registry
    }

    pub fn chain(&self) -> &Arc<DevChain> {
        &self.chain
    }

    pub fn bus(&self) -> &Arc<InMemoryEventBus> {
        &self.bus
    }
}
