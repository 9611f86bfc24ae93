//! Event bus bridge.
//!
//! Forwards `NftMinted` completion events from the shared bus into a
//! [`ListenerRegistry`]. The bus subscription is taken before the task is
//! spawned, so nothing published after `spawn` returns is missed.

use crate::adapters::registry::{Dispatch, ListenerRegistry};
use shared_bus::{EventFilter, EventTopic, InMemoryEventBus, MintEvent, Subscription};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Counters reported when the bridge stops
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BridgeSummary {
    /// Completion events forwarded to the registry
    pub forwarded: u64,
    /// Of those, how many were stray
    pub stray: u64,
}

/// Bus-to-registry forwarder
pub struct BusBridge {
    subscription: Subscription,
    registry: Arc<ListenerRegistry>,
}

impl BusBridge {
    /// Subscribe to fulfilment events on `bus`.
    pub fn new(bus: &InMemoryEventBus, registry: Arc<ListenerRegistry>) -> Self {
        let subscription = bus.subscribe(EventFilter::topics(vec![EventTopic::Fulfillment]));
        Self {
            subscription,
            registry,
        }
    }

    /// Subscribe and run on a background task until `shutdown` flips to
    /// `true` or the bus closes. Events already queued when `shutdown` flips
    /// are still forwarded.
    pub fn spawn(
        bus: &InMemoryEventBus,
        registry: Arc<ListenerRegistry>,
        shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<BridgeSummary> {
        let bridge = Self::new(bus, registry);
        tokio::spawn(bridge.run(shutdown))
    }

    /// Run the forwarding loop.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> BridgeSummary {
        info!("Fulfilment bridge started");
        let mut summary = BridgeSummary::default();

        loop {
            // Queued events drain before a shutdown is honoured
            tokio::select! {
                biased;

                event = self.subscription.recv() => {
                    let Some(event) = event else {
                        info!("Event bus closed, fulfilment bridge stopping");
                        break;
                    };
                    let MintEvent::NftMinted(completion) = event else {
                        continue;
                    };

                    summary.forwarded += 1;
                    if let Dispatch::Stray(kind) = self.registry.dispatch(&completion) {
                        summary.stray += 1;
                        debug!(request_id = %completion.request_id, kind = kind.label(), "Bridge saw stray event");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Shutdown signal received, fulfilment bridge stopping");
                        break;
                    }
                }
            }
        }

        info!(forwarded = summary.forwarded, stray = summary.stray, "Fulfilment bridge stopped");
        summary
    }
}
