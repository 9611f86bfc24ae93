//! # Integration Test Flows
//!
//! Completion events travel the same path they do in the runtime:
//!
//! ```text
//! DevChain / DevRandomnessOracle ──NftMinted──→ InMemoryEventBus
//!                                                     │
//!                                                 BusBridge
//!                                                     ↓
//!                           ListenerRegistry ←── FulfillmentCoordinator
//! ```
//!
//! 1. **Runtime**: the full mint flow on a development chain
//! 2. **Concurrency**: many requests in flight, fulfilled out of order
//! 3. **Strays**: late and unknown fulfilments are counted, never delivered
//! 4. **Channel seam**: a custom `CompletionChannel` sees one unsubscribe per wait

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use futures::future::join_all;
    use tokio::sync::watch;

    use fulfillment_coordinator::{
        BoxError, BusBridge, CancelSignal, CompletionChannel, CompletionHandler, CoordinatorConfig,
        CoordinatorError, FulfillmentCoordinator, ListenerRegistry, Subscription, WaitOutcome,
    };
    use mint_runtime::adapters::{DevChain, DevChainConfig, DevRandomnessOracle};
    use mint_runtime::{MintClient, MintRuntime, RandomnessOracle, RuntimeConfig};
    use shared_bus::{EventPublisher, InMemoryEventBus, MintEvent};
    use shared_types::{CompletionEvent, FulfillmentPayload, RequestId};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    struct Wired {
        bus: Arc<InMemoryEventBus>,
        registry: Arc<ListenerRegistry>,
        chain: Arc<DevChain>,
        oracle: Arc<DevRandomnessOracle>,
        coordinator: FulfillmentCoordinator,
        shutdown: watch::Sender<bool>,
        bridge: tokio::task::JoinHandle<fulfillment_coordinator::BridgeSummary>,
    }

    fn wire(token_uris: &[&str]) -> Wired {
        let config = RuntimeConfig::default();
        let bus = Arc::new(InMemoryEventBus::new());
        let registry = Arc::new(ListenerRegistry::new());
        let (shutdown, shutdown_rx) = watch::channel(false);
        let bridge = BusBridge::spawn(&bus, Arc::clone(&registry), shutdown_rx);

        let chain = Arc::new(DevChain::new(Arc::clone(&bus), DevChainConfig::from(&config)));
        let oracle = Arc::new(DevRandomnessOracle::new(
            Arc::clone(&chain),
            token_uris.iter().map(|s| (*s).to_string()).collect(),
        ));
        let coordinator =
            FulfillmentCoordinator::new(Arc::clone(&registry), CoordinatorConfig::default())
                .unwrap();

        Wired {
            bus,
            registry,
            chain,
            oracle,
            coordinator,
            shutdown,
            bridge,
        }
    }

    // =============================================================================
    // RUNTIME
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_runtime_mint_flow_on_dev_chain() {
        let runtime = MintRuntime::new(RuntimeConfig::default()).unwrap();
        runtime.start();

        let report = runtime.run_flow(CancelSignal::never()).await.unwrap();

        assert_eq!(report.basic_token_id, 0);
        assert_eq!(report.request_id, Some(RequestId::from(1u64)));
        let payload = report.outcome.payload().expect("fulfilled");
        assert!(payload.token_uri.starts_with("ipfs://"));
        assert_eq!(payload.token_id, Some(0));
        assert_eq!(report.random_token_uri.as_deref(), Some(payload.token_uri.as_str()));

        assert_eq!(runtime.bus().events_published(), 3);
        assert_eq!(runtime.shutdown().await.map(|s| s.stray), Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_flow_gets_next_request() {
        let runtime = MintRuntime::new(RuntimeConfig::default()).unwrap();
        runtime.start();

        let first = runtime.run_flow(CancelSignal::never()).await.unwrap();
        let second = runtime.run_flow(CancelSignal::never()).await.unwrap();

        assert_eq!(second.basic_token_id, 1);
        assert_eq!(second.request_id, Some(RequestId::from(2u64)));
        assert_ne!(first.random_token_uri, second.random_token_uri);
        assert_eq!(runtime.flow_stats().fulfilled, 2);
    }

    // =============================================================================
    // CONCURRENCY
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_requests_fulfilled_out_of_order() {
        let w = wire(&["ipfs://pug", "ipfs://shiba", "ipfs://st-bernard"]);
        let (requested_tx, mut requested_rx) = tokio::sync::mpsc::unbounded_channel();

        let waits = (0..12).map(|_| {
            let chain = Arc::clone(&w.chain);
            let requested_tx = requested_tx.clone();
            w.coordinator.submit_and_await(
                move || async move {
                    let id = chain.request_nft(0).await?;
                    let _ = requested_tx.send(id.clone());
                    Ok::<_, BoxError>(id)
                },
                Some(Duration::from_secs(60)),
            )
        })
        .collect::<Vec<_>>();
        drop(requested_tx);

        // Answer in reverse request order once everything is in flight
        let oracle = Arc::clone(&w.oracle);
        let fulfiller = tokio::spawn(async move {
            let mut ids = Vec::new();
            while let Some(id) = requested_rx.recv().await {
                ids.push(id);
            }
            ids.sort_by_key(|id: &RequestId| id.as_str().parse::<u64>().unwrap());
            tokio::time::sleep(Duration::from_millis(10)).await;
            for id in ids.iter().rev() {
                oracle.fulfill(id).await.unwrap();
            }
            ids.len()
        });

        let outcomes = join_all(waits).await;
        assert_eq!(fulfiller.await.unwrap(), 12);

        let mut token_ids: Vec<u64> = outcomes
            .into_iter()
            .map(|o| o.unwrap().into_payload().unwrap().token_id.unwrap())
            .collect();
        token_ids.sort_unstable();
        assert_eq!(token_ids, (0..12).collect::<Vec<_>>());
        assert_eq!(w.registry.listener_count(), 0);
        assert_eq!(w.chain.pending_requests(), 0);
    }

    // =============================================================================
    // STRAYS
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_fulfilment_after_timeout_is_counted_duplicate() {
        let w = wire(&["ipfs://late"]);
        let chain = Arc::clone(&w.chain);

        let outcome = w
            .coordinator
            .submit_and_await(
                move || async move { chain.request_nft(0).await },
                Some(Duration::from_millis(50)),
            )
            .await
            .unwrap();
        assert_eq!(outcome, WaitOutcome::TimedOut);

        // The oracle answers long after the caller gave up
        w.oracle.fulfill(&RequestId::from(1u64)).await.unwrap();

        w.shutdown.send_replace(true);
        let summary = w.bridge.await.unwrap();
        assert_eq!(summary.forwarded, 1);
        assert_eq!(summary.stray, 1);
        assert_eq!(w.registry.stats().total_duplicates.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_unknown_fulfilment_is_counted_unknown() {
        let w = wire(&["ipfs://x"]);

        w.bus
            .publish(MintEvent::NftMinted(CompletionEvent::new(
                "999",
                FulfillmentPayload::with_uri("ipfs://nobody"),
            )))
            .await;

        w.shutdown.send_replace(true);
        let summary = w.bridge.await.unwrap();
        assert_eq!(summary, fulfillment_coordinator::BridgeSummary { forwarded: 1, stray: 1 });
        assert_eq!(w.registry.stats().total_unknown.load(Ordering::Relaxed), 1);
    }

    // =============================================================================
    // CHANNEL SEAM
    // =============================================================================

    /// Wraps the registry and counts registrations.
    struct CountingChannel {
        inner: ListenerRegistry,
        subscribed: AtomicUsize,
        unsubscribed: Arc<AtomicUsize>,
    }

    impl CompletionChannel for CountingChannel {
        fn subscribe(&self, handler: CompletionHandler) -> Subscription {
            self.subscribed.fetch_add(1, Ordering::SeqCst);
            let inner = self.inner.subscribe(handler);
            let unsubscribed = Arc::clone(&self.unsubscribed);
            Subscription::new(inner.id(), move |_| {
                unsubscribed.fetch_add(1, Ordering::SeqCst);
                drop(inner);
            })
        }

        fn unsubscribe(&self, subscription: Subscription) {
            drop(subscription);
        }

        fn listener_count(&self) -> usize {
            self.inner.listener_count()
        }

        fn mark_resolved(&self, request_id: &RequestId) {
            self.inner.mark_resolved(request_id);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dyn_channel_unsubscribes_once_per_wait() {
        let channel = Arc::new(CountingChannel {
            inner: ListenerRegistry::new(),
            subscribed: AtomicUsize::new(0),
            unsubscribed: Arc::new(AtomicUsize::new(0)),
        });
        let dyn_channel: Arc<dyn CompletionChannel> = channel.clone();
        let coordinator =
            FulfillmentCoordinator::new(dyn_channel, CoordinatorConfig::default()).unwrap();

        let emitter = Arc::clone(&channel);
        let fulfilled = coordinator
            .submit_and_await(
                move || async move {
                    tokio::spawn(async move {
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        emitter.inner.dispatch(&CompletionEvent::new(
                            "1",
                            FulfillmentPayload::with_uri("ipfs://one"),
                        ));
                    });
                    Ok::<_, BoxError>(RequestId::from("1"))
                },
                Some(Duration::from_millis(100)),
            )
            .await
            .unwrap();
        assert!(fulfilled.is_fulfilled());

        let timed_out = coordinator
            .submit_and_await(
                || async { Ok::<_, BoxError>(RequestId::from("2")) },
                Some(Duration::from_millis(100)),
            )
            .await
            .unwrap();
        assert_eq!(timed_out, WaitOutcome::TimedOut);

        let failed = coordinator
            .submit_and_await(
                || async { Err::<RequestId, _>("reverted") },
                Some(Duration::from_millis(100)),
            )
            .await;
        assert!(matches!(failed, Err(CoordinatorError::SubmissionFailed(_))));

        assert_eq!(channel.subscribed.load(Ordering::SeqCst), 3);
        assert_eq!(channel.unsubscribed.load(Ordering::SeqCst), 3);
        assert_eq!(channel.listener_count(), 0);
    }
}
