//! # Coordinator Race Tests
//!
//! Events, deadlines and cancellation hitting the same request at nearly the
//! same instant, on a multi-threaded runtime with a real clock. Whatever the
//! interleaving, exactly one outcome wins and the dispatcher's view agrees
//! with the caller's:
//!
//! - caller saw `Fulfilled` ⇔ the registry delivered the event, either
//!   straight to the bound listener or to its held buffer
//! - no listener survives a wait

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use fulfillment_coordinator::{
        BoxError, CancelHandle, CompletionChannel, CoordinatorConfig, Dispatch,
        FulfillmentCoordinator, ListenerRegistry, WaitOutcome,
    };
    use shared_types::{CompletionEvent, FulfillmentPayload, RequestId};

    const ROUNDS: u64 = 200;

    fn setup() -> (Arc<ListenerRegistry>, FulfillmentCoordinator) {
        let registry = Arc::new(ListenerRegistry::new());
        let coordinator =
            FulfillmentCoordinator::new(Arc::clone(&registry), CoordinatorConfig::default())
                .unwrap();
        (registry, coordinator)
    }

    /// A held event is matched as soon as the listener binds, so it always wins.
    fn reached_listener(dispatch: Dispatch) -> bool {
        matches!(dispatch, Dispatch::Delivered | Dispatch::Held)
    }

    fn event(id: u64) -> CompletionEvent {
        CompletionEvent::new(id, FulfillmentPayload::with_uri(format!("ipfs://{id}")))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_event_racing_deadline_resolves_once() {
        let (registry, coordinator) = setup();

        for round in 0..ROUNDS {
            let emitter = Arc::clone(&registry);
            let dispatched = tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(1)).await;
                emitter.dispatch(&event(round))
            });

            let outcome = coordinator
                .submit_and_await(
                    || async move { Ok::<_, BoxError>(RequestId::from(round)) },
                    Some(Duration::from_millis(1)),
                )
                .await
                .unwrap();
            let dispatch = dispatched.await.unwrap();

            match outcome {
                WaitOutcome::Fulfilled(payload) => {
                    assert!(reached_listener(dispatch), "round {round}: {dispatch:?}");
                    assert_eq!(payload.token_uri, format!("ipfs://{round}"));
                }
                WaitOutcome::TimedOut => {
                    assert!(matches!(dispatch, Dispatch::Stray(_)), "round {round}: {dispatch:?}");
                }
                WaitOutcome::Cancelled => panic!("nothing cancels in round {round}"),
            }
            assert_eq!(registry.listener_count(), 0);
        }

        let stats = coordinator.stats().snapshot();
        assert_eq!(stats.submitted, ROUNDS);
        assert_eq!(stats.fulfilled + stats.timed_out, ROUNDS);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_event_racing_cancel_resolves_once() {
        let (registry, coordinator) = setup();

        for round in 0..ROUNDS {
            let cancel = CancelHandle::new();
            let signal = cancel.signal();

            let emitter = Arc::clone(&registry);
            let dispatched = tokio::spawn(async move {
                tokio::task::yield_now().await;
                emitter.dispatch(&event(round))
            });
            let canceller = tokio::spawn(async move {
                tokio::task::yield_now().await;
                cancel.cancel();
            });

            let outcome = coordinator
                .submit_and_await_cancellable(
                    || async move { Ok::<_, BoxError>(RequestId::from(round)) },
                    Some(Duration::from_secs(5)),
                    signal,
                )
                .await
                .unwrap();
            canceller.await.unwrap();
            let dispatch = dispatched.await.unwrap();

            match outcome {
                WaitOutcome::Fulfilled(_) => {
                    assert!(reached_listener(dispatch), "round {round}: {dispatch:?}");
                }
                WaitOutcome::Cancelled => {
                    assert!(matches!(dispatch, Dispatch::Stray(_)), "round {round}: {dispatch:?}");
                }
                WaitOutcome::TimedOut => panic!("deadline cannot win in round {round}"),
            }
            assert_eq!(registry.listener_count(), 0);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_waits_share_one_registry() {
        let (registry, coordinator) = setup();

        let waits: Vec<_> = (0..64u64)
            .map(|id| {
                let coordinator = coordinator.clone();
                let emitter = Arc::clone(&registry);
                tokio::spawn(async move {
                    coordinator
                        .submit_and_await(
                            move || async move {
                                tokio::spawn(async move {
                                    tokio::time::sleep(Duration::from_millis(id % 5)).await;
                                    // Noise first, then the real answer
                                    emitter.dispatch(&event(id + 10_000));
                                    emitter.dispatch(&event(id));
                                });
                                Ok::<_, BoxError>(RequestId::from(id))
                            },
                            Some(Duration::from_secs(5)),
                        )
                        .await
                })
            })
            .collect();

        for (id, wait) in waits.into_iter().enumerate() {
            let outcome = wait.await.unwrap().unwrap();
            assert_eq!(
                outcome.into_payload().map(|p| p.token_uri),
                Some(format!("ipfs://{id}"))
            );
        }
        assert_eq!(registry.listener_count(), 0);
        assert_eq!(coordinator.stats().snapshot().fulfilled, 64);
    }
}
