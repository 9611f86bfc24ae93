//! Fulfillment Coordinator Service
//!
//! Flow of one `submit_and_await`:
//! 1. Register a one-shot listener on the completion channel
//! 2. Run the caller's action to obtain the request id
//! 3. Race the matching event against the deadline and the cancel signal
//! 4. Seal the listener, unsubscribe, report the outcome

use crate::adapters::ListenerRegistry;
use crate::domain::{CancelSignal, CoordinatorConfig, OneShotListener, WaitOutcome};
use crate::error::{BoxError, CoordinatorError, CoordinatorResult};
use crate::metrics;
use crate::ports::outbound::CompletionChannel;
use shared_types::{CompletionEvent, RequestId};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Statistics for coordinated waits
#[derive(Debug, Default)]
pub struct CoordinatorStats {
    /// Total waits started
    pub total_submitted: AtomicU64,
    /// Waits ending in `Fulfilled`
    pub total_fulfilled: AtomicU64,
    /// Waits ending in `TimedOut`
    pub total_timed_out: AtomicU64,
    /// Waits ending in `Cancelled`
    pub total_cancelled: AtomicU64,
    /// Actions that failed before a wait began
    pub total_submission_failed: AtomicU64,
}

/// Point-in-time copy of [`CoordinatorStats`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub submitted: u64,
    pub fulfilled: u64,
    pub timed_out: u64,
    pub cancelled: u64,
    pub submission_failed: u64,
}

impl CoordinatorStats {
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            submitted: self.total_submitted.load(Ordering::Relaxed),
            fulfilled: self.total_fulfilled.load(Ordering::Relaxed),
            timed_out: self.total_timed_out.load(Ordering::Relaxed),
            cancelled: self.total_cancelled.load(Ordering::Relaxed),
            submission_failed: self.total_submission_failed.load(Ordering::Relaxed),
        }
    }

    fn record(&self, outcome: &WaitOutcome) {
        let counter = match outcome {
            WaitOutcome::Fulfilled(_) => &self.total_fulfilled,
            WaitOutcome::TimedOut => &self.total_timed_out,
            WaitOutcome::Cancelled => &self.total_cancelled,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Coordinates a submission with its asynchronous completion event.
///
/// Coordinators are cheap to share; concurrent waits on one coordinator (or
/// on several sharing a channel) never interfere, since each owns its own
/// listener and request id.
pub struct FulfillmentCoordinator<C: CompletionChannel + ?Sized = ListenerRegistry> {
    channel: Arc<C>,
    config: CoordinatorConfig,
    stats: Arc<CoordinatorStats>,
}

impl<C: CompletionChannel + ?Sized> FulfillmentCoordinator<C> {
    /// Create a coordinator listening on `channel`.
    pub fn new(channel: Arc<C>, config: CoordinatorConfig) -> CoordinatorResult<Self> {
        config.validate()?;
        Ok(Self {
            channel,
            config,
            stats: Arc::new(CoordinatorStats::default()),
        })
    }

    pub fn channel(&self) -> &Arc<C> {
        &self.channel
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn stats(&self) -> &CoordinatorStats {
        &self.stats
    }

    /// Submit via `action` and wait for its completion event.
    ///
    /// `timeout` of `None` uses the configured default. The wait cannot be
    /// cancelled except by dropping the returned future.
    pub async fn submit_and_await<A, Fut, E>(
        &self,
        action: A,
        timeout: Option<Duration>,
    ) -> CoordinatorResult<WaitOutcome>
    where
        A: FnOnce() -> Fut,
        Fut: Future<Output = Result<RequestId, E>>,
        E: Into<BoxError>,
    {
        self.submit_and_await_cancellable(action, timeout, CancelSignal::never())
            .await
    }

    /// Like [`Self::submit_and_await`], also ending with `Cancelled` when
    /// `cancel` fires.
    ///
    /// The deadline is armed before the action runs, so a submission that
    /// never returns still ends in `TimedOut` (or `Cancelled`). A submission
    /// that completes is preferred over an interruption observed at the same
    /// poll.
    pub async fn submit_and_await_cancellable<A, Fut, E>(
        &self,
        action: A,
        timeout: Option<Duration>,
        mut cancel: CancelSignal,
    ) -> CoordinatorResult<WaitOutcome>
    where
        A: FnOnce() -> Fut,
        Fut: Future<Output = Result<RequestId, E>>,
        E: Into<BoxError>,
    {
        let timeout = timeout.unwrap_or_else(|| self.config.default_timeout());
        let started = Instant::now();
        let deadline = started + timeout;
        self.stats.total_submitted.fetch_add(1, Ordering::Relaxed);

        // Listener goes in before the action so an early event is held, not lost
        let (listener, mut payload_rx) = OneShotListener::new(self.config.early_event_capacity);
        let handler_listener = Arc::clone(&listener);
        let subscription = self.channel.subscribe(Arc::new(move |event: &CompletionEvent| {
            handler_listener.offer(event)
        }));

        let submitted = tokio::select! {
            biased;
            result = action() => Ok(result),
            () = tokio::time::sleep_until(deadline) => Err(WaitOutcome::TimedOut),
            () = cancel.cancelled() => Err(WaitOutcome::Cancelled),
        };

        let request_id = match submitted {
            Ok(Ok(request_id)) => request_id,
            Ok(Err(err)) => {
                self.channel.unsubscribe(subscription);
                let source: BoxError = err.into();
                self.stats
                    .total_submission_failed
                    .fetch_add(1, Ordering::Relaxed);
                metrics::record_outcome("submission_failed");
                warn!(error = %source, "Submission failed, listener removed");
                return Err(CoordinatorError::SubmissionFailed(source));
            }
            Err(interrupted) => {
                listener.seal();
                self.channel.unsubscribe(subscription);
                self.record(&interrupted, started.elapsed());
                warn!(
                    outcome = interrupted.label(),
                    timeout_ms = millis(timeout),
                    "Submission still pending, wait abandoned"
                );
                return Ok(interrupted);
            }
        };

        listener.bind(request_id.clone());
        debug!(
            request_id = %request_id,
            timeout_ms = millis(deadline.saturating_duration_since(Instant::now())),
            "Submitted, awaiting fulfilment"
        );

        let raced = tokio::select! {
            Ok(payload) = &mut payload_rx => WaitOutcome::Fulfilled(payload),
            () = tokio::time::sleep_until(deadline) => WaitOutcome::TimedOut,
            () = cancel.cancelled() => WaitOutcome::Cancelled,
        };

        let outcome = match raced {
            fulfilled @ WaitOutcome::Fulfilled(_) => fulfilled,
            interrupted => {
                if listener.seal() {
                    interrupted
                } else {
                    // The event took the latch between the wake-up and the seal
                    payload_rx
                        .try_recv()
                        .map(WaitOutcome::Fulfilled)
                        .unwrap_or(interrupted)
                }
            }
        };

        self.channel.unsubscribe(subscription);
        self.channel.mark_resolved(&request_id);

        let elapsed = started.elapsed();
        self.record(&outcome, elapsed);

        match &outcome {
            WaitOutcome::Fulfilled(payload) => info!(
                request_id = %request_id,
                token_uri = %payload.token_uri,
                elapsed_ms = millis(elapsed),
                "Request fulfilled"
            ),
            WaitOutcome::TimedOut | WaitOutcome::Cancelled => warn!(
                request_id = %request_id,
                outcome = outcome.label(),
                elapsed_ms = millis(elapsed),
                "Request ended without fulfilment"
            ),
        }

        Ok(outcome)
    }

    fn record(&self, outcome: &WaitOutcome, elapsed: Duration) {
        self.stats.record(outcome);
        metrics::record_outcome(outcome.label());
        metrics::observe_wait_seconds(elapsed.as_secs_f64());
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl<C: CompletionChannel + ?Sized> Clone for FulfillmentCoordinator<C> {
    fn clone(&self) -> Self {
        Self {
            channel: Arc::clone(&self.channel),
            config: self.config.clone(),
            stats: Arc::clone(&self.stats),
        }
    }
}
