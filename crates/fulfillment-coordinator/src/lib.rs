//! # fulfillment-coordinator
//!
//! Bridges a synchronous "submit" call with the asynchronous notification that
//! eventually completes it.
//!
//! ## Overview
//!
//! A randomness-backed mint is a two-step affair: the request transaction
//! returns a request id, and some time later the oracle calls back and the
//! contract emits a completion event for that id. This crate turns the pair
//! into one awaited call that ends in exactly one of:
//!
//! - `Fulfilled(payload)` - the matching completion event arrived
//! - `TimedOut` - nothing matched within the deadline (a normal outcome)
//! - `Cancelled` - the caller's cancel signal fired
//! - `Err(SubmissionFailed)` - the triggering action itself failed
//!
//! ## Architecture
//!
//! ```text
//!  caller ──submit_and_await──→ FulfillmentCoordinator
//!                                   │ 1. subscribe(listener)      ┌──────────────────┐
//!                                   ├────────────────────────────→│ ListenerRegistry │←── BusBridge ←── InMemoryEventBus
//!                                   │ 2. action() → RequestId     └──────────────────┘        (NftMinted)
//!                                   │ 3. select! { event | timer | cancel }
//!                                   │ 4. unsubscribe
//!                                   ↓
//!                              WaitOutcome
//! ```
//!
//! The listener is registered before the action runs, so an event that races
//! ahead of the action's return is held and matched once the id is known.
//!
//! ## Example
//!
//! ```rust,ignore
//! use fulfillment_coordinator::{FulfillmentCoordinator, CoordinatorConfig, ListenerRegistry};
//!
//! let registry = Arc::new(ListenerRegistry::new());
//! let coordinator = FulfillmentCoordinator::new(registry.clone(), CoordinatorConfig::default())?;
//!
//! let outcome = coordinator
//!     .submit_and_await(|| client.request_nft(fee), Some(Duration::from_secs(300)))
//!     .await?;
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

pub use adapters::{BridgeSummary, BusBridge, Dispatch, ListenerRegistry, RegistryStats, StrayKind};
pub use domain::{CancelHandle, CancelSignal, CoordinatorConfig, OneShotListener, WaitOutcome};
pub use error::{BoxError, ConfigError, CoordinatorError, CoordinatorResult};
pub use ports::outbound::{CompletionChannel, CompletionHandler, Disposition, Subscription, SubscriptionId};
pub use service::{CoordinatorStats, FulfillmentCoordinator, StatsSnapshot};
