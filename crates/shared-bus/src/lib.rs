//! # Shared Bus - Event Bus for Mint Events
//!
//! Carries the events a randomness-backed NFT contract emits
//! (`NftRequested`, `NftMinted`, ...) from whoever observes the chain to
//! whoever waits on them.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────────┐
//! │  Dev chain / │    publish()       │   Coordinator    │
//! │    oracle    │ ──────┐            │   (bus bridge)   │
//! └──────────────┘       │            └──────────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! The bus only broadcasts. Correlating an event with the request that is
//! waiting for it happens downstream, keyed by [`shared_types::RequestId`].

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod resolved_cache;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic, MintEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use resolved_cache::ResolvedRequestCache;
pub use subscriber::Subscription;

/// Maximum events to buffer per subscriber before the slowest one lags.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;
