//! Adapters: the in-memory completion channel and its bus feed.

pub mod bus_bridge;
pub mod registry;

pub use bus_bridge::{BridgeSummary, BusBridge};
pub use registry::{Dispatch, ListenerRegistry, RegistryStats, StrayKind};
