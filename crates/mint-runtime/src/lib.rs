//! # Mint Runtime Library
//!
//! Exposes the runtime's modules for testing. The entry point is the
//! `main.rs` binary.
//!
//! ## Layout
//!
//! - `config` - `MINT_*` environment configuration
//! - `ports` - chain traits the flow depends on (`MintClient`, `RandomnessOracle`)
//! - `adapters` - in-process development chain and mock oracle
//! - `flows` - the mint flow driven by the fulfillment coordinator
//! - `runtime` - wiring of bus, registry, bridge and flow

pub mod adapters;
pub mod config;
pub mod flows;
pub mod ports;
pub mod runtime;

pub use config::{RuntimeConfig, RuntimeConfigError};
pub use flows::{FlowError, MintFlow, MintReport};
pub use ports::{ChainError, Collection, MintClient, RandomnessOracle};
pub use runtime::{MintRuntime, RuntimeError};
