//! # Chain Adapters
//!
//! Implementations of the chain ports. Only the in-process development
//! chain exists; real RPC clients plug in behind the same traits.

pub mod dev_chain;

pub use dev_chain::{DevChain, DevChainConfig, DevRandomnessOracle};
