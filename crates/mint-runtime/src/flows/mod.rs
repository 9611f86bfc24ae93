//! Flows the runtime can execute.

pub mod mint;

pub use mint::{FlowError, MintFlow, MintReport};
