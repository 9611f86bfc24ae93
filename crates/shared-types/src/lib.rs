//! # Shared Types Crate
//!
//! Entities shared by every crate in the mint workspace.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: request ids and completion events are defined
//!   once here and flow unchanged through the bus and the coordinator.
//! - **Opaque Correlation**: a [`RequestId`] carries no meaning beyond
//!   equality as far as the coordinator is concerned.

pub mod entities;

pub use entities::*;
