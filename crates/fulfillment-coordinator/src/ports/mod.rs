//! Ports (hexagonal architecture)
//!
//! - `outbound`: the completion-event channel the coordinator listens on

pub mod outbound;
