//! Integration tests.

pub mod coordinator_races;
pub mod flows;
