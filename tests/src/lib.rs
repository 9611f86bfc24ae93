//! # VRF Mint Test Suite
//!
//! Cross-crate tests that need more than one crate wired together.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── flows.rs              # Dev chain → bus → bridge → coordinator
//!     └── coordinator_races.rs  # Event/timer/cancel races on a real clock
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p mint-tests
//! cargo test -p mint-tests integration::coordinator_races::
//! ```

pub mod integration;
