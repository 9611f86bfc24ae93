//! Domain layer: outcomes, the one-shot listener state machine, cancellation
//! and configuration.

pub mod cancel;
pub mod config;
pub mod listener;
pub mod outcome;

pub use cancel::{CancelHandle, CancelSignal};
pub use config::CoordinatorConfig;
pub use listener::OneShotListener;
pub use outcome::WaitOutcome;
