//! Terminal outcomes of a wait.

use serde::{Deserialize, Serialize};
use shared_types::FulfillmentPayload;

/// How a wait ended. Terminal: once produced, nothing else happens for the
/// request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaitOutcome {
    /// The matching completion event arrived first.
    Fulfilled(FulfillmentPayload),
    /// The deadline passed without a matching event.
    TimedOut,
    /// The caller cancelled the wait.
    Cancelled,
}

impl WaitOutcome {
    #[must_use]
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Fulfilled(_))
    }

    /// Payload of a fulfilled wait.
    #[must_use]
    pub fn payload(&self) -> Option<&FulfillmentPayload> {
        match self {
            Self::Fulfilled(payload) => Some(payload),
            Self::TimedOut | Self::Cancelled => None,
        }
    }

    #[must_use]
    pub fn into_payload(self) -> Option<FulfillmentPayload> {
        match self {
            Self::Fulfilled(payload) => Some(payload),
            Self::TimedOut | Self::Cancelled => None,
        }
    }

    /// Stable label for logs and metrics.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fulfilled(_) => "fulfilled",
            Self::TimedOut => "timed_out",
            Self::Cancelled => "cancelled",
        }
    }
}
