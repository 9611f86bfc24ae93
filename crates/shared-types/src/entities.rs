//! # Core Entities
//!
//! - `RequestId`: correlation key returned by a randomness request
//! - `FulfillmentPayload`: what the oracle callback produced
//! - `CompletionEvent`: the notification pairing the two

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier linking a submitted request to its completion event.
///
/// On-chain request ids are 256-bit integers, so the id is kept as the
/// decimal string the node returned rather than narrowed to a machine integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Create a request id from its string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for RequestId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for RequestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Result carried by a completion event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentPayload {
    /// Metadata URI assigned to the minted token (e.g. `ipfs://...`).
    pub token_uri: String,
    /// Token id, when the emitter reports one.
    pub token_id: Option<u64>,
}

impl FulfillmentPayload {
    /// Payload with only a token URI.
    pub fn with_uri(token_uri: impl Into<String>) -> Self {
        Self {
            token_uri: token_uri.into(),
            token_id: None,
        }
    }

    /// Attach the minted token id.
    #[must_use]
    pub fn token_id(mut self, token_id: u64) -> Self {
        self.token_id = Some(token_id);
        self
    }
}

/// Asynchronous notification that a previously submitted request finished.
///
/// Expected at most once per request id, but consumers must tolerate zero or
/// several deliveries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEvent {
    /// Request this event completes.
    pub request_id: RequestId,
    /// Result payload.
    pub payload: FulfillmentPayload,
}

impl CompletionEvent {
    pub fn new(request_id: impl Into<RequestId>, payload: FulfillmentPayload) -> Self {
        Self {
            request_id: request_id.into(),
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_display_is_verbatim() {
        let id = RequestId::from("115792089237316195423570985008687907853");
        assert_eq!(id.to_string(), "115792089237316195423570985008687907853");
        assert_eq!(RequestId::from(42u64), RequestId::from("42"));
    }

    #[test]
    fn test_request_id_serializes_as_plain_string() {
        let id = RequestId::new("7");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"7\"");
    }

    #[test]
    fn test_completion_event_json_shape() {
        let event = CompletionEvent::new("42", FulfillmentPayload::with_uri("ipfs://abc").token_id(0));
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["request_id"], "42");
        assert_eq!(json["payload"]["token_uri"], "ipfs://abc");
        assert_eq!(json["payload"]["token_id"], 0);
    }
}
