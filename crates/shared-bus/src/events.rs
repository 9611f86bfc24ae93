//! # Mint Events
//!
//! Defines all event types that flow through the shared bus. They mirror the
//! events the NFT contracts emit; the bus never interprets their payloads.

use serde::{Deserialize, Serialize};
use shared_types::{CompletionEvent, RequestId};

/// All events that can be published to the event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MintEvent {
    // =========================================================================
    // RANDOM NFT
    // =========================================================================
    /// A random NFT was requested; the oracle now owes a fulfilment.
    NftRequested {
        /// Oracle request id returned by the request transaction.
        request_id: RequestId,
        /// Account that paid for the mint.
        requester: String,
    },

    /// The oracle fulfilled a request and the token was minted.
    /// This is the completion event coordinators wait on.
    NftMinted(CompletionEvent),

    // =========================================================================
    // BASIC NFT
    // =========================================================================
    /// A basic NFT was minted synchronously (no oracle involved).
    BasicNftMinted {
        /// The minted token id.
        token_id: u64,
    },
}

impl MintEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::NftRequested { .. } => EventTopic::Request,
            Self::NftMinted(_) => EventTopic::Fulfillment,
            Self::BasicNftMinted { .. } => EventTopic::Basic,
        }
    }

    /// Request id carried by the event, if any.
    #[must_use]
    pub fn request_id(&self) -> Option<&RequestId> {
        match self {
            Self::NftRequested { request_id, .. } => Some(request_id),
            Self::NftMinted(completion) => Some(&completion.request_id),
            Self::BasicNftMinted { .. } => None,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Randomness requests.
    Request,
    /// Oracle fulfilments (completion events).
    Fulfillment,
    /// Basic NFT mints.
    Basic,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Request ids to include. Empty means all ids, including events that
    /// carry none.
    pub request_ids: Vec<RequestId>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            request_ids: Vec::new(),
        }
    }

    /// Narrow the filter to events for the given request ids.
    #[must_use]
    pub fn for_requests(mut self, request_ids: Vec<RequestId>) -> Self {
        self.request_ids = request_ids;
        self
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &MintEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let request_match = self.request_ids.is_empty()
            || event
                .request_id()
                .is_some_and(|id| self.request_ids.contains(id));

        topic_match && request_match
    }
}
