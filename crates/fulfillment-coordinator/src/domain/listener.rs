//! One-shot completion listener.
//!
//! The listener exists before its request id does: it is registered, then the
//! action runs and returns the id. Its state machine:
//!
//! ```text
//! [UNBOUND] ──bind(id)──→ [BOUND id] ──matching event──→ [TERMINAL]
//!     │  holds events         │                               ↑
//!     │                       └────────── seal() ─────────────┤
//!     └── bind(id) finds a held match ────────────────────────┘
//! ```
//!
//! Every transition happens under one mutex, so a matching event and a
//! `seal()` from the timer or cancel path cannot both win.

use crate::ports::outbound::Disposition;
use parking_lot::Mutex;
use shared_types::{CompletionEvent, FulfillmentPayload, RequestId};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, warn};

enum ListenerState {
    Unbound {
        held: VecDeque<CompletionEvent>,
        sender: oneshot::Sender<FulfillmentPayload>,
    },
    Bound {
        request_id: RequestId,
        sender: oneshot::Sender<FulfillmentPayload>,
    },
    Terminal,
}

/// Listener for a single request's completion event.
pub struct OneShotListener {
    state: Mutex<ListenerState>,
    held_capacity: usize,
}

impl OneShotListener {
    /// Create an unbound listener and the receiver its payload is sent on.
    pub fn new(held_capacity: usize) -> (Arc<Self>, oneshot::Receiver<FulfillmentPayload>) {
        let (sender, receiver) = oneshot::channel();
        let listener = Self {
            state: Mutex::new(ListenerState::Unbound {
                held: VecDeque::new(),
                sender,
            }),
            held_capacity: held_capacity.max(1),
        };
        (Arc::new(listener), receiver)
    }

    /// Offer a completion event to the listener.
    pub fn offer(&self, event: &CompletionEvent) -> Disposition {
        let mut state = self.state.lock();
        let current = std::mem::replace(&mut *state, ListenerState::Terminal);

        let (next, disposition) = match current {
            ListenerState::Unbound { mut held, sender } => {
                if held.len() >= self.held_capacity {
                    if let Some(evicted) = held.pop_front() {
                        warn!(
                            request_id = %evicted.request_id,
                            capacity = self.held_capacity,
                            "Held event buffer full, evicting oldest"
                        );
                    }
                }
                held.push_back(event.clone());
                (ListenerState::Unbound { held, sender }, Disposition::Held)
            }
            ListenerState::Bound { request_id, sender } if request_id == event.request_id => {
                let disposition = if sender.send(event.payload.clone()).is_ok() {
                    Disposition::Claimed
                } else {
                    debug!(request_id = %request_id, "Waiter gone before fulfilment");
                    Disposition::Ignored
                };
                (ListenerState::Terminal, disposition)
            }
            bound @ ListenerState::Bound { .. } => (bound, Disposition::Ignored),
            ListenerState::Terminal => (ListenerState::Terminal, Disposition::Ignored),
        };

        *state = next;
        disposition
    }

    /// Bind the listener to the id the action returned.
    ///
    /// Returns `true` if a held event already matched, in which case the
    /// payload has been sent and the listener is terminal. Held events for
    /// other ids are discarded. No-op unless unbound.
    pub fn bind(&self, request_id: RequestId) -> bool {
        let mut state = self.state.lock();
        let current = std::mem::replace(&mut *state, ListenerState::Terminal);

        match current {
            ListenerState::Unbound { mut held, sender } => {
                let matched = held
                    .iter()
                    .position(|event| event.request_id == request_id)
                    .and_then(|pos| held.remove(pos));

                if let Some(event) = matched {
                    debug!(request_id = %request_id, "Completion event arrived before submission returned");
                    // Receiver is owned by the caller of bind; a failed send means it already gave up
                    return sender.send(event.payload).is_ok();
                }

                if !held.is_empty() {
                    debug!(
                        request_id = %request_id,
                        discarded = held.len(),
                        "Discarding held events for other requests"
                    );
                }
                *state = ListenerState::Bound { request_id, sender };
                false
            }
            other => {
                *state = other;
                false
            }
        }
    }

    /// Move to the terminal state without a payload.
    ///
    /// Returns `true` if this call performed the transition, `false` if the
    /// listener was already terminal (an event won the race).
    pub fn seal(&self) -> bool {
        let mut state = self.state.lock();
        !matches!(
            std::mem::replace(&mut *state, ListenerState::Terminal),
            ListenerState::Terminal
        )
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(*self.state.lock(), ListenerState::Terminal)
    }
}
