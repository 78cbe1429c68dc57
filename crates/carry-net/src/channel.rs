//! Outgoing side of the carry channel.
//!
//! The interaction controller and the server are handed an [`IntentSender`]
//! at construction instead of reaching for a process-wide channel. [`Outbox`]
//! is the in-process implementation: it encodes messages into frames and
//! queues them until the transport (or a test) drains them.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{trace, warn};

use crate::messages::{CarryMessage, serialize_message};

/// Sink for messages leaving this side of the channel.
pub trait IntentSender {
    /// Queue `msg` for delivery. Delivery is fire-and-forget.
    fn send(&mut self, msg: CarryMessage);
}

/// Queue of encoded frames shared between a producer and the transport.
///
/// Clones share the same queue.
#[derive(Clone, Debug, Default)]
pub struct Outbox {
    frames: Arc<Mutex<VecDeque<Vec<u8>>>>,
}

impl Outbox {
    /// Create an empty outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return every queued frame in send order.
    pub fn drain(&self) -> Vec<Vec<u8>> {
        self.lock().drain(..).collect()
    }

    /// Number of queued frames.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Vec<u8>>> {
        self.frames.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl IntentSender for Outbox {
    fn send(&mut self, msg: CarryMessage) {
        match serialize_message(&msg) {
            Ok(frame) => {
                trace!(tag = ?msg.tag(), bytes = frame.len(), "carry message queued");
                self.lock().push_back(frame);
            }
            Err(e) => warn!(tag = ?msg.tag(), "failed to encode carry message: {e}"),
        }
    }
}
