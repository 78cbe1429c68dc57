//! Message routing: dispatch incoming carry messages to typed handlers.
//!
//! Each payload type implements [`Payload`], tying it to a [`MessageTag`].
//! [`CarryRouter::register`] maps that tag to a handler taking the concrete
//! payload, so handlers never match on [`CarryMessage`] themselves.

use std::collections::HashMap;

use carry_model::{BlockUpdate, CarriedStateUpdate};
use carry_world::PlayerId;
use tracing::warn;

use crate::messages::{
    CarryMessage, MessageError, MessageTag, PickUp, PlaceDown, SwapSlots, deserialize_message,
};

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// A message body with a fixed routing tag.
pub trait Payload: Sized {
    /// Tag this payload is routed under.
    const TAG: MessageTag;

    /// Unwrap the payload, or `None` if `msg` is another variant.
    fn from_message(msg: CarryMessage) -> Option<Self>;

    /// Wrap the payload for sending.
    fn into_message(self) -> CarryMessage;
}

macro_rules! impl_payload {
    ($ty:ty, $variant:ident) => {
        impl Payload for $ty {
            const TAG: MessageTag = MessageTag::$variant;

            fn from_message(msg: CarryMessage) -> Option<Self> {
                match msg {
                    CarryMessage::$variant(payload) => Some(payload),
                    _ => None,
                }
            }

            fn into_message(self) -> CarryMessage {
                CarryMessage::$variant(self)
            }
        }
    };
}

impl_payload!(PickUp, PickUp);
impl_payload!(PlaceDown, PlaceDown);
impl_payload!(SwapSlots, SwapSlots);
impl_payload!(CarriedStateUpdate, CarriedState);
impl_payload!(BlockUpdate, BlockUpdate);

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

type BoxedHandler<Ctx> = Box<dyn Fn(&mut Ctx, PlayerId, CarryMessage)>;

/// Routes incoming messages to registered handlers by [`MessageTag`].
///
/// `Ctx` is whatever state the handlers mutate: the authoritative server on
/// one end, the local client session on the other.
pub struct CarryRouter<Ctx> {
    handlers: HashMap<MessageTag, BoxedHandler<Ctx>>,
}

impl<Ctx> CarryRouter<Ctx> {
    /// Create an empty router.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register `handler` for payload type `P`, replacing any earlier one.
    pub fn register<P, F>(&mut self, handler: F)
    where
        P: Payload + 'static,
        F: Fn(&mut Ctx, PlayerId, P) + 'static,
    {
        self.handlers.insert(
            P::TAG,
            Box::new(move |ctx, sender, msg| {
                if let Some(payload) = P::from_message(msg) {
                    handler(ctx, sender, payload);
                }
            }),
        );
    }

    /// Route a decoded message from `sender`.
    ///
    /// Returns `true` if a handler was found, `false` if the message was
    /// dropped.
    pub fn route(&self, ctx: &mut Ctx, sender: PlayerId, msg: CarryMessage) -> bool {
        let tag = msg.tag();
        if let Some(handler) = self.handlers.get(&tag) {
            handler(ctx, sender, msg);
            true
        } else {
            warn!("No handler registered for {:?}, dropping message", tag);
            false
        }
    }

    /// Decode a frame and route it.
    pub fn route_frame(&self, ctx: &mut Ctx, sender: PlayerId, frame: &[u8]) -> Result<bool, MessageError> {
        let msg = deserialize_message(frame)?;
        Ok(self.route(ctx, sender, msg))
    }

    /// Return an iterator over registered tags (useful for startup logging).
    pub fn registered_tags(&self) -> impl Iterator<Item = &MessageTag> {
        self.handlers.keys()
    }
}

impl<Ctx> Default for CarryRouter<Ctx> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
