//! Wire messages, channel plumbing, and handler routing for the carry channel.
//!
//! Clients send three one-shot intents ([`PickUp`], [`PlaceDown`],
//! [`SwapSlots`]); the server answers with replicated carried state and
//! block resends. Every message travels as a versioned postcard frame.

pub mod channel;
pub mod messages;
pub mod routing;

pub use channel::{IntentSender, Outbox};
pub use messages::{
    CHANNEL_NAME, CarryMessage, MessageError, MessageTag, PROTOCOL_VERSION, PickUp, PlaceDown,
    SwapSlots, deserialize_message, serialize_message,
};
pub use routing::{CarryRouter, Payload};
