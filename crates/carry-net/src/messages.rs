//! Carry channel message types.
//!
//! All messages are serialized with [`postcard`] and prefixed with a protocol
//! version byte. Use [`serialize_message`] and [`deserialize_message`] for
//! encoding/decoding.

use carry_model::{BlockUpdate, CarriedStateUpdate};
use carry_world::{BlockPos, BlockSelection, CarrySlot};
use serde::{Deserialize, Serialize};

/// Fixed name the carry channel is registered under.
pub const CHANNEL_NAME: &str = "carryon";

/// Current protocol version. Bump when any message layout changes.
pub const PROTOCOL_VERSION: u8 = 1;

// ---------------------------------------------------------------------------
// Top-level enum
// ---------------------------------------------------------------------------

/// Every message that can travel on the carry channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CarryMessage {
    /// Client → server: picked up a block.
    PickUp(PickUp),
    /// Client → server: put a carried block down.
    PlaceDown(PlaceDown),
    /// Client → server: exchanged two carry slots.
    SwapSlots(SwapSlots),
    /// Server → client: authoritative carried state of a player.
    CarriedState(CarriedStateUpdate),
    /// Server → client: authoritative state of a block cell.
    BlockUpdate(BlockUpdate),
}

// ---------------------------------------------------------------------------
// Intents (client → server)
// ---------------------------------------------------------------------------

/// The sender picked up the block at `position` into `slot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickUp {
    /// Cell the block was taken from.
    pub position: BlockPos,
    /// Slot it now occupies.
    pub slot: CarrySlot,
}

/// The sender placed the block carried in `slot` at what it clicked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaceDown {
    /// Slot the block was carried in.
    pub slot: CarrySlot,
    /// The clicked selection, before placement resolution.
    pub selection: BlockSelection,
}

/// The sender exchanged the contents of two slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapSlots {
    /// First slot.
    pub first: CarrySlot,
    /// Second slot.
    pub second: CarrySlot,
}

// ---------------------------------------------------------------------------
// MessageTag
// ---------------------------------------------------------------------------

/// Routing key of a [`CarryMessage`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageTag {
    /// [`CarryMessage::PickUp`]
    PickUp,
    /// [`CarryMessage::PlaceDown`]
    PlaceDown,
    /// [`CarryMessage::SwapSlots`]
    SwapSlots,
    /// [`CarryMessage::CarriedState`]
    CarriedState,
    /// [`CarryMessage::BlockUpdate`]
    BlockUpdate,
}

impl CarryMessage {
    /// Extract the routing tag from a message without consuming it.
    pub fn tag(&self) -> MessageTag {
        match self {
            CarryMessage::PickUp(_) => MessageTag::PickUp,
            CarryMessage::PlaceDown(_) => MessageTag::PlaceDown,
            CarryMessage::SwapSlots(_) => MessageTag::SwapSlots,
            CarryMessage::CarriedState(_) => MessageTag::CarriedState,
            CarryMessage::BlockUpdate(_) => MessageTag::BlockUpdate,
        }
    }
}

// ---------------------------------------------------------------------------
// Serialization helpers
// ---------------------------------------------------------------------------

/// Errors that can occur during message deserialization.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    /// The payload was empty (no version byte).
    #[error("empty payload, no version byte")]
    EmptyPayload,

    /// The version byte does not match [`PROTOCOL_VERSION`].
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(u8),

    /// Postcard encoding or decoding failed.
    #[error("postcard error: {0}")]
    Postcard(#[from] postcard::Error),
}

/// Serialize a message into a versioned byte buffer.
///
/// Wire format: `[version: u8] [postcard-encoded CarryMessage]`
pub fn serialize_message(msg: &CarryMessage) -> Result<Vec<u8>, MessageError> {
    let body = postcard::to_allocvec(msg)?;
    let mut out = Vec::with_capacity(1 + body.len());
    out.push(PROTOCOL_VERSION);
    out.extend_from_slice(&body);
    Ok(out)
}

/// Deserialize a versioned byte buffer into a message.
pub fn deserialize_message(data: &[u8]) -> Result<CarryMessage, MessageError> {
    let (&version, body) = data.split_first().ok_or(MessageError::EmptyPayload)?;
    if version != PROTOCOL_VERSION {
        return Err(MessageError::UnsupportedVersion(version));
    }
    Ok(postcard::from_bytes(body)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
