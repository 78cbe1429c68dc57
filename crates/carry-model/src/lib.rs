//! Carried-item model: which block each entity carries in which slot, the
//! carry/place/swap mutations shared by client prediction and server
//! authority, the placement resolver, derived side effects, and watched-state
//! replication of carried blocks.

pub mod actor;
pub mod carried;
pub mod carry;
pub mod effects;
pub mod error;
pub mod placement;
pub mod watched;

pub use actor::{Actor, can_interact, find_carrier, spawn_carrier};
pub use carried::{CarriedBlock, CarriedSlots, carried, carried_in_hand_or_shoulder};
pub use carry::{CarryContext, DropReport};
pub use effects::{CarryEffects, on_entity_loaded, refresh_effects};
pub use error::CarryError;
pub use placement::{can_place, resolve_placed_position};
pub use watched::{
    BlockUpdate, CARRIED_ATTRIBUTE, CarriedStateUpdate, WatchedAttributes, apply_block_updates,
    apply_carried_update, carried_path, collect_block_updates, collect_carried_updates,
};
