//! Carry operation errors.

use bevy_ecs::entity::Entity;
use carry_world::{BlockPos, CarrySlot};

/// Why a carry, place, or swap mutation was refused. The world and the
/// carrier are left untouched whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CarryError {
    /// The entity has no carrier components.
    #[error("entity {0:?} is not a carrier")]
    UnknownEntity(Entity),

    /// The destination slot already holds a block.
    #[error("{0:?} slot is already occupied")]
    SlotOccupied(CarrySlot),

    /// The source slot holds nothing.
    #[error("{0:?} slot is empty")]
    SlotEmpty(CarrySlot),

    /// The targeted block has no carry behaviour for the requested slot.
    #[error("block at {pos} can't be carried in {slot:?}")]
    NotCarryable {
        /// Block position.
        pos: BlockPos,
        /// Requested slot.
        slot: CarrySlot,
    },

    /// The carrier may not build or break at the position.
    #[error("no permission to modify {0}")]
    NoPermission(BlockPos),

    /// The selection offers nothing to place against.
    #[error("nothing to place against at {0}")]
    NotPlaceable(BlockPos),

    /// The world refused to put the block into the cell.
    #[error("world refused placement at {0}")]
    PlacementRejected(BlockPos),

    /// A carried block may not move into the slot.
    #[error("block may not be carried in {slot:?}")]
    IllegalSlot {
        /// Destination slot.
        slot: CarrySlot,
    },

    /// A slot can't be swapped with itself.
    #[error("can't swap {0:?} with itself")]
    SameSlot(CarrySlot),

    /// Both slots of a swap are empty.
    #[error("nothing to swap")]
    NothingToSwap,
}
