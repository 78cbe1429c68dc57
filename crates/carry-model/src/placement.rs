//! Where a carried block lands, and whether it may land there at all.
//!
//! Shared by client prediction and server validation so both sides agree on
//! the resolved cell for a given selection.

use bevy_ecs::entity::Entity;
use carry_world::{BlockAccess, BlockFace, BlockId, BlockPos, BlockSelection, CarrySlot};
use tracing::trace;

use crate::carried::{CarriedBlock, CarriedSlots};
use crate::carry::CarryContext;
use crate::error::CarryError;

/// Whether `carried` may be put down at `selection`.
///
/// Placing into a replaceable cell needs a solid top face below it; placing
/// against a block needs the clicked face to be solid. Selections whose
/// target cell would fall outside the coordinate range are never placeable.
pub fn can_place(
    blocks: &dyn BlockAccess,
    selection: Option<&BlockSelection>,
    carried: &CarriedBlock,
) -> bool {
    let Some(selection) = selection else {
        return false;
    };
    if blocks.is_replaceable(selection.position, carried.block) {
        selection
            .position
            .down()
            .is_some_and(|below| blocks.side_solid(below, BlockFace::Up))
    } else {
        blocks.side_solid(selection.position, selection.face) && selection.position.offset(selection.face).is_some()
    }
}

/// Cell that `block` would occupy if placed at `selection`.
pub fn resolve_placed_position(
    blocks: &dyn BlockAccess,
    selection: Option<&BlockSelection>,
    block: BlockId,
) -> Option<BlockPos> {
    let selection = selection?;
    if blocks.is_replaceable(selection.position, block) {
        Some(selection.position)
    } else if blocks.side_solid(selection.position, selection.face) {
        selection.position.offset(selection.face)
    } else {
        None
    }
}

/// Selection rewritten to address the cell the block will occupy.
fn placement_selection(blocks: &dyn BlockAccess, selection: &BlockSelection, block: BlockId) -> Option<BlockSelection> {
    let mut resolved = *selection;
    if blocks.is_replaceable(selection.position, block) {
        resolved.face = BlockFace::Up;
        resolved.hit_position.y = 0.5;
    } else {
        resolved.position = selection.position.offset(selection.face)?;
        resolved.did_offset = true;
    }
    Some(resolved)
}

impl CarryContext<'_> {
    /// Put down the block carried in `slot` at what the player clicked.
    ///
    /// Replaceable targets are filled in place facing up; anything else gets
    /// the block on the neighbouring cell past the clicked face. Returns the
    /// cell the block now occupies.
    pub fn place_down(
        &mut self,
        entity: Entity,
        slot: CarrySlot,
        selection: &BlockSelection,
    ) -> Result<BlockPos, CarryError> {
        let carried = self
            .entities
            .get::<CarriedSlots>(entity)
            .ok_or(CarryError::UnknownEntity(entity))?
            .get(slot)
            .cloned()
            .ok_or(CarryError::SlotEmpty(slot))?;

        let resolved = can_place(&*self.blocks, Some(selection), &carried)
            .then(|| placement_selection(&*self.blocks, selection, carried.block))
            .flatten()
            .ok_or(CarryError::NotPlaceable(selection.position))?;
        trace!(from = %selection.position, to = %resolved.position, face = ?resolved.face, "placement resolved");
        self.place(entity, slot, &resolved)
    }
}
