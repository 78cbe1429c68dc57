//! The [`BlockAccess`] seam: everything the carry logic needs from the voxel
//! world, on either side of the connection.

use serde::{Deserialize, Serialize};

use crate::behavior::{CarryBehavior, CarrySlot};
use crate::position::{BlockFace, BlockPos, BlockSelection};
use crate::registry::{BlockId, BlockRegistry};

/// Block type plus the face it was placed against, for orientable blocks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockState {
    /// Block type.
    pub id: BlockId,
    /// Placement facing, `None` for non-orientable blocks.
    pub facing: Option<BlockFace>,
}

impl BlockState {
    /// Empty space.
    pub const AIR: Self = Self {
        id: BlockId::AIR,
        facing: None,
    };

    /// A non-oriented block of type `id`.
    pub fn of(id: BlockId) -> Self {
        Self { id, facing: None }
    }
}

/// Opaque block-entity payload (container contents and the like). It leaves
/// the world with the block when picked up and is restored on placement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockEntityData(pub Vec<u8>);

/// Read/mutate access to the voxel world.
///
/// The authoritative server world and the client's local mirror both
/// implement this trait, so the carry and placement logic runs unchanged on
/// both sides.
pub trait BlockAccess {
    /// Block type registry shared by both sides.
    fn registry(&self) -> &BlockRegistry;

    /// State of the block at `pos`; air for empty or unloaded cells.
    fn block_state(&self, pos: BlockPos) -> BlockState;

    /// Overwrite the state at `pos` (used when applying a server resend).
    fn set_block_state(&mut self, pos: BlockPos, state: BlockState);

    /// Place `block` into `selection.position`. Orientable blocks take
    /// `selection.face` as their facing. Returns `false` if the cell is not
    /// replaceable by `block`.
    fn try_place_block(&mut self, block: BlockId, selection: &BlockSelection) -> bool;

    /// Replace the block at `pos` with air, dropping any block entity.
    fn remove_block(&mut self, pos: BlockPos);

    /// Detach the block-entity payload at `pos`.
    fn take_block_entity(&mut self, pos: BlockPos) -> Option<BlockEntityData>;

    /// Attach a block-entity payload at `pos`.
    fn put_block_entity(&mut self, pos: BlockPos, data: BlockEntityData);

    /// Flag `pos` so its current state is re-sent to clients.
    fn mark_block_dirty(&mut self, pos: BlockPos);

    /// Drain the positions changed or flagged since the last call.
    fn take_dirty_blocks(&mut self) -> Vec<BlockPos>;

    /// Block type at `pos`.
    fn block_at(&self, pos: BlockPos) -> BlockId {
        self.block_state(pos).id
    }

    /// Whether the block at `pos` may be overwritten by placing `by`.
    fn is_replaceable(&self, pos: BlockPos, by: BlockId) -> bool {
        self.registry().is_replaceable_by(self.block_at(pos), by)
    }

    /// Whether `face` of the block at `pos` can support another block.
    fn side_solid(&self, pos: BlockPos, face: BlockFace) -> bool {
        self.registry()
            .get(self.block_at(pos))
            .is_some_and(|def| def.solid_faces.contains(face))
    }

    /// Carry behaviour of block type `block`.
    fn carry_behavior(&self, block: BlockId) -> Option<&CarryBehavior> {
        self.registry().carry_behavior(block)
    }

    /// Whether the block at `pos` may be carried in `slot`.
    fn is_carryable(&self, pos: BlockPos, slot: CarrySlot) -> bool {
        self.carry_behavior(self.block_at(pos))
            .is_some_and(|behavior| behavior.allows(slot))
    }
}
