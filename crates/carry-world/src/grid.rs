//! Sparse in-memory [`BlockAccess`] implementation.
//!
//! Cells not present in the map are air. Every mutation records the position
//! as dirty so an authoritative owner can re-send changed blocks.

use std::collections::{BTreeSet, HashMap};

use tracing::trace;

use crate::access::{BlockAccess, BlockEntityData, BlockState};
use crate::position::{BlockPos, BlockSelection};
use crate::registry::{BlockId, BlockRegistry};

/// Sparse voxel grid keyed by [`BlockPos`].
#[derive(Clone, Debug)]
pub struct GridWorld {
    registry: BlockRegistry,
    blocks: HashMap<BlockPos, BlockState>,
    block_entities: HashMap<BlockPos, BlockEntityData>,
    dirty: BTreeSet<BlockPos>,
}

impl GridWorld {
    /// Create an empty world using `registry`.
    pub fn new(registry: BlockRegistry) -> Self {
        Self {
            registry,
            blocks: HashMap::new(),
            block_entities: HashMap::new(),
            dirty: BTreeSet::new(),
        }
    }

    /// Set a non-oriented block at `pos`.
    pub fn set_block(&mut self, pos: BlockPos, id: BlockId) {
        self.set_block_state(pos, BlockState::of(id));
    }

    /// Fill the horizontal square `-radius..=radius` at height `y` with `id`.
    pub fn fill_layer(&mut self, y: i32, radius: i32, id: BlockId) {
        for x in -radius..=radius {
            for z in -radius..=radius {
                self.set_block(BlockPos::new(x, y, z), id);
            }
        }
    }

    /// Block-entity payload at `pos`, without detaching it.
    pub fn block_entity(&self, pos: BlockPos) -> Option<&BlockEntityData> {
        self.block_entities.get(&pos)
    }

    /// Number of non-air cells.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    fn write(&mut self, pos: BlockPos, state: BlockState) {
        if state.id.is_air() {
            self.blocks.remove(&pos);
        } else {
            self.blocks.insert(pos, state);
        }
        self.dirty.insert(pos);
    }
}

impl BlockAccess for GridWorld {
    fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    fn block_state(&self, pos: BlockPos) -> BlockState {
        self.blocks.get(&pos).copied().unwrap_or(BlockState::AIR)
    }

    fn set_block_state(&mut self, pos: BlockPos, state: BlockState) {
        if self.block_state(pos).id != state.id {
            self.block_entities.remove(&pos);
        }
        self.write(pos, state);
    }

    fn try_place_block(&mut self, block: BlockId, selection: &BlockSelection) -> bool {
        let pos = selection.position;
        if block.is_air() || !self.is_replaceable(pos, block) {
            return false;
        }
        let facing = self
            .registry
            .get(block)
            .filter(|def| def.orientable)
            .map(|_| selection.face);
        self.block_entities.remove(&pos);
        self.write(pos, BlockState { id: block, facing });
        trace!(%pos, ?block, "block placed");
        true
    }

    fn remove_block(&mut self, pos: BlockPos) {
        self.block_entities.remove(&pos);
        self.write(pos, BlockState::AIR);
    }

    fn take_block_entity(&mut self, pos: BlockPos) -> Option<BlockEntityData> {
        self.block_entities.remove(&pos)
    }

    fn put_block_entity(&mut self, pos: BlockPos, data: BlockEntityData) {
        self.block_entities.insert(pos, data);
    }

    fn mark_block_dirty(&mut self, pos: BlockPos) {
        self.dirty.insert(pos);
    }

    fn take_dirty_blocks(&mut self) -> Vec<BlockPos> {
        std::mem::take(&mut self.dirty).into_iter().collect()
    }
}
