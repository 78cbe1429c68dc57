//! Carry, place, swap and drop mutations.
//!
//! [`CarryContext`] bundles the entity store, the block world and build
//! permissions. The client runs these operations optimistically against its
//! mirror; the server runs the very same code against authoritative state.

use bevy_ecs::prelude::*;
use carry_world::{BlockAccess, BlockFace, BlockPos, BlockSelection, BuildPermissions, CarrySlot};
use glam::IVec3;
use tracing::{debug, warn};

use crate::actor::Actor;
use crate::carried::{CarriedBlock, CarriedSlots};
use crate::effects::refresh_effects;
use crate::error::CarryError;
use crate::watched::{WatchedAttributes, carried_path};

/// Search radius (horizontal) and height (vertical) for dropped blocks.
const DROP_RADIUS: i32 = 1;
const DROP_HEIGHT: i32 = 2;

/// Mutable view over everything a carry mutation touches.
pub struct CarryContext<'a> {
    /// Entity store holding carriers.
    pub entities: &'a mut World,
    /// Block world.
    pub blocks: &'a mut dyn BlockAccess,
    /// Build/break permission source.
    pub permissions: &'a dyn BuildPermissions,
}

/// Outcome of [`CarryContext::drop_carried`].
#[derive(Debug, Default, PartialEq)]
pub struct DropReport {
    /// Slots whose block was put back into the world, and where.
    pub placed: Vec<(CarrySlot, BlockPos)>,
    /// Blocks for which no legal spot was found.
    pub lost: Vec<CarriedBlock>,
}

impl<'a> CarryContext<'a> {
    /// Bundle the parts of a carry mutation.
    pub fn new(
        entities: &'a mut World,
        blocks: &'a mut dyn BlockAccess,
        permissions: &'a dyn BuildPermissions,
    ) -> Self {
        Self {
            entities,
            blocks,
            permissions,
        }
    }

    /// Pick up the block at `pos` into `slot`.
    ///
    /// Checks permission, slot vacancy and carryability, then removes the
    /// block (with its block entity) from the world and stores it.
    pub fn carry(&mut self, entity: Entity, pos: BlockPos, slot: CarrySlot) -> Result<(), CarryError> {
        self.check_permission(entity, pos)?;
        if self.slots(entity)?.is_occupied(slot) {
            return Err(CarryError::SlotOccupied(slot));
        }

        let block = self.blocks.block_at(pos);
        let behavior = self
            .blocks
            .carry_behavior(block)
            .filter(|behavior| behavior.allows(slot))
            .cloned()
            .ok_or(CarryError::NotCarryable { pos, slot })?;

        let block_entity = self.blocks.take_block_entity(pos);
        self.blocks.remove_block(pos);

        let carried = CarriedBlock {
            block,
            slot,
            behavior,
            block_entity,
        };
        self.store(entity, slot, Some(carried));
        debug!(?entity, %pos, ?slot, ?block, "block picked up");
        Ok(())
    }

    /// Put the block carried in `slot` into `selection.position`.
    ///
    /// The selection is used as-is; use [`Self::place_down`] to derive it
    /// from what the player clicked. Returns the position the block now
    /// occupies.
    pub fn place(
        &mut self,
        entity: Entity,
        slot: CarrySlot,
        selection: &BlockSelection,
    ) -> Result<BlockPos, CarryError> {
        let pos = selection.position;
        self.check_permission(entity, pos)?;
        let carried = self
            .slots(entity)?
            .get(slot)
            .cloned()
            .ok_or(CarryError::SlotEmpty(slot))?;

        if !self.blocks.try_place_block(carried.block, selection) {
            return Err(CarryError::PlacementRejected(pos));
        }
        if let Some(data) = carried.block_entity {
            self.blocks.put_block_entity(pos, data);
        }

        self.store(entity, slot, None);
        debug!(?entity, %pos, ?slot, block = ?carried.block, "block placed down");
        Ok(pos)
    }

    /// Exchange the contents of two slots. At least one must be occupied and
    /// each block must be legal in its destination.
    pub fn swap(&mut self, entity: Entity, first: CarrySlot, second: CarrySlot) -> Result<(), CarryError> {
        if first == second {
            return Err(CarryError::SameSlot(first));
        }
        let slots = self.slots(entity)?;
        let a = slots.get(first).cloned();
        let b = slots.get(second).cloned();

        if a.is_none() && b.is_none() {
            return Err(CarryError::NothingToSwap);
        }
        if a.as_ref().is_some_and(|c| !c.allows(second)) {
            return Err(CarryError::IllegalSlot { slot: second });
        }
        if b.as_ref().is_some_and(|c| !c.allows(first)) {
            return Err(CarryError::IllegalSlot { slot: first });
        }

        self.store(entity, second, a);
        self.store(entity, first, b);
        debug!(?entity, ?first, ?second, "carry slots swapped");
        Ok(())
    }

    /// Put every carried block back into the world near `origin`.
    ///
    /// Each block goes to the closest cell within the 3×3 columns around
    /// `origin` (±2 vertically) that it may replace and that rests on a
    /// solid top face. Permissions are not consulted.
    pub fn drop_carried(&mut self, entity: Entity, origin: BlockPos) -> Result<DropReport, CarryError> {
        let mut report = DropReport::default();
        for slot in CarrySlot::ALL {
            let Some(carried) = self.slots(entity)?.get(slot).cloned() else {
                continue;
            };
            self.store(entity, slot, None);

            match self.find_drop_cell(origin, &carried) {
                Some(pos) => {
                    let selection = BlockSelection::new(pos, BlockFace::Up);
                    if self.blocks.try_place_block(carried.block, &selection) {
                        if let Some(data) = carried.block_entity {
                            self.blocks.put_block_entity(pos, data);
                        }
                        report.placed.push((slot, pos));
                    } else {
                        report.lost.push(carried);
                    }
                }
                None => {
                    warn!(?entity, ?slot, block = ?carried.block, "no room to drop carried block");
                    report.lost.push(carried);
                }
            }
        }
        Ok(report)
    }

    fn find_drop_cell(&self, origin: BlockPos, carried: &CarriedBlock) -> Option<BlockPos> {
        let mut candidates = Vec::new();
        for dx in -DROP_RADIUS..=DROP_RADIUS {
            for dz in -DROP_RADIUS..=DROP_RADIUS {
                for dy in -DROP_HEIGHT..=DROP_HEIGHT {
                    candidates.extend(origin.checked_add(IVec3::new(dx, dy, dz)));
                }
            }
        }
        candidates.sort_by_key(|p| {
            let (dx, dy, dz) = (p.x - origin.x, p.y - origin.y, p.z - origin.z);
            (dx.abs() + dy.abs() + dz.abs(), dy.abs(), -dy)
        });
        candidates.into_iter().find(|pos| {
            self.blocks.is_replaceable(*pos, carried.block)
                && pos.down().is_some_and(|below| self.blocks.side_solid(below, BlockFace::Up))
        })
    }

    fn check_permission(&self, entity: Entity, pos: BlockPos) -> Result<(), CarryError> {
        let actor = self
            .entities
            .get::<Actor>(entity)
            .ok_or(CarryError::UnknownEntity(entity))?;
        if self.permissions.may_build(actor.player_id, pos) {
            Ok(())
        } else {
            Err(CarryError::NoPermission(pos))
        }
    }

    fn slots(&self, entity: Entity) -> Result<&CarriedSlots, CarryError> {
        self.entities
            .get::<CarriedSlots>(entity)
            .ok_or(CarryError::UnknownEntity(entity))
    }

    /// Write one slot, mark its watched path and refresh derived effects.
    fn store(&mut self, entity: Entity, slot: CarrySlot, carried: Option<CarriedBlock>) {
        if let Some(mut slots) = self.entities.get_mut::<CarriedSlots>(entity) {
            match carried {
                Some(carried) => {
                    slots.insert(slot, carried);
                }
                None => {
                    slots.take(slot);
                }
            }
        }
        if let Some(mut watched) = self.entities.get_mut::<WatchedAttributes>(entity) {
            watched.mark_path_dirty(&carried_path(slot));
        }
        refresh_effects(self.entities, entity);
    }
}
