//! [`CarriedBlock`] values and the per-entity [`CarriedSlots`] component.

use bevy_ecs::prelude::*;
use carry_world::{BlockEntityData, BlockId, CarryBehavior, CarrySlot, SlotSettings};
use serde::{Deserialize, Serialize};

/// A block held by one entity in one slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarriedBlock {
    /// Block type that was picked up.
    pub block: BlockId,
    /// Slot the block currently occupies.
    pub slot: CarrySlot,
    /// Carry behaviour captured at pickup time.
    pub behavior: CarryBehavior,
    /// Block-entity payload detached from the world at pickup.
    pub block_entity: Option<BlockEntityData>,
}

impl CarriedBlock {
    /// Settings of the slot the block sits in.
    pub fn settings(&self) -> Option<&SlotSettings> {
        self.behavior.slot(self.slot)
    }

    /// Whether this block may be moved to `slot`.
    pub fn allows(&self, slot: CarrySlot) -> bool {
        self.behavior.allows(slot)
    }
}

/// Everything an entity carries, one entry per [`CarrySlot`].
///
/// The fixed array makes "at most one block per (entity, slot)" structural.
#[derive(Component, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CarriedSlots {
    slots: [Option<CarriedBlock>; 3],
}

impl CarriedSlots {
    /// Block in `slot`, if any.
    pub fn get(&self, slot: CarrySlot) -> Option<&CarriedBlock> {
        self.slots[slot.index()].as_ref()
    }

    /// Whether `slot` holds a block.
    pub fn is_occupied(&self, slot: CarrySlot) -> bool {
        self.slots[slot.index()].is_some()
    }

    /// Store `carried` in `slot`, rewriting its `slot` field. Returns the
    /// previous occupant.
    pub fn insert(&mut self, slot: CarrySlot, mut carried: CarriedBlock) -> Option<CarriedBlock> {
        carried.slot = slot;
        self.slots[slot.index()].replace(carried)
    }

    /// Remove and return the block in `slot`.
    pub fn take(&mut self, slot: CarrySlot) -> Option<CarriedBlock> {
        self.slots[slot.index()].take()
    }

    /// Iterate over occupied slots.
    pub fn iter(&self) -> impl Iterator<Item = &CarriedBlock> {
        self.slots.iter().flatten()
    }

    /// Returns `true` if nothing is carried.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

/// Block `entity` carries in `slot`.
pub fn carried(world: &World, entity: Entity, slot: CarrySlot) -> Option<&CarriedBlock> {
    world.get::<CarriedSlots>(entity)?.get(slot)
}

/// Block carried in Hands, or failing that on the Shoulder.
pub fn carried_in_hand_or_shoulder(world: &World, entity: Entity) -> Option<&CarriedBlock> {
    let slots = world.get::<CarriedSlots>(entity)?;
    slots
        .get(CarrySlot::Hands)
        .or_else(|| slots.get(CarrySlot::Shoulder))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crate_block(slot: CarrySlot) -> CarriedBlock {
        CarriedBlock {
            block: BlockId(3),
            slot,
            behavior: CarryBehavior::new(1.0)
                .with_slot(CarrySlot::Hands, SlotSettings::default())
                .with_slot(CarrySlot::Back, SlotSettings::default()),
            block_entity: None,
        }
    }

    #[test]
    fn test_insert_rewrites_slot_field() {
        let mut slots = CarriedSlots::default();
        assert!(slots.insert(CarrySlot::Back, crate_block(CarrySlot::Hands)).is_none());
        assert_eq!(slots.get(CarrySlot::Back).unwrap().slot, CarrySlot::Back);
        assert!(!slots.is_occupied(CarrySlot::Hands));
    }

    #[test]
    fn test_insert_replaces_single_occupant() {
        let mut slots = CarriedSlots::default();
        slots.insert(CarrySlot::Hands, crate_block(CarrySlot::Hands));
        let previous = slots.insert(CarrySlot::Hands, crate_block(CarrySlot::Hands));
        assert!(previous.is_some());
        assert_eq!(slots.iter().count(), 1);
    }

    #[test]
    fn test_hand_takes_precedence_over_shoulder() {
        let mut world = World::new();
        let mut slots = CarriedSlots::default();
        let mut shoulder = crate_block(CarrySlot::Shoulder);
        shoulder.block = BlockId(7);
        slots.insert(CarrySlot::Shoulder, shoulder);
        let entity = world.spawn(slots).id();

        assert_eq!(
            carried_in_hand_or_shoulder(&world, entity).map(|c| c.block),
            Some(BlockId(7))
        );

        world
            .get_mut::<CarriedSlots>(entity)
            .unwrap()
            .insert(CarrySlot::Hands, crate_block(CarrySlot::Hands));
        assert_eq!(
            carried_in_hand_or_shoulder(&world, entity).map(|c| c.slot),
            Some(CarrySlot::Hands)
        );
    }

    #[test]
    fn test_missing_component_reads_as_empty() {
        let mut world = World::new();
        let entity = world.spawn_empty().id();
        assert!(carried(&world, entity, CarrySlot::Hands).is_none());
        assert!(carried_in_hand_or_shoulder(&world, entity).is_none());
    }
}
