//! The carrying entity: identity, controls relevant to carrying, and spawning.

use bevy_ecs::prelude::*;
use carry_world::PlayerId;
use glam::Vec3;

use crate::carried::CarriedSlots;
use crate::effects::{CarryEffects, refresh_effects};
use crate::watched::WatchedAttributes;

/// A player entity able to carry blocks.
#[derive(Component, Clone, Debug, PartialEq)]
pub struct Actor {
    /// Owning player.
    pub player_id: PlayerId,
    /// Whether the sneak control is held.
    pub sneaking: bool,
    /// Whether the active hotbar slot is empty.
    pub main_hand_empty: bool,
    /// Whether the off-hand slot is empty.
    pub off_hand_empty: bool,
    /// Feet position in world space.
    pub position: Vec3,
}

impl Actor {
    /// A standing, empty-handed actor at the origin.
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            sneaking: false,
            main_hand_empty: true,
            off_hand_empty: true,
            position: Vec3::ZERO,
        }
    }

    /// Sneaking with nothing in either item hand.
    pub fn can_interact(&self) -> bool {
        self.sneaking && self.main_hand_empty && self.off_hand_empty
    }
}

/// Whether `entity` may start or continue a carry interaction.
pub fn can_interact(world: &World, entity: Entity) -> bool {
    world.get::<Actor>(entity).is_some_and(Actor::can_interact)
}

/// Spawn a carrier with empty slots and fresh derived state.
pub fn spawn_carrier(world: &mut World, actor: Actor) -> Entity {
    let entity = world
        .spawn((
            actor,
            CarriedSlots::default(),
            WatchedAttributes::default(),
            CarryEffects::default(),
        ))
        .id();
    refresh_effects(world, entity);
    entity
}

/// Entity of the carrier owned by `player`.
pub fn find_carrier(world: &mut World, player: PlayerId) -> Option<Entity> {
    let mut query = world.query::<(Entity, &Actor)>();
    query
        .iter(world)
        .find(|(_, actor)| actor.player_id == player)
        .map(|(entity, _)| entity)
}
