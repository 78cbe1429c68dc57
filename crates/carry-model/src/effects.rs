//! Derived carry side effects: walk-speed penalty and held animations.
//!
//! Effects are never stored on their own. They are recomputed from
//! [`CarriedSlots`] after every mutation and whenever an entity is spawned,
//! loaded, or receives replicated carried state.

use std::collections::BTreeSet;

use bevy_ecs::prelude::*;
use tracing::trace;

use crate::carried::CarriedSlots;
use crate::watched::{CARRIED_ATTRIBUTE, WatchedAttributes};

/// Side effects currently applied to a carrier.
#[derive(Component, Clone, Debug, Default, PartialEq)]
pub struct CarryEffects {
    /// Sum of the walk-speed modifiers of every occupied slot.
    pub walk_speed_modifier: f32,
    /// Animations to play, one per occupied slot that declares one.
    pub animations: BTreeSet<String>,
}

impl CarryEffects {
    /// Effects implied by `slots`.
    pub fn from_slots(slots: &CarriedSlots) -> Self {
        let mut effects = Self::default();
        for settings in slots.iter().filter_map(|carried| carried.settings()) {
            effects.walk_speed_modifier += settings.walk_speed_modifier;
            if let Some(animation) = &settings.animation {
                effects.animations.insert(animation.clone());
            }
        }
        effects
    }

    /// Multiplier to apply to a base walk speed.
    pub fn walk_speed_multiplier(&self) -> f32 {
        (1.0 + self.walk_speed_modifier).max(0.0)
    }
}

/// Recompute [`CarryEffects`] for `entity` from its carried slots.
pub fn refresh_effects(world: &mut World, entity: Entity) {
    let effects = world
        .get::<CarriedSlots>(entity)
        .map(CarryEffects::from_slots)
        .unwrap_or_default();
    trace!(?entity, walk = effects.walk_speed_modifier, "carry effects refreshed");
    if let Ok(mut entity_mut) = world.get_entity_mut(entity) {
        entity_mut.insert(effects);
    }
}

/// Hook for an entity that was just spawned or loaded with carried state.
///
/// Reapplies effects and marks the carried attribute dirty so the owning
/// client receives the restored slots.
pub fn on_entity_loaded(world: &mut World, entity: Entity) {
    refresh_effects(world, entity);
    if let Some(mut watched) = world.get_mut::<WatchedAttributes>(entity) {
        watched.mark_path_dirty(CARRIED_ATTRIBUTE);
    }
}
