//! Watched-state replication of carried blocks and block resends.
//!
//! The server marks attribute paths dirty whenever carried state changes or
//! must be re-sent. [`collect_carried_updates`] turns dirty carriers into
//! full-slot snapshots; the client applies them with
//! [`apply_carried_update`], overwriting whatever it predicted locally.

use std::collections::BTreeSet;

use bevy_ecs::prelude::*;
use carry_world::{BlockAccess, BlockPos, BlockState, CarrySlot, PlayerId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::actor::{Actor, find_carrier};
use crate::carried::CarriedSlots;
use crate::effects::refresh_effects;

/// Root attribute path of carried state.
pub const CARRIED_ATTRIBUTE: &str = "carryon:Carried";

/// Attribute path of a single slot below [`CARRIED_ATTRIBUTE`].
pub fn carried_path(slot: CarrySlot) -> String {
    format!("{CARRIED_ATTRIBUTE}/{}", slot.key())
}

/// Dirty attribute paths awaiting replication to the owning client.
#[derive(Component, Clone, Debug, Default, PartialEq)]
pub struct WatchedAttributes {
    dirty: BTreeSet<String>,
}

impl WatchedAttributes {
    /// Flag `path` for re-sending.
    pub fn mark_path_dirty(&mut self, path: &str) {
        self.dirty.insert(path.to_string());
    }

    /// Whether `path` or any path below it is dirty.
    pub fn is_dirty(&self, path: &str) -> bool {
        self.dirty.iter().any(|p| is_within(p, path))
    }

    /// Clear `path` and everything below it. Returns whether anything was dirty.
    pub fn take_dirty(&mut self, path: &str) -> bool {
        let before = self.dirty.len();
        self.dirty.retain(|p| !is_within(p, path));
        self.dirty.len() != before
    }
}

fn is_within(candidate: &str, root: &str) -> bool {
    candidate == root
        || candidate
            .strip_prefix(root)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Full carried state of one player, sent server → client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarriedStateUpdate {
    /// Player whose carrier this describes.
    pub player_id: PlayerId,
    /// Authoritative slot contents.
    pub slots: CarriedSlots,
}

/// Authoritative state of one block cell, sent server → client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockUpdate {
    /// Cell position.
    pub pos: BlockPos,
    /// State at that position.
    pub state: BlockState,
}

/// Snapshot every carrier whose carried attribute is dirty and clear the flag.
pub fn collect_carried_updates(world: &mut World) -> Vec<CarriedStateUpdate> {
    let mut query = world.query::<(&Actor, &CarriedSlots, &mut WatchedAttributes)>();
    let mut updates = Vec::new();
    for (actor, slots, mut watched) in query.iter_mut(world) {
        if watched.take_dirty(CARRIED_ATTRIBUTE) {
            updates.push(CarriedStateUpdate {
                player_id: actor.player_id,
                slots: slots.clone(),
            });
        }
    }
    updates
}

/// Overwrite the local carried state with an authoritative snapshot.
///
/// Returns `false` if no local carrier belongs to the update's player.
pub fn apply_carried_update(world: &mut World, update: &CarriedStateUpdate) -> bool {
    let Some(entity) = find_carrier(world, update.player_id) else {
        debug!(player = %update.player_id, "carried update for unknown player");
        return false;
    };
    let changed = world.get::<CarriedSlots>(entity) != Some(&update.slots);
    if let Ok(mut entity_mut) = world.get_entity_mut(entity) {
        entity_mut.insert(update.slots.clone());
    }
    if changed {
        debug!(player = %update.player_id, "local carried state corrected");
    }
    refresh_effects(world, entity);
    true
}

/// Drain dirty block positions into resend messages.
pub fn collect_block_updates(blocks: &mut dyn BlockAccess) -> Vec<BlockUpdate> {
    blocks
        .take_dirty_blocks()
        .into_iter()
        .map(|pos| BlockUpdate {
            pos,
            state: blocks.block_state(pos),
        })
        .collect()
}

/// Apply block resends to a local world.
pub fn apply_block_updates(blocks: &mut dyn BlockAccess, updates: &[BlockUpdate]) {
    for update in updates {
        if blocks.block_state(update.pos) != update.state {
            blocks.set_block_state(update.pos, update.state);
        }
    }
}
