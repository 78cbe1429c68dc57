//! The client's local copy of carry-relevant state.
//!
//! Optimistic changes land here first. Server messages then overwrite
//! whatever was predicted; there is no rollback log because the carried
//! state and the touched blocks are small enough to resend in full.

use bevy_ecs::prelude::*;
use carry_model::{Actor, BlockUpdate, CarriedStateUpdate, apply_block_updates, apply_carried_update, spawn_carrier};
use carry_net::CarryRouter;
use carry_world::{BlockAccess, BuildPermissions};
use tracing::trace;

use crate::controller::LocalPlayer;
use crate::input::InputSnapshot;

/// Local entity store, block mirror, and the local player's entity.
pub struct ClientWorld<W> {
    /// Local entity store.
    pub entities: World,
    /// Local block mirror.
    pub blocks: W,
    /// The local player's carrier.
    pub player: Entity,
}

impl<W: BlockAccess> ClientWorld<W> {
    /// Spawn the local player into a fresh entity store over `blocks`.
    pub fn new(blocks: W, actor: Actor) -> Self {
        let mut entities = World::new();
        let player = spawn_carrier(&mut entities, actor);
        Self {
            entities,
            blocks,
            player,
        }
    }

    /// Borrow the mirror as the controller's view of the local player.
    pub fn local<'a>(&'a mut self, permissions: &'a dyn BuildPermissions, input: InputSnapshot) -> LocalPlayer<'a> {
        LocalPlayer {
            entities: &mut self.entities,
            entity: self.player,
            blocks: &mut self.blocks,
            permissions,
            input,
        }
    }

    /// The local player's actor component.
    pub fn actor_mut(&mut self) -> Option<Mut<'_, Actor>> {
        self.entities.get_mut::<Actor>(self.player)
    }

    /// Forget locally produced block changes. The mirror never sends them;
    /// the server decides what the world looks like.
    pub fn discard_local_dirt(&mut self) {
        let dropped = self.blocks.take_dirty_blocks();
        if !dropped.is_empty() {
            trace!(count = dropped.len(), "discarded local block dirt");
        }
    }
}

/// Route server messages into a [`ClientWorld`].
pub fn register_client_handlers<W: BlockAccess + 'static>(router: &mut CarryRouter<ClientWorld<W>>) {
    router.register(|client: &mut ClientWorld<W>, _, update: CarriedStateUpdate| {
        apply_carried_update(&mut client.entities, &update);
    });
    router.register(|client: &mut ClientWorld<W>, _, update: BlockUpdate| {
        apply_block_updates(&mut client.blocks, &[update]);
    });
}
