//! Authoritative carried state and intent validation.
//!
//! [`CarryServer`] never trusts client-supplied slot contents. Every handler
//! re-checks every precondition against its own world before mutating, and
//! answers a rejection by marking the affected blocks and the sender's
//! carried attribute dirty so the next sync overwrites the client's guess.

use std::collections::HashMap;

use bevy_ecs::prelude::*;
use carry_model::{
    Actor, CARRIED_ATTRIBUTE, CarriedSlots, CarryContext, CarryError, DropReport, WatchedAttributes,
    can_interact, carried, collect_block_updates, collect_carried_updates, on_entity_loaded,
    resolve_placed_position, spawn_carrier,
};
use carry_net::{CarryMessage, CarryRouter, Payload, PickUp, PlaceDown, SwapSlots};
use carry_world::{BlockAccess, BlockPos, BuildPermissions, CarrySlot, PlayerId};
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// Rejection
// ---------------------------------------------------------------------------

/// Reasons an intent may be rejected by the server.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Rejection {
    /// Sender has no carrier on this server.
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    /// Pick-up and place-down never address the back directly.
    #[error("back slot is only reachable by swapping")]
    BackSlot,

    /// Sender is not sneaking with empty hands.
    #[error("player can't interact right now")]
    CannotInteract,

    /// Pick-up into a slot that already holds a block.
    #[error("{0:?} slot is already occupied")]
    SlotOccupied(CarrySlot),

    /// Place-down from an empty slot.
    #[error("{0:?} slot is empty")]
    SlotEmpty(CarrySlot),

    /// Sender may not build or break at the position.
    #[error("no permission at {0}")]
    NoPermission(BlockPos),

    /// A swap must involve the back and exactly one other slot.
    #[error("swap {first:?}/{second:?} doesn't involve the back exactly once")]
    SwapWithoutBack {
        /// First slot.
        first: CarrySlot,
        /// Second slot.
        second: CarrySlot,
    },

    /// The carry mutation itself refused.
    #[error(transparent)]
    Mutation(#[from] CarryError),
}

/// A forced resync issued for a rejected intent.
#[derive(Debug, Clone, PartialEq)]
pub struct Correction {
    /// Sender of the rejected intent.
    pub player: PlayerId,
    /// Block positions re-sent to the client.
    pub positions: Vec<BlockPos>,
    /// Why the intent was rejected.
    pub reason: Rejection,
}

// ---------------------------------------------------------------------------
// CarryServer
// ---------------------------------------------------------------------------

/// The server's canonical carry state: carriers in an ECS [`World`] and the
/// authoritative block world.
pub struct CarryServer<W> {
    entities: World,
    blocks: W,
    permissions: Box<dyn BuildPermissions>,
    players: HashMap<PlayerId, Entity>,
    corrections: Vec<Correction>,
}

impl<W: BlockAccess> CarryServer<W> {
    /// Create a server over `blocks` with the given permission source.
    pub fn new(blocks: W, permissions: impl BuildPermissions + 'static) -> Self {
        Self {
            entities: World::new(),
            blocks,
            permissions: Box::new(permissions),
            players: HashMap::new(),
            corrections: Vec::new(),
        }
    }

    // -- players ------------------------------------------------------------

    /// Spawn a carrier for a newly joined player.
    ///
    /// A player joining again while still connected first leaves: whatever
    /// the previous carrier held is dropped into the world.
    pub fn add_player(&mut self, actor: Actor) -> Entity {
        let player = actor.player_id;
        self.evict_stale(player);
        let entity = spawn_carrier(&mut self.entities, actor);
        self.players.insert(player, entity);
        info!(%player, "carrier joined");
        entity
    }

    /// Spawn a carrier with carried state restored from storage.
    ///
    /// Derived effects are reapplied and the state is queued for the client.
    pub fn restore_player(&mut self, actor: Actor, slots: CarriedSlots) -> Entity {
        let player = actor.player_id;
        self.evict_stale(player);
        let entity = self
            .entities
            .spawn((actor, slots, WatchedAttributes::default()))
            .id();
        on_entity_loaded(&mut self.entities, entity);
        self.players.insert(player, entity);
        info!(%player, "carrier restored");
        entity
    }

    /// Remove a player, dropping whatever they carry near their feet.
    pub fn remove_player(&mut self, player: PlayerId) -> Option<DropReport> {
        let entity = self.players.remove(&player)?;
        let origin = self
            .entities
            .get::<Actor>(entity)
            .map(|actor| BlockPos::from(actor.position.floor().as_ivec3()))
            .unwrap_or_default();

        let report = match self.context().drop_carried(entity, origin) {
            Ok(report) => report,
            Err(e) => {
                warn!(%player, "failed to drop carried blocks: {e}");
                DropReport::default()
            }
        };
        if !report.lost.is_empty() {
            warn!(%player, lost = report.lost.len(), "carried blocks lost on leave");
        }
        self.entities.despawn(entity);
        info!(%player, dropped = report.placed.len(), "carrier left");
        Some(report)
    }

    fn evict_stale(&mut self, player: PlayerId) {
        if self.players.contains_key(&player) {
            warn!(%player, "player joined twice, replacing previous carrier");
            self.remove_player(player);
        }
    }

    /// Carrier entity of `player`.
    pub fn entity(&self, player: PlayerId) -> Option<Entity> {
        self.players.get(&player).copied()
    }

    /// Mutable access to a player's actor, e.g. to apply movement or sneak
    /// state received elsewhere.
    pub fn actor_mut(&mut self, player: PlayerId) -> Option<Mut<'_, Actor>> {
        let entity = self.entity(player)?;
        self.entities.get_mut::<Actor>(entity)
    }

    /// Number of connected carriers.
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    // -- state access -------------------------------------------------------

    /// Authoritative entity store.
    pub fn entities(&self) -> &World {
        &self.entities
    }

    /// Authoritative block world.
    pub fn blocks(&self) -> &W {
        &self.blocks
    }

    /// Mutable block world, for world generation and external edits.
    pub fn blocks_mut(&mut self) -> &mut W {
        &mut self.blocks
    }

    /// Resyncs issued so far.
    pub fn corrections(&self) -> &[Correction] {
        &self.corrections
    }

    /// Drain the recorded resyncs.
    pub fn take_corrections(&mut self) -> Vec<Correction> {
        std::mem::take(&mut self.corrections)
    }

    /// Replication messages for everything that changed since the last call:
    /// dirty blocks first, then dirty carried state.
    pub fn collect_sync(&mut self) -> Vec<CarryMessage> {
        let mut out: Vec<CarryMessage> = collect_block_updates(&mut self.blocks)
            .into_iter()
            .map(Payload::into_message)
            .collect();
        out.extend(
            collect_carried_updates(&mut self.entities)
                .into_iter()
                .map(Payload::into_message),
        );
        out
    }

    // -- handlers -----------------------------------------------------------

    /// Handle [`PickUp`].
    pub fn on_pick_up(&mut self, player: PlayerId, msg: PickUp) -> Result<(), Rejection> {
        let result = self.try_pick_up(player, msg);
        match &result {
            Ok(()) => debug!(%player, pos = %msg.position, slot = ?msg.slot, "pick-up accepted"),
            Err(reason) => self.invalid_carry(player, vec![msg.position], reason.clone()),
        }
        result
    }

    /// Handle [`PlaceDown`]. Returns the cell the block now occupies.
    pub fn on_place_down(&mut self, player: PlayerId, msg: PlaceDown) -> Result<BlockPos, Rejection> {
        let result = self.try_place_down(player, msg);
        match &result {
            Ok(pos) => debug!(%player, %pos, slot = ?msg.slot, "place-down accepted"),
            Err(reason) => {
                let clicked = msg.selection.position;
                let mut positions = vec![clicked];
                let block = self
                    .entity(player)
                    .and_then(|entity| carried(&self.entities, entity, msg.slot))
                    .map(|held| held.block);
                if let Some(resolved) =
                    block.and_then(|block| resolve_placed_position(&self.blocks, Some(&msg.selection), block))
                {
                    if resolved != clicked {
                        positions.push(resolved);
                    }
                }
                self.invalid_carry(player, positions, reason.clone());
            }
        }
        result
    }

    /// Handle [`SwapSlots`].
    pub fn on_swap_slots(&mut self, player: PlayerId, msg: SwapSlots) -> Result<(), Rejection> {
        let result = self.try_swap(player, msg);
        match &result {
            Ok(()) => debug!(%player, first = ?msg.first, second = ?msg.second, "swap accepted"),
            Err(reason) => self.invalid_carry(player, Vec::new(), reason.clone()),
        }
        result
    }

    fn try_pick_up(&mut self, player: PlayerId, msg: PickUp) -> Result<(), Rejection> {
        if msg.slot == CarrySlot::Back {
            return Err(Rejection::BackSlot);
        }
        let entity = self.interacting(player)?;
        if carried(&self.entities, entity, msg.slot).is_some() {
            return Err(Rejection::SlotOccupied(msg.slot));
        }
        if !self.permissions.may_build(player, msg.position) {
            return Err(Rejection::NoPermission(msg.position));
        }
        self.context().carry(entity, msg.position, msg.slot)?;
        Ok(())
    }

    fn try_place_down(&mut self, player: PlayerId, msg: PlaceDown) -> Result<BlockPos, Rejection> {
        if msg.slot == CarrySlot::Back {
            return Err(Rejection::BackSlot);
        }
        let entity = self.interacting(player)?;
        if carried(&self.entities, entity, msg.slot).is_none() {
            return Err(Rejection::SlotEmpty(msg.slot));
        }
        Ok(self.context().place_down(entity, msg.slot, &msg.selection)?)
    }

    fn try_swap(&mut self, player: PlayerId, msg: SwapSlots) -> Result<(), Rejection> {
        if (msg.first == CarrySlot::Back) == (msg.second == CarrySlot::Back) {
            return Err(Rejection::SwapWithoutBack {
                first: msg.first,
                second: msg.second,
            });
        }
        let entity = self.interacting(player)?;
        self.context().swap(entity, msg.first, msg.second)?;
        Ok(())
    }

    /// Carrier of `player`, provided it may interact.
    fn interacting(&self, player: PlayerId) -> Result<Entity, Rejection> {
        let entity = self.entity(player).ok_or(Rejection::UnknownPlayer(player))?;
        if !can_interact(&self.entities, entity) {
            return Err(Rejection::CannotInteract);
        }
        Ok(entity)
    }

    /// Force the client back onto authoritative state.
    fn invalid_carry(&mut self, player: PlayerId, positions: Vec<BlockPos>, reason: Rejection) {
        warn!(%player, ?positions, "carry intent rejected: {reason}");
        for &pos in &positions {
            self.blocks.mark_block_dirty(pos);
        }
        if let Some(entity) = self.entity(player) {
            if let Some(mut watched) = self.entities.get_mut::<WatchedAttributes>(entity) {
                watched.mark_path_dirty(CARRIED_ATTRIBUTE);
            }
        }
        self.corrections.push(Correction {
            player,
            positions,
            reason,
        });
    }

    fn context(&mut self) -> CarryContext<'_> {
        CarryContext::new(&mut self.entities, &mut self.blocks, &*self.permissions)
    }
}

/// Register the three intent handlers on `router`.
pub fn register_handlers<W: BlockAccess + 'static>(router: &mut CarryRouter<CarryServer<W>>) {
    router.register(|server: &mut CarryServer<W>, player, msg: PickUp| {
        let _ = server.on_pick_up(player, msg);
    });
    router.register(|server: &mut CarryServer<W>, player, msg: PlaceDown| {
        let _ = server.on_place_down(player, msg);
    });
    router.register(|server: &mut CarryServer<W>, player, msg: SwapSlots| {
        let _ = server.on_swap_slots(player, msg);
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
