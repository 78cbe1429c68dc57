//! The hold-to-interact state machine.
//!
//! An interaction starts on an interact-button edge, charges while the button
//! stays down, and completes once the held time exceeds the block's interact
//! delay scaled by the action's speed modifier. Completion applies the change
//! to the local mirror and sends the matching intent. Every start is followed
//! by one zero-length tick so an illegal start is dropped in the same frame.

use bevy_ecs::prelude::*;
use carry_config::InteractionConfig;
use carry_model::{
    CarryContext, CarryError, can_interact, can_place, carried, carried_in_hand_or_shoulder,
    resolve_placed_position,
};
use carry_net::{CarryMessage, IntentSender, Payload, PickUp, PlaceDown, SwapSlots};
use carry_world::{BlockAccess, BlockPos, BuildPermissions, CarryBehavior, CarrySlot};
use tracing::{debug, trace};

use crate::input::{EntityAction, Handling, InputSnapshot};
use crate::progress::ProgressIndicator;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Interaction currently being charged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CurrentAction {
    /// Idle.
    #[default]
    None,
    /// Picking the targeted block up.
    PickUp,
    /// Putting a carried block down.
    PlaceDown,
    /// Moving a block between the back and a hand slot.
    SwapBack,
}

/// Controller state. `action` is `None` exactly when `target_slot` is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionState {
    action: CurrentAction,
    target_slot: Option<CarrySlot>,
    selected_position: Option<BlockPos>,
    time_held: f32,
    awaiting_release: bool,
}

impl InteractionState {
    /// Interaction being charged.
    pub fn action(&self) -> CurrentAction {
        self.action
    }

    /// Slot the interaction acts on. For a swap this is the non-back slot.
    pub fn target_slot(&self) -> Option<CarrySlot> {
        self.target_slot
    }

    /// Cell captured at start: the block to pick up, or where a placed
    /// block would land.
    pub fn selected_position(&self) -> Option<BlockPos> {
        self.selected_position
    }

    /// Seconds the button has been held for this interaction.
    pub fn time_held(&self) -> f32 {
        self.time_held
    }

    /// Set after an interaction ends while the button is still down; no new
    /// interaction starts until it is released.
    pub fn awaiting_release(&self) -> bool {
        self.awaiting_release
    }

    /// Returns `true` when no interaction is running.
    pub fn is_idle(&self) -> bool {
        self.action == CurrentAction::None
    }

    fn begin(&mut self, action: CurrentAction, slot: CarrySlot, position: Option<BlockPos>) {
        self.action = action;
        self.target_slot = Some(slot);
        self.selected_position = position;
        self.time_held = 0.0;
    }

    fn clear(&mut self) {
        self.action = CurrentAction::None;
        self.target_slot = None;
        self.selected_position = None;
        self.time_held = 0.0;
    }
}

/// What the current action should do this tick.
enum Charge {
    /// Keep charging towards `delay` seconds (before the speed modifier).
    Toward(f32),
    /// Hold the charge without accumulating time.
    Wait,
    /// Drop the interaction.
    Cancel(&'static str),
}

// ---------------------------------------------------------------------------
// LocalPlayer
// ---------------------------------------------------------------------------

/// The local player and the mirror it acts on, borrowed for one callback.
pub struct LocalPlayer<'a> {
    /// Local entity store.
    pub entities: &'a mut World,
    /// The local player's carrier entity.
    pub entity: Entity,
    /// Local block mirror.
    pub blocks: &'a mut dyn BlockAccess,
    /// Permissions as known to the client.
    pub permissions: &'a dyn BuildPermissions,
    /// Input sampled this frame.
    pub input: InputSnapshot,
}

// ---------------------------------------------------------------------------
// InteractionController
// ---------------------------------------------------------------------------

/// Client-side driver of timed carry interactions.
pub struct InteractionController {
    config: InteractionConfig,
    sender: Box<dyn IntentSender>,
    progress: Box<dyn ProgressIndicator>,
    state: InteractionState,
}

impl InteractionController {
    /// Create a controller sending completed interactions through `sender`.
    pub fn new(
        config: InteractionConfig,
        sender: impl IntentSender + 'static,
        progress: impl ProgressIndicator + 'static,
    ) -> Self {
        Self {
            config,
            sender: Box::new(sender),
            progress: Box::new(progress),
            state: InteractionState::default(),
        }
    }

    /// Current state, for display and tests.
    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    /// Handle a button-down edge of `action`.
    ///
    /// Starts an interaction when `action` is interact and nothing else is
    /// running. Other actions are suppressed while a block is carried in
    /// hands.
    pub fn on_action(&mut self, action: EntityAction, player: &mut LocalPlayer<'_>) -> Handling {
        let holding_hands = carried(&*player.entities, player.entity, CarrySlot::Hands).is_some();
        let fallback = if holding_hands {
            Handling::PreventDefault
        } else {
            Handling::PassThrough
        };

        if action != EntityAction::Interact {
            return fallback;
        }
        if self.state.awaiting_release || !self.state.is_idle() {
            return Handling::PreventDefault;
        }
        if !can_interact(&*player.entities, player.entity) {
            return fallback;
        }
        let Some((next, slot, position)) = self.choose(player) else {
            return fallback;
        };

        debug!(action = ?next, ?slot, ?position, "carry interaction started");
        self.state.begin(next, slot, position);
        self.step(player, 0.0);

        if self.state.is_idle() {
            fallback
        } else {
            Handling::PreventDefault
        }
    }

    /// Per-frame driver. `dt` is the frame time in seconds.
    pub fn on_tick(&mut self, player: &mut LocalPlayer<'_>, dt: f32) {
        self.step(player, dt);
    }

    /// Veto hotbar changes while a block is carried in hands.
    pub fn on_before_active_slot_changed(&self, player: &LocalPlayer<'_>) -> Handling {
        if carried(&*player.entities, player.entity, CarrySlot::Hands).is_some() {
            Handling::PreventDefault
        } else {
            Handling::PassThrough
        }
    }

    /// Pick the interaction an interact press starts, if any.
    fn choose(&self, player: &LocalPlayer<'_>) -> Option<(CurrentAction, CarrySlot, Option<BlockPos>)> {
        let world: &World = &*player.entities;
        let blocks: &dyn BlockAccess = &*player.blocks;
        let entity = player.entity;
        let selection = player.input.selection.as_ref();

        let held = carried_in_hand_or_shoulder(world, entity);
        let in_hands = carried(world, entity, CarrySlot::Hands);
        let on_back = carried(world, entity, CarrySlot::Back);

        if let Some(held) = held.filter(|_| selection.is_some()) {
            if can_place(blocks, selection, held) {
                let target = resolve_placed_position(blocks, selection, held.block);
                return Some((CurrentAction::PlaceDown, held.slot, target));
            }
        }

        if let Some(hands) = in_hands {
            if selection.is_none() && on_back.is_none() && hands.allows(CarrySlot::Back) {
                return Some((CurrentAction::SwapBack, CarrySlot::Hands, None));
            }
        }

        if held.is_none() {
            if let Some(selection) = selection {
                let pos = selection.position;
                let slot = blocks
                    .carry_behavior(blocks.block_at(pos))
                    .and_then(CarryBehavior::first_pickup_slot);
                if let Some(slot) = slot {
                    return Some((CurrentAction::PickUp, slot, Some(pos)));
                }
            }
        }

        if in_hands.is_none() {
            if let Some(back) = on_back {
                let free = CarrySlot::PICKUP_ORDER
                    .into_iter()
                    .find(|&slot| back.allows(slot) && carried(world, entity, slot).is_none());
                if let Some(slot) = free {
                    return Some((CurrentAction::SwapBack, slot, None));
                }
            }
        }

        None
    }

    fn step(&mut self, player: &mut LocalPlayer<'_>, dt: f32) {
        if !player.input.interact_down {
            self.state.awaiting_release = false;
            if !self.state.is_idle() {
                trace!(held = self.state.time_held, "carry interaction released");
                self.reset();
            }
            return;
        }

        let Some(slot) = self.state.target_slot else {
            return;
        };
        if !can_interact(&*player.entities, player.entity) {
            self.interrupt("carrier can no longer interact");
            return;
        }

        let delay = match self.charge(player, slot) {
            Charge::Toward(delay) => delay,
            Charge::Wait => return,
            Charge::Cancel(reason) => {
                self.interrupt(reason);
                return;
            }
        };

        let modifier = match self.state.action {
            CurrentAction::PickUp => self.config.pickup_speed_modifier,
            CurrentAction::PlaceDown => self.config.place_speed_modifier,
            CurrentAction::SwapBack => self.config.swap_speed_modifier,
            CurrentAction::None => return,
        };
        let required = delay * modifier;

        self.state.time_held += dt;
        let progress = if required > 0.0 {
            self.state.time_held / required
        } else {
            f32::INFINITY
        };
        self.progress.show(progress);

        if progress <= 1.0 {
            return;
        }
        self.complete(player, slot);
    }

    /// Re-derive the timing basis of the running action from current state.
    fn charge(&self, player: &LocalPlayer<'_>, slot: CarrySlot) -> Charge {
        let world: &World = &*player.entities;
        let blocks: &dyn BlockAccess = &*player.blocks;
        let entity = player.entity;
        let selection = player.input.selection.as_ref();

        match self.state.action {
            CurrentAction::None => Charge::Cancel("idle"),
            CurrentAction::PickUp => {
                if carried_in_hand_or_shoulder(world, entity).is_some() {
                    return Charge::Cancel("already carrying");
                }
                let Some(selection) = selection else {
                    return Charge::Cancel("lost target");
                };
                if Some(selection.position) != self.state.selected_position {
                    return Charge::Cancel("target changed");
                }
                match blocks
                    .carry_behavior(blocks.block_at(selection.position))
                    .filter(|behavior| behavior.allows(slot))
                {
                    Some(behavior) => Charge::Toward(self.delay_of(behavior)),
                    None => Charge::Cancel("target not carryable"),
                }
            }
            CurrentAction::PlaceDown => {
                let Some(held) = carried(world, entity, slot) else {
                    return Charge::Cancel("nothing to place");
                };
                let target = resolve_placed_position(blocks, selection, held.block);
                if target.is_none() || target != self.state.selected_position {
                    return Charge::Cancel("target changed");
                }
                Charge::Toward(self.delay_of(&held.behavior))
            }
            CurrentAction::SwapBack => {
                let (block, destination) = match (
                    carried(world, entity, slot),
                    carried(world, entity, CarrySlot::Back),
                ) {
                    (Some(block), None) => (block, CarrySlot::Back),
                    (None, Some(block)) => (block, slot),
                    _ => return Charge::Cancel("slots changed"),
                };
                if !block.allows(destination) {
                    return Charge::Wait;
                }
                Charge::Toward(self.delay_of(&block.behavior))
            }
        }
    }

    fn delay_of(&self, behavior: &CarryBehavior) -> f32 {
        if behavior.interact_delay > 0.0 {
            behavior.interact_delay
        } else {
            self.config.default_interact_delay
        }
    }

    /// Apply the finished interaction locally and report it.
    fn complete(&mut self, player: &mut LocalPlayer<'_>, slot: CarrySlot) {
        let action = self.state.action;
        let position = self.state.selected_position;
        let selection = player.input.selection;
        let entity = player.entity;
        let mut ctx = CarryContext::new(&mut *player.entities, &mut *player.blocks, player.permissions);

        let result: Result<CarryMessage, CarryError> = match (action, position, selection) {
            (CurrentAction::PickUp, Some(position), _) => ctx
                .carry(entity, position, slot)
                .map(|()| PickUp { position, slot }.into_message()),
            (CurrentAction::PlaceDown, _, Some(selection)) => ctx
                .place_down(entity, slot, &selection)
                .map(|_| PlaceDown { slot, selection }.into_message()),
            (CurrentAction::SwapBack, _, _) => ctx.swap(entity, slot, CarrySlot::Back).map(|()| {
                SwapSlots {
                    first: slot,
                    second: CarrySlot::Back,
                }
                .into_message()
            }),
            _ => {
                self.finish();
                return;
            }
        };

        match result {
            Ok(msg) => {
                debug!(?action, ?slot, "carry interaction completed");
                self.sender.send(msg);
            }
            Err(e) => debug!(?action, ?slot, "local carry mutation failed, nothing sent: {e}"),
        }
        self.finish();
    }

    /// End after completion; the button must come up before the next start.
    fn finish(&mut self) {
        self.state.clear();
        self.state.awaiting_release = true;
        self.progress.hide();
    }

    /// Cancel because something changed under the interaction.
    fn interrupt(&mut self, reason: &'static str) {
        debug!(action = ?self.state.action, reason, "carry interaction cancelled");
        if self.state.time_held > 0.0 {
            self.state.awaiting_release = true;
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.state.clear();
        self.progress.hide();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ProgressRecorder;
    use carry_model::{Actor, CarriedBlock, CarriedSlots, spawn_carrier};
    use carry_net::{Outbox, deserialize_message};
    use carry_world::{
        AllowAll, BlockFace, BlockId, BlockRegistry, BlockSelection, BlockTypeDef, FaceMask, GridWorld,
        PlayerId, ProtectedArea, SlotSettings,
    };

    struct Fixture {
        entities: World,
        blocks: GridWorld,
        player: Entity,
        chest: BlockId,
        crate_block: BlockId,
        fence: BlockId,
    }

    impl Fixture {
        fn local(&mut self, input: InputSnapshot) -> LocalPlayer<'_> {
            LocalPlayer {
                entities: &mut self.entities,
                entity: self.player,
                blocks: &mut self.blocks,
                permissions: &AllowAll,
                input,
            }
        }

        fn hold(&mut self, slot: CarrySlot, block: BlockId) {
            let behavior = self.blocks.carry_behavior(block).cloned().unwrap();
            self.entities.get_mut::<CarriedSlots>(self.player).unwrap().insert(
                slot,
                CarriedBlock {
                    block,
                    slot,
                    behavior,
                    block_entity: None,
                },
            );
        }

        fn carried(&self, slot: CarrySlot) -> Option<BlockId> {
            carried(&self.entities, self.player, slot).map(|c| c.block)
        }
    }

    fn setup() -> (Fixture, InteractionController, Outbox, ProgressRecorder) {
        let mut registry = BlockRegistry::new();
        let stone = registry.register(BlockTypeDef::solid("stone")).unwrap();
        let fence = registry
            .register(BlockTypeDef::solid("fence").with_solid_faces(FaceMask::NONE))
            .unwrap();
        let chest = registry
            .register(
                BlockTypeDef::solid("chest").carryable(
                    CarryBehavior::new(1.0)
                        .with_slot(CarrySlot::Hands, SlotSettings::default())
                        .with_slot(CarrySlot::Back, SlotSettings::default()),
                ),
            )
            .unwrap();
        let crate_block = registry
            .register(
                BlockTypeDef::solid("crate")
                    .carryable(CarryBehavior::new(1.0).with_slot(CarrySlot::Hands, SlotSettings::default())),
            )
            .unwrap();

        let mut blocks = GridWorld::new(registry);
        blocks.fill_layer(0, 6, stone);
        let mut entities = World::new();
        let mut actor = Actor::new(PlayerId(1));
        actor.sneaking = true;
        let player = spawn_carrier(&mut entities, actor);

        let outbox = Outbox::new();
        let progress = ProgressRecorder::new();
        let controller = InteractionController::new(InteractionConfig::default(), outbox.clone(), progress.clone());
        let fixture = Fixture {
            entities,
            blocks,
            player,
            chest,
            crate_block,
            fence,
        };
        (fixture, controller, outbox, progress)
    }

    fn assert_consistent(state: &InteractionState) {
        assert_eq!(state.action() == CurrentAction::None, state.target_slot().is_none());
        if state.is_idle() {
            assert_eq!(state.time_held(), 0.0);
        }
    }

    fn tick_n(controller: &mut InteractionController, f: &mut Fixture, input: InputSnapshot, n: usize, dt: f32) {
        for _ in 0..n {
            controller.on_tick(&mut f.local(input), dt);
            assert_consistent(controller.state());
        }
    }

    fn sent(outbox: &Outbox) -> Vec<CarryMessage> {
        outbox
            .drain()
            .iter()
            .map(|frame| deserialize_message(frame).unwrap())
            .collect()
    }

    #[test]
    fn test_pickup_completes_after_hold() {
        let (mut f, mut controller, outbox, progress) = setup();
        let pos = BlockPos::new(0, 1, 0);
        f.blocks.set_block(pos, f.chest);
        let input = InputSnapshot::holding(Some(BlockSelection::new(pos, BlockFace::North)));

        let handling = controller.on_action(EntityAction::Interact, &mut f.local(input));
        assert_eq!(handling, Handling::PreventDefault);
        assert_eq!(controller.state().action(), CurrentAction::PickUp);
        assert_eq!(controller.state().target_slot(), Some(CarrySlot::Hands));

        tick_n(&mut controller, &mut f, input, 9, 0.1);
        assert_eq!(f.carried(CarrySlot::Hands), None);
        assert!(progress.current().unwrap() > 0.85);

        tick_n(&mut controller, &mut f, input, 2, 0.1);
        assert_eq!(f.carried(CarrySlot::Hands), Some(f.chest));
        assert_eq!(f.blocks.block_at(pos), BlockId::AIR);
        assert_eq!(
            sent(&outbox),
            vec![CarryMessage::PickUp(PickUp {
                position: pos,
                slot: CarrySlot::Hands
            })]
        );
        assert!(controller.state().is_idle());
        assert!(controller.state().awaiting_release());
        assert_eq!(progress.current(), None);
    }

    #[test]
    fn test_release_cancels_without_change() {
        let (mut f, mut controller, outbox, _) = setup();
        let pos = BlockPos::new(0, 1, 0);
        f.blocks.set_block(pos, f.chest);
        let input = InputSnapshot::holding(Some(BlockSelection::new(pos, BlockFace::North)));

        controller.on_action(EntityAction::Interact, &mut f.local(input));
        tick_n(&mut controller, &mut f, input, 5, 0.1);
        assert!(controller.state().time_held() > 0.45);

        tick_n(&mut controller, &mut f, InputSnapshot::released(), 1, 0.1);
        assert!(controller.state().is_idle());
        assert_eq!(controller.state().time_held(), 0.0);
        assert!(!controller.state().awaiting_release());
        assert_eq!(f.blocks.block_at(pos), f.chest);
        assert!(outbox.is_empty());
    }

    #[test]
    fn test_exactly_required_time_is_still_charging() {
        let (mut f, mut controller, outbox, _) = setup();
        let pos = BlockPos::new(0, 1, 0);
        f.blocks.set_block(pos, f.chest);
        let input = InputSnapshot::holding(Some(BlockSelection::new(pos, BlockFace::North)));

        controller.on_action(EntityAction::Interact, &mut f.local(input));
        tick_n(&mut controller, &mut f, input, 4, 0.25);
        assert_eq!(controller.state().action(), CurrentAction::PickUp);
        assert!(outbox.is_empty());

        tick_n(&mut controller, &mut f, input, 1, 0.25);
        assert_eq!(f.carried(CarrySlot::Hands), Some(f.chest));
    }

    #[test]
    fn test_place_down_is_faster() {
        let (mut f, mut controller, outbox, _) = setup();
        f.hold(CarrySlot::Hands, f.chest);
        let floor = BlockSelection::new(BlockPos::new(3, 0, 3), BlockFace::Up);
        let input = InputSnapshot::holding(Some(floor));

        controller.on_action(EntityAction::Interact, &mut f.local(input));
        assert_eq!(controller.state().action(), CurrentAction::PlaceDown);
        assert_eq!(controller.state().selected_position(), Some(BlockPos::new(3, 1, 3)));

        tick_n(&mut controller, &mut f, input, 3, 0.25);
        assert_eq!(f.carried(CarrySlot::Hands), Some(f.chest));

        tick_n(&mut controller, &mut f, input, 1, 0.25);
        assert_eq!(f.carried(CarrySlot::Hands), None);
        assert_eq!(f.blocks.block_at(BlockPos::new(3, 1, 3)), f.chest);
        assert_eq!(
            sent(&outbox),
            vec![CarryMessage::PlaceDown(PlaceDown {
                slot: CarrySlot::Hands,
                selection: floor
            })]
        );
    }

    #[test]
    fn test_no_place_down_against_non_solid_face() {
        let (mut f, mut controller, outbox, _) = setup();
        f.hold(CarrySlot::Hands, f.chest);
        let fence_pos = BlockPos::new(2, 1, 2);
        f.blocks.set_block(fence_pos, f.fence);
        let input = InputSnapshot::holding(Some(BlockSelection::new(fence_pos, BlockFace::Up)));

        let handling = controller.on_action(EntityAction::Interact, &mut f.local(input));
        assert_eq!(handling, Handling::PreventDefault);
        assert!(controller.state().is_idle());
        assert_consistent(controller.state());
        tick_n(&mut controller, &mut f, input, 20, 0.1);
        assert_eq!(f.carried(CarrySlot::Hands), Some(f.chest));
        assert!(outbox.is_empty());
    }

    #[test]
    fn test_swap_hands_to_back_when_aiming_at_nothing() {
        let (mut f, mut controller, outbox, _) = setup();
        f.hold(CarrySlot::Hands, f.chest);
        let input = InputSnapshot::holding(None);

        controller.on_action(EntityAction::Interact, &mut f.local(input));
        assert_eq!(controller.state().action(), CurrentAction::SwapBack);

        tick_n(&mut controller, &mut f, input, 3, 0.5);
        assert_eq!(f.carried(CarrySlot::Back), None);

        tick_n(&mut controller, &mut f, input, 1, 0.5);
        assert_eq!(f.carried(CarrySlot::Hands), None);
        assert_eq!(f.carried(CarrySlot::Back), Some(f.chest));
        assert_eq!(
            sent(&outbox),
            vec![CarryMessage::SwapSlots(SwapSlots {
                first: CarrySlot::Hands,
                second: CarrySlot::Back
            })]
        );
    }

    #[test]
    fn test_swap_back_to_hands() {
        let (mut f, mut controller, _, _) = setup();
        f.hold(CarrySlot::Back, f.chest);
        let input = InputSnapshot::holding(None);

        controller.on_action(EntityAction::Interact, &mut f.local(input));
        assert_eq!(controller.state().action(), CurrentAction::SwapBack);
        assert_eq!(controller.state().target_slot(), Some(CarrySlot::Hands));

        tick_n(&mut controller, &mut f, input, 4, 0.5);
        assert_eq!(f.carried(CarrySlot::Hands), Some(f.chest));
        assert_eq!(f.carried(CarrySlot::Back), None);
    }

    #[test]
    fn test_swap_waits_while_destination_is_illegal() {
        let (mut f, mut controller, _, _) = setup();
        f.hold(CarrySlot::Hands, f.chest);
        let input = InputSnapshot::holding(None);
        controller.on_action(EntityAction::Interact, &mut f.local(input));
        tick_n(&mut controller, &mut f, input, 1, 0.5);

        // A correction swaps in a block that may not go on the back.
        f.hold(CarrySlot::Hands, f.crate_block);
        let before = controller.state().time_held();
        tick_n(&mut controller, &mut f, input, 10, 0.5);
        assert_eq!(controller.state().action(), CurrentAction::SwapBack);
        assert_eq!(controller.state().time_held(), before);
        assert_eq!(f.carried(CarrySlot::Back), None);
    }

    #[test]
    fn test_retrigger_needs_release() {
        let (mut f, mut controller, _, _) = setup();
        f.hold(CarrySlot::Hands, f.chest);
        let input = InputSnapshot::holding(None);
        controller.on_action(EntityAction::Interact, &mut f.local(input));
        tick_n(&mut controller, &mut f, input, 4, 0.5);
        assert_eq!(f.carried(CarrySlot::Back), Some(f.chest));

        // Still held: the press is swallowed and nothing restarts.
        let handling = controller.on_action(EntityAction::Interact, &mut f.local(input));
        assert_eq!(handling, Handling::PreventDefault);
        assert!(controller.state().is_idle());

        tick_n(&mut controller, &mut f, InputSnapshot::released(), 1, 0.016);
        controller.on_action(EntityAction::Interact, &mut f.local(input));
        assert_eq!(controller.state().action(), CurrentAction::SwapBack);
        assert_eq!(controller.state().target_slot(), Some(CarrySlot::Hands));
    }

    #[test]
    fn test_turning_away_cancels_pickup() {
        let (mut f, mut controller, outbox, _) = setup();
        let pos = BlockPos::new(0, 1, 0);
        let other = BlockPos::new(1, 1, 0);
        f.blocks.set_block(pos, f.chest);
        f.blocks.set_block(other, f.chest);
        let input = InputSnapshot::holding(Some(BlockSelection::new(pos, BlockFace::North)));

        controller.on_action(EntityAction::Interact, &mut f.local(input));
        tick_n(&mut controller, &mut f, input, 3, 0.1);
        let turned = InputSnapshot::holding(Some(BlockSelection::new(other, BlockFace::North)));
        tick_n(&mut controller, &mut f, turned, 20, 0.1);

        assert!(controller.state().is_idle());
        assert!(controller.state().awaiting_release());
        assert_eq!(f.carried(CarrySlot::Hands), None);
        assert!(outbox.is_empty());
    }

    #[test]
    fn test_standing_up_cancels() {
        let (mut f, mut controller, outbox, _) = setup();
        let pos = BlockPos::new(0, 1, 0);
        f.blocks.set_block(pos, f.chest);
        let input = InputSnapshot::holding(Some(BlockSelection::new(pos, BlockFace::North)));

        controller.on_action(EntityAction::Interact, &mut f.local(input));
        tick_n(&mut controller, &mut f, input, 2, 0.1);
        f.entities.get_mut::<Actor>(f.player).unwrap().sneaking = false;
        tick_n(&mut controller, &mut f, input, 1, 0.1);

        assert!(controller.state().is_idle());
        assert!(outbox.is_empty());
    }

    #[test]
    fn test_not_sneaking_passes_through() {
        let (mut f, mut controller, _, _) = setup();
        let pos = BlockPos::new(0, 1, 0);
        f.blocks.set_block(pos, f.chest);
        f.entities.get_mut::<Actor>(f.player).unwrap().sneaking = false;
        let input = InputSnapshot::holding(Some(BlockSelection::new(pos, BlockFace::North)));

        let handling = controller.on_action(EntityAction::Interact, &mut f.local(input));
        assert_eq!(handling, Handling::PassThrough);
        assert!(controller.state().is_idle());
    }

    #[test]
    fn test_other_actions_suppressed_while_carrying_in_hands() {
        let (mut f, mut controller, _, _) = setup();
        let input = InputSnapshot::released();
        assert_eq!(
            controller.on_action(EntityAction::PrimaryAction, &mut f.local(input)),
            Handling::PassThrough
        );
        assert!(!controller.on_before_active_slot_changed(&f.local(input)).is_prevented());

        f.hold(CarrySlot::Hands, f.chest);
        for action in [EntityAction::PrimaryAction, EntityAction::Sprint, EntityAction::Jump] {
            assert!(controller.on_action(action, &mut f.local(input)).is_prevented());
        }
        assert!(controller.on_before_active_slot_changed(&f.local(input)).is_prevented());
    }

    #[test]
    fn test_correction_mid_charge_cancels() {
        let (mut f, mut controller, outbox, _) = setup();
        let pos = BlockPos::new(0, 1, 0);
        f.blocks.set_block(pos, f.chest);
        let input = InputSnapshot::holding(Some(BlockSelection::new(pos, BlockFace::North)));
        controller.on_action(EntityAction::Interact, &mut f.local(input));

        // The server reports the hands already full.
        f.hold(CarrySlot::Hands, f.crate_block);
        tick_n(&mut controller, &mut f, input, 15, 0.1);

        assert!(controller.state().is_idle());
        assert!(outbox.is_empty());
        assert_eq!(f.blocks.block_at(pos), f.chest);
    }

    #[test]
    fn test_failed_local_mutation_sends_nothing() {
        let (mut f, mut controller, outbox, _) = setup();
        let pos = BlockPos::new(0, 1, 0);
        f.blocks.set_block(pos, f.chest);
        let claim = ProtectedArea::new(BlockPos::new(-2, 0, -2), BlockPos::new(2, 4, 2), [PlayerId(2)]);
        let input = InputSnapshot::holding(Some(BlockSelection::new(pos, BlockFace::North)));

        for dt in [0.0, 0.6, 0.6] {
            let mut local = LocalPlayer {
                entities: &mut f.entities,
                entity: f.player,
                blocks: &mut f.blocks,
                permissions: &claim,
                input,
            };
            if dt == 0.0 {
                controller.on_action(EntityAction::Interact, &mut local);
            } else {
                controller.on_tick(&mut local, dt);
            }
        }

        assert!(controller.state().is_idle());
        assert!(controller.state().awaiting_release());
        assert!(outbox.is_empty());
        assert_eq!(f.blocks.block_at(pos), f.chest);
        assert_eq!(f.carried(CarrySlot::Hands), None);
    }
}
