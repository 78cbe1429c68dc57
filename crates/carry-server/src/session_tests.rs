//! Carry sessions against the validator, and a client controller talking to
//! it over encoded frames.

use carry_client::{ClientWorld, EntityAction, InputSnapshot, InteractionController, register_client_handlers};
use carry_config::InteractionConfig;
use carry_model::{Actor, CarryError, carried};
use carry_net::{CarryRouter, Outbox, Payload, PickUp, PlaceDown, SwapSlots, serialize_message};
use carry_world::{
    AllowAll, BlockAccess, BlockFace, BlockId, BlockPos, BlockRegistry, BlockSelection, BlockTypeDef, BuildPermissions,
    CarryBehavior, CarrySlot, GridWorld, PlayerId, ProtectedArea, SlotSettings,
};

use crate::validator::{CarryServer, Rejection, register_handlers};

const PLAYER: PlayerId = PlayerId(7);
const CHEST_AT: BlockPos = BlockPos::new(0, 1, 0);

struct Ids {
    chest: BlockId,
}

fn terrain() -> (GridWorld, Ids) {
    let mut registry = BlockRegistry::new();
    let stone = registry.register(BlockTypeDef::solid("stone")).unwrap();
    let chest = registry
        .register(
            BlockTypeDef::solid("chest").carryable(
                CarryBehavior::new(1.0)
                    .with_slot(CarrySlot::Hands, SlotSettings::default())
                    .with_slot(CarrySlot::Back, SlotSettings::default()),
            ),
        )
        .unwrap();
    let mut world = GridWorld::new(registry);
    world.fill_layer(0, 8, stone);
    world.set_block(CHEST_AT, chest);
    world.take_dirty_blocks();
    (world, Ids { chest })
}

fn sneaking() -> Actor {
    let mut actor = Actor::new(PLAYER);
    actor.sneaking = true;
    actor
}

fn server_with(permissions: impl BuildPermissions + 'static) -> (CarryServer<GridWorld>, Ids) {
    let (world, ids) = terrain();
    let mut server = CarryServer::new(world, permissions);
    server.add_player(sneaking());
    server.collect_sync();
    (server, ids)
}

fn held(server: &CarryServer<GridWorld>, slot: CarrySlot) -> Option<BlockId> {
    let entity = server.entity(PLAYER)?;
    carried(server.entities(), entity, slot).map(|c| c.block)
}

// ---------------------------------------------------------------------------
// Validator scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_duplicate_pick_up_resyncs_exactly_once() {
    let (mut server, ids) = server_with(AllowAll);
    let msg = PickUp {
        position: CHEST_AT,
        slot: CarrySlot::Hands,
    };

    server.on_pick_up(PLAYER, msg).unwrap();
    assert!(server.corrections().is_empty());
    server.collect_sync();

    assert_eq!(
        server.on_pick_up(PLAYER, msg),
        Err(Rejection::SlotOccupied(CarrySlot::Hands))
    );
    assert_eq!(server.corrections().len(), 1);
    assert_eq!(server.corrections()[0].positions, vec![CHEST_AT]);
    assert_eq!(held(&server, CarrySlot::Hands), Some(ids.chest));
    assert_eq!(server.blocks().block_at(CHEST_AT), BlockId::AIR);
}

#[test]
fn test_pick_up_then_place_down_moves_the_block() {
    let (mut server, ids) = server_with(AllowAll);
    server
        .on_pick_up(
            PLAYER,
            PickUp {
                position: CHEST_AT,
                slot: CarrySlot::Hands,
            },
        )
        .unwrap();

    let selection = BlockSelection::new(BlockPos::new(2, 0, 0), BlockFace::Up);
    let placed = server
        .on_place_down(
            PLAYER,
            PlaceDown {
                slot: CarrySlot::Hands,
                selection,
            },
        )
        .unwrap();

    assert_eq!(placed, BlockPos::new(2, 1, 0));
    assert_eq!(server.blocks().block_at(placed), ids.chest);
    assert_eq!(server.blocks().block_at(CHEST_AT), BlockId::AIR);
    for slot in CarrySlot::ALL {
        assert_eq!(held(&server, slot), None);
    }
    assert!(server.corrections().is_empty());
}

#[test]
fn test_swap_back_into_empty_hands() {
    let (mut server, ids) = server_with(AllowAll);
    let back_to_hands = SwapSlots {
        first: CarrySlot::Back,
        second: CarrySlot::Hands,
    };
    assert!(matches!(server.on_swap_slots(PLAYER, back_to_hands), Err(Rejection::Mutation(_))));

    server
        .on_pick_up(
            PLAYER,
            PickUp {
                position: CHEST_AT,
                slot: CarrySlot::Hands,
            },
        )
        .unwrap();
    server
        .on_swap_slots(
            PLAYER,
            SwapSlots {
                first: CarrySlot::Hands,
                second: CarrySlot::Back,
            },
        )
        .unwrap();
    assert_eq!(held(&server, CarrySlot::Back), Some(ids.chest));

    server.on_swap_slots(PLAYER, back_to_hands).unwrap();
    assert_eq!(held(&server, CarrySlot::Hands), Some(ids.chest));
    assert_eq!(held(&server, CarrySlot::Back), None);
    assert_eq!(server.corrections().len(), 1);
}

#[test]
fn test_place_down_frame_past_world_edge_resyncs() {
    let (mut server, ids) = server_with(AllowAll);
    let mut router = CarryRouter::new();
    register_handlers(&mut router);
    server
        .on_pick_up(
            PLAYER,
            PickUp {
                position: CHEST_AT,
                slot: CarrySlot::Hands,
            },
        )
        .unwrap();
    server.collect_sync();

    let bottom = BlockPos::new(0, i32::MIN, 0);
    let frame = serialize_message(
        &PlaceDown {
            slot: CarrySlot::Hands,
            selection: BlockSelection::new(bottom, BlockFace::Up),
        }
        .into_message(),
    )
    .unwrap();
    assert!(router.route_frame(&mut server, PLAYER, &frame).unwrap());

    assert_eq!(server.corrections().len(), 1);
    assert_eq!(
        server.corrections()[0].reason,
        Rejection::Mutation(CarryError::NotPlaceable(bottom))
    );
    assert_eq!(held(&server, CarrySlot::Hands), Some(ids.chest));
    assert_eq!(server.collect_sync().len(), 2);
}

// ---------------------------------------------------------------------------
// Client ↔ server loop
// ---------------------------------------------------------------------------

struct Session {
    server: CarryServer<GridWorld>,
    server_router: CarryRouter<CarryServer<GridWorld>>,
    client: ClientWorld<GridWorld>,
    client_router: CarryRouter<ClientWorld<GridWorld>>,
    controller: InteractionController,
    outbox: Outbox,
}

impl Session {
    fn new(server_permissions: impl BuildPermissions + 'static) -> (Self, Ids) {
        let (server, ids) = server_with(server_permissions);
        let (mirror, _) = terrain();
        let client = ClientWorld::new(mirror, sneaking());

        let mut server_router = CarryRouter::new();
        register_handlers(&mut server_router);
        let mut client_router = CarryRouter::new();
        register_client_handlers(&mut client_router);

        let outbox = Outbox::new();
        let controller = InteractionController::new(InteractionConfig::default(), outbox.clone(), ());
        let session = Self {
            server,
            server_router,
            client,
            client_router,
            controller,
            outbox,
        };
        (session, ids)
    }

    /// Hold interact on `selection` for `seconds`, then release.
    fn hold(&mut self, selection: Option<BlockSelection>, seconds: f32) {
        let input = InputSnapshot::holding(selection);
        let dt = 0.05;
        self.controller
            .on_action(EntityAction::Interact, &mut self.client.local(&AllowAll, input));
        let mut elapsed = 0.0;
        while elapsed < seconds {
            self.controller.on_tick(&mut self.client.local(&AllowAll, input), dt);
            elapsed += dt;
        }
        self.controller
            .on_tick(&mut self.client.local(&AllowAll, InputSnapshot::released()), dt);
        self.client.discard_local_dirt();
    }

    /// Deliver client intents, then the server's sync.
    fn exchange(&mut self) {
        for frame in self.outbox.drain() {
            self.server_router
                .route_frame(&mut self.server, PLAYER, &frame)
                .unwrap();
        }
        for msg in self.server.collect_sync() {
            let frame = serialize_message(&msg).unwrap();
            self.client_router
                .route_frame(&mut self.client, PlayerId(0), &frame)
                .unwrap();
        }
    }

    fn client_held(&self, slot: CarrySlot) -> Option<BlockId> {
        carried(&self.client.entities, self.client.player, slot).map(|c| c.block)
    }
}

#[test]
fn test_accepted_pick_up_agrees_on_both_sides() {
    let (mut session, ids) = Session::new(AllowAll);
    session.hold(Some(BlockSelection::new(CHEST_AT, BlockFace::North)), 1.2);
    assert_eq!(session.client_held(CarrySlot::Hands), Some(ids.chest));
    assert_eq!(session.outbox.len(), 1);

    session.exchange();

    assert_eq!(held(&session.server, CarrySlot::Hands), Some(ids.chest));
    assert_eq!(session.client_held(CarrySlot::Hands), Some(ids.chest));
    assert_eq!(session.server.blocks().block_at(CHEST_AT), BlockId::AIR);
    assert_eq!(session.client.blocks.block_at(CHEST_AT), BlockId::AIR);
    assert!(session.server.corrections().is_empty());
}

#[test]
fn test_rejected_pick_up_is_rolled_back_by_sync() {
    let claim = ProtectedArea::new(BlockPos::new(-2, 0, -2), BlockPos::new(2, 3, 2), [PlayerId(99)]);
    let (mut session, ids) = Session::new(claim);

    // The client doesn't know about the claim and predicts success.
    session.hold(Some(BlockSelection::new(CHEST_AT, BlockFace::North)), 1.2);
    assert_eq!(session.client_held(CarrySlot::Hands), Some(ids.chest));
    assert_eq!(session.client.blocks.block_at(CHEST_AT), BlockId::AIR);

    session.exchange();

    assert_eq!(session.server.corrections().len(), 1);
    assert_eq!(session.client_held(CarrySlot::Hands), None);
    assert_eq!(session.client.blocks.block_at(CHEST_AT), ids.chest);
}

#[test]
fn test_full_round_trip_through_the_back() {
    let (mut session, ids) = Session::new(AllowAll);
    session.hold(Some(BlockSelection::new(CHEST_AT, BlockFace::North)), 1.2);
    session.exchange();

    session.hold(None, 1.6);
    session.exchange();
    assert_eq!(held(&session.server, CarrySlot::Back), Some(ids.chest));
    assert_eq!(session.client_held(CarrySlot::Back), Some(ids.chest));

    session.hold(None, 1.6);
    session.exchange();
    assert_eq!(held(&session.server, CarrySlot::Hands), Some(ids.chest));

    let target = BlockSelection::new(BlockPos::new(0, 0, 3), BlockFace::Up);
    session.hold(Some(target), 0.9);
    session.exchange();

    let placed = BlockPos::new(0, 1, 3);
    assert_eq!(session.server.blocks().block_at(placed), ids.chest);
    assert_eq!(session.client.blocks.block_at(placed), ids.chest);
    for slot in CarrySlot::ALL {
        assert_eq!(held(&session.server, slot), None);
        assert_eq!(session.client_held(slot), None);
    }
    assert!(session.server.corrections().is_empty());
}
