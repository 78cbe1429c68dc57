//! The scripted session: pick a chest up, sling it onto the back, take it
//! back into the hands and put it down somewhere else.

use carry_client::{
    ClientWorld, EntityAction, InputSnapshot, InteractionController, ProgressRecorder, register_client_handlers,
};
use carry_config::{Config, SlotDefaults};
use carry_model::{Actor, CarriedSlots, CarryEffects};
use carry_net::{CarryRouter, Outbox, serialize_message};
use carry_server::{CarryServer, register_handlers};
use carry_world::{
    AllowAll, BlockAccess, BlockFace, BlockPos, BlockRegistry, BlockSelection, BlockTypeDef, CarryBehavior,
    CarrySlot, GridWorld, PlayerId, RegistryError, SlotSettings,
};
use glam::Vec3;
use tracing::{debug, info, trace, warn};

const PLAYER: PlayerId = PlayerId(1);
/// Sender id stamped on server → client frames.
const SERVER: PlayerId = PlayerId(0);
const CHEST_AT: BlockPos = BlockPos::new(0, 1, 2);
const FLOOR_RADIUS: i32 = 6;

/// Result of one scripted interaction.
#[derive(Debug)]
pub struct PhaseOutcome {
    /// Phase label.
    pub name: &'static str,
    /// Frames ticked while the interaction charged.
    pub frames: u32,
    /// Whether the client completed the interaction and sent its intent.
    pub completed: bool,
}

/// Result of the whole session.
#[derive(Debug)]
pub struct SessionReport {
    /// Phases in play order.
    pub phases: Vec<PhaseOutcome>,
    /// Resyncs the server had to issue.
    pub corrections: usize,
    /// Whether client and server agree on carried state and blocks.
    pub in_sync: bool,
}

impl SessionReport {
    /// Every phase completed without a single correction.
    pub fn succeeded(&self) -> bool {
        self.in_sync && self.corrections == 0 && self.phases.iter().all(|p| p.completed)
    }
}

fn slot_settings(defaults: &SlotDefaults) -> SlotSettings {
    SlotSettings {
        walk_speed_modifier: defaults.walk_speed_modifier,
        animation: defaults.animation.clone(),
    }
}

/// Stone floor, a patch of tall grass and one chest. Identical on both sides.
fn build_world(config: &Config) -> Result<GridWorld, RegistryError> {
    let mut registry = BlockRegistry::new();
    let stone = registry.register(BlockTypeDef::solid("stone"))?;
    let grass = registry.register(BlockTypeDef::replaceable("tallgrass"))?;
    // No delay of its own: the client falls back to the configured default.
    let chest = registry.register(
        BlockTypeDef::solid("chest").orientable().carryable(
            CarryBehavior::new(0.0)
                .with_slot(CarrySlot::Hands, slot_settings(&config.carry.hands))
                .with_slot(CarrySlot::Back, slot_settings(&config.carry.back)),
        ),
    )?;

    let mut world = GridWorld::new(registry);
    world.fill_layer(0, FLOOR_RADIUS, stone);
    world.set_block(BlockPos::new(3, 1, -1), grass);
    world.set_block(CHEST_AT, chest);
    world.take_dirty_blocks();
    Ok(world)
}

fn carrier() -> Actor {
    let mut actor = Actor::new(PLAYER);
    actor.sneaking = true;
    actor.position = Vec3::new(0.5, 1.0, 0.5);
    actor
}

struct Session {
    server: CarryServer<GridWorld>,
    server_router: CarryRouter<CarryServer<GridWorld>>,
    client: ClientWorld<GridWorld>,
    client_router: CarryRouter<ClientWorld<GridWorld>>,
    controller: InteractionController,
    outbox: Outbox,
    progress: ProgressRecorder,
    dt: f32,
    max_frames: u32,
}

impl Session {
    fn new(config: &Config) -> Result<Self, RegistryError> {
        let mut server = CarryServer::new(build_world(config)?, AllowAll);
        server.add_player(carrier());
        server.collect_sync();
        let client = ClientWorld::new(build_world(config)?, carrier());

        let mut server_router = CarryRouter::new();
        register_handlers(&mut server_router);
        let mut client_router = CarryRouter::new();
        register_client_handlers(&mut client_router);
        info!(
            server = server_router.registered_tags().count(),
            client = client_router.registered_tags().count(),
            "{} channel handlers registered",
            carry_net::CHANNEL_NAME
        );

        let outbox = Outbox::new();
        let progress = ProgressRecorder::new();
        let controller = InteractionController::new(config.interaction.clone(), outbox.clone(), progress.clone());

        Ok(Self {
            server,
            server_router,
            client,
            client_router,
            controller,
            outbox,
            progress,
            dt: 1.0 / config.sim.tick_rate.max(1) as f32,
            max_frames: config.sim.max_frames_per_phase,
        })
    }

    /// Press interact on `selection`, hold until the interaction ends, release.
    fn play(&mut self, name: &'static str, selection: Option<BlockSelection>) -> PhaseOutcome {
        let input = InputSnapshot::holding(selection);
        self.controller
            .on_action(EntityAction::Interact, &mut self.client.local(&AllowAll, input));
        let started = !self.controller.state().is_idle();
        if !started {
            warn!(phase = name, "interaction did not start");
        }

        let mut frames = 0;
        while !self.controller.state().is_idle() && frames < self.max_frames {
            self.controller
                .on_tick(&mut self.client.local(&AllowAll, input), self.dt);
            frames += 1;
            if let Some(progress) = self.progress.current() {
                trace!(phase = name, frame = frames, progress, "charging");
            }
        }
        self.controller
            .on_tick(&mut self.client.local(&AllowAll, InputSnapshot::released()), self.dt);
        self.client.discard_local_dirt();

        let completed = started && !self.outbox.is_empty();
        self.exchange();

        let walk = self
            .client
            .entities
            .get::<CarryEffects>(self.client.player)
            .map_or(1.0, CarryEffects::walk_speed_multiplier);
        debug!(phase = name, frames, completed, walk_speed = walk, "phase played");
        PhaseOutcome {
            name,
            frames,
            completed,
        }
    }

    /// Deliver queued intents to the server and its replication back.
    fn exchange(&mut self) {
        for frame in self.outbox.drain() {
            if let Err(e) = self.server_router.route_frame(&mut self.server, PLAYER, &frame) {
                warn!("server dropped malformed frame: {e}");
            }
        }
        for msg in self.server.collect_sync() {
            let frame = match serialize_message(&msg) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!("failed to encode sync message: {e}");
                    continue;
                }
            };
            if let Err(e) = self.client_router.route_frame(&mut self.client, SERVER, &frame) {
                warn!("client dropped malformed frame: {e}");
            }
        }
    }

    fn in_sync(&self) -> bool {
        let server_slots = self
            .server
            .entity(PLAYER)
            .and_then(|entity| self.server.entities().get::<CarriedSlots>(entity));
        let client_slots = self.client.entities.get::<CarriedSlots>(self.client.player);
        if server_slots != client_slots {
            return false;
        }
        (-FLOOR_RADIUS..=FLOOR_RADIUS).all(|x| {
            (-FLOOR_RADIUS..=FLOOR_RADIUS).all(|z| {
                (0..=3).all(|y| {
                    let pos = BlockPos::new(x, y, z);
                    self.server.blocks().block_state(pos) == self.client.blocks.block_state(pos)
                })
            })
        })
    }
}

/// Play the scripted session with `config`.
pub fn run(config: &Config) -> Result<SessionReport, RegistryError> {
    let mut session = Session::new(config)?;
    let script = [
        ("pick up", Some(BlockSelection::new(CHEST_AT, BlockFace::North))),
        ("swap to back", None),
        ("swap to hands", None),
        ("place down", Some(BlockSelection::new(BlockPos::new(3, 1, -1), BlockFace::East))),
    ];
    let phases = script
        .into_iter()
        .map(|(name, selection)| session.play(name, selection))
        .collect();

    let report = SessionReport {
        phases,
        corrections: session.server.corrections().len(),
        in_sync: session.in_sync(),
    };
    if let Some(dropped) = session.server.remove_player(PLAYER) {
        debug!(placed = dropped.placed.len(), lost = dropped.lost.len(), "player left");
    }
    Ok(report)
}
