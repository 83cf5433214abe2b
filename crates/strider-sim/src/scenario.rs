//! Scripted client/authority session over a delayed in-process link.
//!
//! One predicting client and one authority each own a Rapier world with the
//! same level: a floor and a long wall parallel to the spawn's facing. The
//! client plays a fixed input timeline, sends its moves and ability requests
//! upstream, and reconciles against the snapshots coming back.

use std::sync::Arc;

use glam::Vec3;
use strider_config::Config;
use strider_movement::{
    AbilityKind, CharacterMovement, EffectLog, MoveInput, MovementTuning, NetRole,
};
use strider_net::{
    AbilityCallError, AbilityUplink, AuthoritativeWorld, ClientMessage, MoveBuffer, RpcChannel,
    ServerMessage, WireError, predict_move, reconcile,
};
use strider_physics::{CharacterBody, PhysicsWorld, RapierSolver, add_static_box, spawn_character};
use tracing::{debug, info, warn};

/// The only connected player.
pub const PLAYER_ID: u64 = 1;

/// Where the character starts, standing on the floor.
const SPAWN: Vec3 = Vec3::new(0.0, 0.9, 0.0);

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cue {
    Press(AbilityKind),
    Release(AbilityKind),
    /// New movement direction; the facing stays down the corridor.
    Steer(Vec3),
    /// Displacement applied by the authority only.
    Shove(Vec3),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptedEvent {
    pub at_secs: f32,
    pub cue: Cue,
}

fn at(at_secs: f32, cue: Cue) -> ScriptedEvent {
    ScriptedEvent { at_secs, cue }
}

/// Jetpack burst, teleport, a wall-run held past its duration, then a shove
/// the client cannot predict.
pub fn default_timeline() -> Vec<ScriptedEvent> {
    vec![
        at(0.5, Cue::Steer(Vec3::NEG_Z)),
        at(0.5, Cue::Press(AbilityKind::Jetpack)),
        at(1.5, Cue::Release(AbilityKind::Jetpack)),
        at(3.0, Cue::Press(AbilityKind::Teleport)),
        at(3.1, Cue::Release(AbilityKind::Teleport)),
        at(4.5, Cue::Steer(Vec3::new(0.5, 0.0, -1.0))),
        at(4.5, Cue::Press(AbilityKind::WallRun)),
        at(7.0, Cue::Release(AbilityKind::WallRun)),
        at(7.0, Cue::Steer(Vec3::NEG_Z)),
        at(8.0, Cue::Shove(Vec3::new(-0.5, 0.0, 0.0))),
        at(9.0, Cue::Steer(Vec3::ZERO)),
    ]
}

// ---------------------------------------------------------------------------
// Errors and stats
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    Call(#[from] AbilityCallError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimStats {
    pub ticks: u64,
    pub snapshots: u32,
    pub corrections: u32,
    pub max_position_error: f32,
    pub rejected_requests: u32,
}

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/// Floor with its top at `y = 0` and a 4 m high wall whose face is at
/// `x = wall_distance`, running along the z axis.
pub fn build_level(gravity: f32, dt: f32, wall_distance: f32) -> PhysicsWorld {
    let mut physics = PhysicsWorld::new(gravity, dt);
    add_static_box(&mut physics, Vec3::new(0.0, -0.5, 0.0), Vec3::new(100.0, 0.5, 100.0));
    add_static_box(
        &mut physics,
        Vec3::new(wall_distance + 0.5, 2.0, -40.0),
        Vec3::new(0.5, 2.0, 60.0),
    );
    physics.step();
    physics
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

struct Client {
    physics: PhysicsWorld,
    body: CharacterBody,
    movement: CharacterMovement,
    buffer: MoveBuffer,
    effects: EffectLog,
    input: MoveInput,
}

pub struct Simulation {
    dt: f32,
    tick_rate: u32,
    snapshot_interval: u64,
    tolerance: f32,
    timeline: Vec<ScriptedEvent>,
    client: Client,
    server: AuthoritativeWorld,
    uplink: RpcChannel<ClientMessage>,
    downlink: RpcChannel<ServerMessage>,
    tick: u64,
    stats: SimStats,
}

impl Simulation {
    pub fn new(config: &Config, timeline: Vec<ScriptedEvent>) -> Self {
        let dt = config.tick_seconds();
        let gravity = config.movement.gravity;
        let wall = config.sim.wall_distance;
        let tuning = Arc::new(MovementTuning::from_config(config));

        let mut server = AuthoritativeWorld::new(tuning.clone(), build_level(gravity, dt, wall));
        server.spawn_player(PLAYER_ID, SPAWN);
        server.finish_tick();

        let mut physics = build_level(gravity, dt, wall);
        let body = spawn_character(&mut physics, SPAWN);
        physics.step();
        let client = Client {
            physics,
            body,
            movement: CharacterMovement::new(tuning, NetRole::AutonomousProxy, SPAWN),
            buffer: MoveBuffer::new(config.network.move_buffer_size),
            effects: EffectLog::default(),
            input: MoveInput {
                facing: Vec3::NEG_Z,
                ..Default::default()
            },
        };

        let latency = config.network.simulated_latency_ticks;
        Self {
            dt,
            tick_rate: config.network.tick_rate,
            snapshot_interval: u64::from(config.network.snapshot_interval_ticks.max(1)),
            tolerance: config.network.position_tolerance,
            timeline,
            client,
            server,
            uplink: RpcChannel::new(latency),
            downlink: RpcChannel::new(latency),
            tick: 0,
            stats: SimStats::default(),
        }
    }

    pub fn stats(&self) -> SimStats {
        self.stats
    }

    pub fn client_movement(&self) -> &CharacterMovement {
        &self.client.movement
    }

    pub fn server(&self) -> &AuthoritativeWorld {
        &self.server
    }

    /// Cues scheduled for `tick`.
    fn cues_at(&self, tick: u64) -> Vec<Cue> {
        let rate = self.tick_rate as f32;
        self.timeline
            .iter()
            .filter(|event| (event.at_secs * rate).round() as u64 == tick)
            .map(|event| event.cue)
            .collect()
    }

    /// Runs one client tick, one authority tick and the link in between.
    pub fn step(&mut self) -> Result<(), SimError> {
        self.tick += 1;
        let cues = self.cues_at(self.tick);

        self.client_input(&cues);
        self.client_predict()?;
        self.server_tick(&cues)?;
        self.client_reconcile()?;

        self.uplink.advance();
        self.downlink.advance();
        self.stats.ticks = self.tick;
        Ok(())
    }

    fn client_input(&mut self, cues: &[Cue]) {
        for cue in cues {
            let (kind, active) = match *cue {
                Cue::Press(kind) => (kind, true),
                Cue::Release(kind) => (kind, false),
                Cue::Steer(direction) => {
                    self.client.input.direction = direction;
                    continue;
                }
                Cue::Shove(_) => continue,
            };
            let mut rpc = AbilityUplink {
                player_id: PLAYER_ID,
                channel: &mut self.uplink,
            };
            if self.client.movement.set_ability(kind, active, &mut rpc) {
                info!(tick = self.tick, ?kind, active, "ability input");
            } else {
                self.stats.rejected_requests += 1;
                debug!(tick = self.tick, ?kind, active, "ability input rejected");
            }
        }
    }

    fn client_predict(&mut self) -> Result<(), SimError> {
        let client = &mut self.client;
        let played = client.effects.played.len();
        let step = {
            let mut solver = RapierSolver::new(&mut client.physics, &client.body);
            predict_move(
                &mut client.movement,
                self.tick,
                client.input,
                self.dt,
                &mut solver,
                &mut client.effects,
                &mut client.buffer,
            )
        };
        client.physics.step();

        for effect in &client.effects.played[played..] {
            debug!(tick = self.tick, ?effect, "effect");
        }
        self.uplink.send(&ClientMessage::Move {
            player_id: PLAYER_ID,
            step,
        })?;
        Ok(())
    }

    fn server_tick(&mut self, cues: &[Cue]) -> Result<(), SimError> {
        while let Some(message) = self.uplink.poll() {
            let message = message?;
            if let Err(err) = self.server.handle_message(&message) {
                warn!(%err, "dropping client message");
            }
        }

        for cue in cues {
            if let Cue::Shove(offset) = *cue {
                let mut movement = self.server.movement_mut(PLAYER_ID)?;
                movement.kinematics_mut().position += offset;
                info!(tick = self.tick, ?offset, "authority shoved the player");
            }
        }

        if self.tick % self.snapshot_interval == 0 {
            let snapshot = self.server.snapshot(PLAYER_ID)?;
            // Nothing to confirm before the first move has arrived.
            if snapshot.tick > 0 {
                self.downlink.send(&ServerMessage::Snapshot {
                    player_id: PLAYER_ID,
                    snapshot,
                })?;
            }
        }
        self.server.finish_tick();
        Ok(())
    }

    fn client_reconcile(&mut self) -> Result<(), SimError> {
        while let Some(message) = self.downlink.poll() {
            let ServerMessage::Snapshot { snapshot, .. } = message?;
            self.stats.snapshots += 1;

            let client = &mut self.client;
            let mut solver = RapierSolver::new(&mut client.physics, &client.body);
            let result = reconcile(
                &snapshot,
                &mut client.buffer,
                &mut client.movement,
                &mut solver,
                self.tolerance,
            );
            if result.corrected {
                self.stats.corrections += 1;
                self.stats.max_position_error =
                    self.stats.max_position_error.max(result.position_error);
            }
        }
        Ok(())
    }

    /// Logs where both sides ended up.
    pub fn report(&self) {
        let client = self.client.movement.kinematics();
        match self.server.movement(PLAYER_ID) {
            Ok(server) => info!(
                ticks = self.stats.ticks,
                client = ?client.position,
                server = ?server.kinematics().position,
                client_mode = ?self.client.movement.mode(),
                server_mode = ?server.mode(),
                "final state"
            ),
            Err(err) => warn!(%err, "authority lost the player"),
        }
        info!(
            snapshots = self.stats.snapshots,
            corrections = self.stats.corrections,
            max_position_error = self.stats.max_position_error,
            rejected_requests = self.stats.rejected_requests,
            uplink_bytes = self.uplink.bytes_sent(),
            downlink_bytes = self.downlink.bytes_sent(),
            effects = self.client.effects.played.len(),
            "session summary"
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use strider_movement::AbilityEffect;

    use super::*;

    fn run(config: &Config, timeline: Vec<ScriptedEvent>, ticks: u64) -> Simulation {
        let mut sim = Simulation::new(config, timeline);
        for _ in 0..ticks {
            sim.step().unwrap();
        }
        sim
    }

    #[test]
    fn test_idle_session_needs_no_correction() {
        let sim = run(&Config::default(), Vec::new(), 120);
        let stats = sim.stats();
        assert_eq!(stats.ticks, 120);
        assert!(stats.snapshots > 10);
        assert_eq!(stats.corrections, 0);
    }

    #[test]
    fn test_jetpack_burst_stays_in_sync() {
        let timeline = vec![
            at(0.25, Cue::Press(AbilityKind::Jetpack)),
            at(0.75, Cue::Release(AbilityKind::Jetpack)),
        ];
        let sim = run(&Config::default(), timeline, 180);
        assert_eq!(sim.stats().corrections, 0);
        assert_eq!(
            sim.client.effects.played.first(),
            Some(&AbilityEffect::Jetpack)
        );
        let client = sim.client_movement().kinematics().position;
        let server = sim.server().movement(PLAYER_ID).unwrap().kinematics().position;
        assert!(client.distance(server) < 0.01);
    }

    #[test]
    fn test_shove_is_corrected_and_converges() {
        let timeline = vec![at(0.5, Cue::Shove(Vec3::new(-1.0, 0.0, 0.0)))];
        let sim = run(&Config::default(), timeline, 120);
        let stats = sim.stats();
        assert!(stats.corrections >= 1);
        assert!(stats.max_position_error > 0.5);

        let client = sim.client_movement().kinematics().position;
        let server = sim.server().movement(PLAYER_ID).unwrap().kinematics().position;
        assert!((client.x - server.x).abs() < 0.01, "{client:?} vs {server:?}");
    }

    #[test]
    fn test_gate_rejects_overlapping_ability() {
        let timeline = vec![
            at(0.25, Cue::Press(AbilityKind::Jetpack)),
            at(0.5, Cue::Press(AbilityKind::Teleport)),
        ];
        let sim = run(&Config::default(), timeline, 60);
        assert_eq!(sim.stats().rejected_requests, 1);
    }

    #[test]
    fn test_default_timeline_runs() {
        let sim = run(&Config::default(), default_timeline(), 600);
        assert_eq!(sim.stats().ticks, 600);
        assert!(sim.stats().corrections >= 1);
        assert!(
            sim.client
                .effects
                .played
                .contains(&AbilityEffect::Teleport)
        );
    }
}
