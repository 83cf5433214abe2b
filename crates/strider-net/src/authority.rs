//! Server-authoritative world state, ability call validation, and tick
//! scheduling.
//!
//! The authority owns every agent's canonical [`CharacterMovement`]. Clients
//! submit [`ClientMessage`]s; ability requests go through
//! [`AbilityCallValidator`], the only path that changes ability flags here,
//! and moves only carry input for the authoritative tick.

use std::sync::Arc;

use bevy_ecs::prelude::*;
use glam::Vec3;
use rustc_hash::FxHashMap;
use strider_movement::{
    AbilityRequest, CharacterMovement, MovementSnapshot, MovementTuning, NetRole,
};
use strider_physics::{AbilityEffects, CharacterBody, PhysicsWorld, RapierSolver, spawn_character};
use tracing::{debug, trace};

use crate::wire::{ClientMessage, ClientMove};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default server tick rate in Hz.
pub const SERVER_TICK_RATE: u32 = 60;

// ---------------------------------------------------------------------------
// AbilityCallError
// ---------------------------------------------------------------------------

/// Reasons a client call cannot be applied.
///
/// Ability legality itself is not an error: the gate and fuel checks decide
/// and a rejected request is simply ignored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AbilityCallError {
    /// Player entity not found in the authoritative world.
    #[error("unknown player {0}")]
    UnknownPlayer(u64),
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Component)]
pub struct PlayerId(pub u64);

/// Tick of the last client move the authority simulated for this player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Component)]
pub struct LastProcessedMove(pub u64);

// ---------------------------------------------------------------------------
// AuthoritativeWorld
// ---------------------------------------------------------------------------

/// The server's canonical world. Wraps a Bevy ECS [`World`] holding the
/// [`PhysicsWorld`] resource and one entity per connected player.
pub struct AuthoritativeWorld {
    world: World,
    players: FxHashMap<u64, Entity>,
    tuning: Arc<MovementTuning>,
    tick: u64,
}

impl AuthoritativeWorld {
    /// Creates a world around already-built level geometry.
    pub fn new(tuning: Arc<MovementTuning>, physics: PhysicsWorld) -> Self {
        let mut world = World::new();
        world.insert_resource(physics);
        Self {
            world,
            players: FxHashMap::default(),
            tuning,
            tick: 0,
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Spawns a player's capsule and authoritative movement at `position`.
    pub fn spawn_player(&mut self, player_id: u64, position: Vec3) -> Entity {
        let body = spawn_character(&mut self.world.resource_mut::<PhysicsWorld>(), position);
        let movement = CharacterMovement::new(self.tuning.clone(), NetRole::Authority, position);
        let entity = self
            .world
            .spawn((
                PlayerId(player_id),
                movement,
                body,
                AbilityEffects::default(),
                LastProcessedMove::default(),
            ))
            .id();
        self.players.insert(player_id, entity);
        debug!(player_id, ?position, "player spawned");
        entity
    }

    /// Removes a player. Returns whether it existed.
    pub fn despawn_player(&mut self, player_id: u64) -> bool {
        let Some(entity) = self.players.remove(&player_id) else {
            return false;
        };
        if let Some(body) = self.world.get::<CharacterBody>(entity).cloned() {
            let mut physics = self.world.resource_mut::<PhysicsWorld>();
            let physics = &mut *physics;
            physics.rigid_body_set.remove(
                body.body_handle,
                &mut physics.island_manager,
                &mut physics.collider_set,
                &mut physics.impulse_joint_set,
                &mut physics.multibody_joint_set,
                true,
            );
        }
        self.world.despawn(entity)
    }

    pub fn entity(&self, player_id: u64) -> Result<Entity, AbilityCallError> {
        self.players
            .get(&player_id)
            .copied()
            .ok_or(AbilityCallError::UnknownPlayer(player_id))
    }

    pub fn movement(&self, player_id: u64) -> Result<&CharacterMovement, AbilityCallError> {
        let entity = self.entity(player_id)?;
        self.world
            .get::<CharacterMovement>(entity)
            .ok_or(AbilityCallError::UnknownPlayer(player_id))
    }

    pub fn movement_mut(
        &mut self,
        player_id: u64,
    ) -> Result<Mut<'_, CharacterMovement>, AbilityCallError> {
        let entity = self.entity(player_id)?;
        self.world
            .get_mut::<CharacterMovement>(entity)
            .ok_or(AbilityCallError::UnknownPlayer(player_id))
    }

    /// Dispatches one client message.
    pub fn handle_message(&mut self, message: &ClientMessage) -> Result<(), AbilityCallError> {
        match message {
            ClientMessage::Ability { player_id, request } => {
                AbilityCallValidator::validate_and_apply(*player_id, request, self).map(|_| ())
            }
            ClientMessage::Move { player_id, step } => self.apply_move(*player_id, step),
        }
    }

    /// Simulates one client move with the flags the authority already holds.
    pub fn apply_move(
        &mut self,
        player_id: u64,
        step: &ClientMove,
    ) -> Result<(), AbilityCallError> {
        let entity = self.entity(player_id)?;
        self.world
            .resource_scope(|world, mut physics: Mut<PhysicsWorld>| {
                let mut query = world.query::<(
                    &mut CharacterMovement,
                    &CharacterBody,
                    &mut AbilityEffects,
                    &mut LastProcessedMove,
                )>();
                let Ok((mut movement, body, mut effects, mut last)) = query.get_mut(world, entity)
                else {
                    return Err(AbilityCallError::UnknownPlayer(player_id));
                };
                let mut solver = RapierSolver::new(&mut physics, body);
                movement.tick(&step.input, step.dt, &mut solver, &mut effects.0);
                last.0 = step.tick;
                Ok(())
            })?;
        trace!(player_id, tick = step.tick, "move applied");
        Ok(())
    }

    /// Authoritative state after the player's last processed move.
    pub fn snapshot(&self, player_id: u64) -> Result<MovementSnapshot, AbilityCallError> {
        let entity = self.entity(player_id)?;
        let last = self
            .world
            .get::<LastProcessedMove>(entity)
            .copied()
            .unwrap_or_default();
        Ok(self.movement(player_id)?.snapshot(last.0))
    }

    /// Ends the server tick: steps physics and advances the tick counter.
    pub fn finish_tick(&mut self) {
        self.world.resource_mut::<PhysicsWorld>().step();
        self.tick += 1;
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

// ---------------------------------------------------------------------------
// AbilityCallValidator
// ---------------------------------------------------------------------------

/// Server side of `RequestTeleport` / `RequestJetpack` / `RequestWallRun`.
///
/// Only the player's existence is validated here; whether the ability may
/// start is the gate's and fuel pool's decision.
pub struct AbilityCallValidator;

impl AbilityCallValidator {
    pub fn validate(
        player_id: u64,
        world: &AuthoritativeWorld,
    ) -> Result<(), AbilityCallError> {
        world.entity(player_id).map(|_| ())
    }

    /// Validates and runs the gated request. Returns whether it was accepted.
    pub fn validate_and_apply(
        player_id: u64,
        request: &AbilityRequest,
        world: &mut AuthoritativeWorld,
    ) -> Result<bool, AbilityCallError> {
        Self::validate(player_id, world)?;
        let mut movement = world.movement_mut(player_id)?;
        let accepted = movement.handle_request(request.kind, request.active);
        if !accepted {
            trace!(player_id, ?request, "ability call ignored by gate");
        }
        Ok(accepted)
    }
}

// ---------------------------------------------------------------------------
// ServerTickSchedule
// ---------------------------------------------------------------------------

/// Fixed-rate tick scheduler for the simulation loop.
///
/// Accumulates real elapsed time and yields discrete ticks.
pub struct ServerTickSchedule {
    accumulator_secs: f64,
    tick_duration_secs: f64,
    total_ticks: u64,
}

impl ServerTickSchedule {
    /// A schedule at [`SERVER_TICK_RATE`].
    pub fn new() -> Self {
        Self::with_tick_rate(SERVER_TICK_RATE)
    }

    pub fn with_tick_rate(hz: u32) -> Self {
        Self {
            accumulator_secs: 0.0,
            tick_duration_secs: 1.0 / f64::from(hz.max(1)),
            total_ticks: 0,
        }
    }

    /// Accumulates elapsed time and returns the number of ticks to process.
    pub fn accumulate(&mut self, dt_secs: f64) -> u32 {
        self.accumulator_secs += dt_secs;
        let mut ticks = 0u32;
        while self.accumulator_secs >= self.tick_duration_secs {
            self.accumulator_secs -= self.tick_duration_secs;
            self.total_ticks += 1;
            ticks += 1;
        }
        ticks
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    pub fn tick_duration_secs(&self) -> f64 {
        self.tick_duration_secs
    }
}

impl Default for ServerTickSchedule {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[path = "authority_tests.rs"]
mod tests;
