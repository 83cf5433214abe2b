//! The movement component: request handling, mode state machine and
//! per-tick dispatch.

use std::sync::Arc;

use bevy_ecs::prelude::*;
use glam::Vec3;
use tracing::{debug, trace};

use crate::abilities::{self, AbilityContext};
use crate::base;
use crate::collision::MovementSolver;
use crate::effects::{AbilityEffect, EffectSink};
use crate::kinematics::{Kinematics, MoveInput, NetRole, horizontal};
use crate::mode::{CustomMode, MovementMode};
use crate::prediction::{MovementSnapshot, SavedMove};
use crate::request::{AbilityKind, AbilityRequest, AbilityRequestFlags, AbilityRpcSink};
use crate::state::AbilityState;
use crate::tuning::MovementTuning;

/// Movement state of one agent.
#[derive(Component, Debug, Clone)]
pub struct CharacterMovement {
    tuning: Arc<MovementTuning>,
    role: NetRole,
    state: AbilityState,
}

impl CharacterMovement {
    pub fn new(tuning: Arc<MovementTuning>, role: NetRole, position: Vec3) -> Self {
        let state = AbilityState::new(&tuning, Kinematics::at(position));
        Self {
            tuning,
            role,
            state,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn role(&self) -> NetRole {
        self.role
    }

    pub fn set_role(&mut self, role: NetRole) {
        self.role = role;
    }

    pub fn tuning(&self) -> &MovementTuning {
        &self.tuning
    }

    pub fn state(&self) -> &AbilityState {
        &self.state
    }

    pub fn kinematics(&self) -> &Kinematics {
        &self.state.kinematics
    }

    pub fn kinematics_mut(&mut self) -> &mut Kinematics {
        &mut self.state.kinematics
    }

    pub fn mode(&self) -> MovementMode {
        self.state.mode
    }

    pub fn flags(&self) -> AbilityRequestFlags {
        self.state.flags
    }

    /// Whether the ability gate is open.
    pub fn can_use_ability(&self) -> bool {
        self.state.gate.is_open()
    }

    /// Sign of the last wall-run hit side classification.
    pub fn hit_side(&self) -> f32 {
        self.state.wall_run.last_hit_side
    }

    /// Remaining jetpack fuel.
    pub fn fuel(&self) -> f32 {
        self.state.fuel.current()
    }

    pub fn fuel_over(&self) -> bool {
        self.state.fuel.fuel_over()
    }

    pub fn active_effect(&self) -> AbilityEffect {
        self.state.active_effect
    }

    // -----------------------------------------------------------------------
    // Requests
    // -----------------------------------------------------------------------

    pub fn set_teleport(&mut self, active: bool, rpc: &mut dyn AbilityRpcSink) -> bool {
        self.set_ability(AbilityKind::Teleport, active, rpc)
    }

    pub fn set_jetpack(&mut self, active: bool, rpc: &mut dyn AbilityRpcSink) -> bool {
        self.set_ability(AbilityKind::Jetpack, active, rpc)
    }

    pub fn set_wall_run(&mut self, active: bool, rpc: &mut dyn AbilityRpcSink) -> bool {
        self.set_ability(AbilityKind::WallRun, active, rpc)
    }

    /// Input boundary for an ability button.
    ///
    /// A predicting client applies the gated request locally and forwards it
    /// to the authority only if it went through. Returns whether it did.
    pub fn set_ability(
        &mut self,
        kind: AbilityKind,
        active: bool,
        rpc: &mut dyn AbilityRpcSink,
    ) -> bool {
        match self.role {
            NetRole::Standalone | NetRole::Authority => self.handle_request(kind, active),
            NetRole::AutonomousProxy => {
                let accepted = self.handle_request(kind, active);
                if accepted {
                    rpc.send(AbilityRequest { kind, active });
                }
                accepted
            }
            NetRole::SimulatedProxy => {
                trace!(?kind, active, "ability input ignored on simulated proxy");
                false
            }
        }
    }

    /// Gated request; the implementation behind the remote call.
    pub fn handle_request(&mut self, kind: AbilityKind, active: bool) -> bool {
        let controller = abilities::controller(kind);
        if !controller.accepts(&self.state, active) {
            trace!(
                ?kind,
                gate_open = self.state.gate.is_open(),
                fuel_over = self.state.fuel.fuel_over(),
                "ability request rejected"
            );
            return false;
        }
        self.exec(kind, active);
        true
    }

    /// Raw request execution without the gate check.
    pub fn exec(&mut self, kind: AbilityKind, active: bool) {
        let before = self.state.flags;
        abilities::controller(kind).exec(&mut self.state, &self.tuning, active);
        if self.state.flags != before {
            debug!(?kind, active, "ability request executed");
        }
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Advances the agent by one fixed step.
    pub fn tick(
        &mut self,
        input: &MoveInput,
        dt: f32,
        solver: &mut dyn MovementSolver,
        effects: &mut dyn EffectSink,
    ) {
        self.state.kinematics.apply_input(input);
        self.state.run_timers(dt, effects);

        if self.state.flags.wall_run && !self.state.mode.is_custom(CustomMode::WallRun) {
            self.state.wall_run.hold_elapsed += dt;
        }

        let mut ctx = AbilityContext {
            state: &mut self.state,
            tuning: &self.tuning,
            solver: &mut *solver,
            effects: &mut *effects,
            input: horizontal(input.direction).normalize_or_zero(),
        };
        match ctx.state.mode {
            MovementMode::Walking => base::walk_step(&mut ctx, dt),
            MovementMode::Falling => base::fall_step(&mut ctx, dt),
            MovementMode::Custom(id) => match CustomMode::try_from(id) {
                Ok(mode) => Self::phys_custom(&mut ctx, mode, dt),
                Err(err) => debug!(%err, "skipping physics for unknown custom mode"),
            },
        }

        self.on_movement_updated(effects);
    }

    fn phys_custom(ctx: &mut AbilityContext<'_>, mode: CustomMode, dt: f32) {
        abilities::controller_for_mode(mode).phys(ctx, dt);
    }

    /// Promotes the highest-priority pending request into its custom mode.
    fn on_movement_updated(&mut self, effects: &mut dyn EffectSink) {
        let flags = self.state.flags;
        let target = if flags.teleport {
            Some(CustomMode::Teleport)
        } else if flags.jetpack {
            Some(CustomMode::Jetpack)
        } else if flags.wall_run
            && self.state.wall_run.hold_elapsed >= self.tuning.wall_run.hold_threshold_secs
        {
            Some(CustomMode::WallRun)
        } else {
            None
        };

        if let Some(mode) = target {
            if !self.state.mode.is_custom(mode) {
                debug!(?mode, "entering ability mode");
                self.state
                    .set_movement_mode(MovementMode::custom(mode), effects);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Prediction
    // -----------------------------------------------------------------------

    /// Saves the current request flags for a move about to be simulated.
    pub fn capture(&self) -> SavedMove {
        SavedMove {
            flags: self.state.flags,
        }
    }

    /// Re-applies a saved move's flags before re-simulating it.
    ///
    /// Deactivations run first so a lowered flag cannot reopen the gate
    /// after another ability has just taken it.
    pub fn replay(&mut self, saved: &SavedMove) {
        for active in [false, true] {
            for kind in AbilityKind::ALL {
                if saved.flags.get(kind) == active {
                    self.exec(kind, active);
                }
            }
        }
    }

    pub fn snapshot(&self, tick: u64) -> MovementSnapshot {
        MovementSnapshot {
            tick,
            state: self.state.clone(),
        }
    }

    /// Rewinds to an authoritative snapshot.
    pub fn restore(&mut self, snapshot: &MovementSnapshot) {
        self.state = snapshot.state.clone();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[path = "movement_tests.rs"]
mod tests;
