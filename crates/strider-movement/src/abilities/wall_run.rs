//! Time-limited run along an adjacent wall, ending in a launch.

use glam::Vec3;
use tracing::debug;

use super::{Ability, AbilityContext};
use crate::effects::AbilityEffect;
use crate::kinematics::horizontal;
use crate::mode::{CustomMode, MovementMode};
use crate::request::AbilityKind;
use crate::state::AbilityState;
use crate::tuning::MovementTuning;
use crate::wall::WallDetector;

pub struct WallRunAbility;

impl WallRunAbility {
    fn terminate(ctx: &mut AbilityContext<'_>) {
        let attached = ctx.state.wall_run.running_on_wall;
        ctx.state.flags.wall_run = false;
        ctx.state.wall_run.reset();
        ctx.state.enable_ability(&mut *ctx.effects);

        if attached {
            let launch = ctx.tuning.wall_run.launch_velocity;
            let kin = &mut ctx.state.kinematics;
            // Horizontal launch adds to the run velocity; vertical is overridden.
            kin.velocity += kin.last_input * launch;
            kin.velocity.y = launch;
            debug!(velocity = ?kin.velocity, "wall-run launch");
        } else {
            debug!("wall-run ended without a wall");
        }
        ctx.state
            .set_movement_mode(MovementMode::Falling, &mut *ctx.effects);
    }
}

impl Ability for WallRunAbility {
    fn kind(&self) -> AbilityKind {
        AbilityKind::WallRun
    }

    fn exec(&self, state: &mut AbilityState, tuning: &MovementTuning, active: bool) {
        if active {
            if state.flags.wall_run {
                return;
            }
            state.flags.wall_run = true;
            state.gate.close();
            state.wall_run.elapsed = 0.0;
            state.wall_run.hold_elapsed = 0.0;
        } else if state.mode.is_custom(CustomMode::WallRun) {
            // Forced exit on the next physics step.
            state.wall_run.elapsed = tuning.wall_run.max_duration_secs;
        } else if state.flags.wall_run {
            state.flags.wall_run = false;
            state.wall_run.hold_elapsed = 0.0;
            state.gate.open();
        }
    }

    fn phys(&self, ctx: &mut AbilityContext<'_>, dt: f32) {
        let tuning = ctx.tuning;
        let config = &tuning.wall_run;
        ctx.state.wall_run.elapsed += dt;
        if !ctx.state.flags.wall_run || ctx.state.wall_run.elapsed >= config.max_duration_secs {
            Self::terminate(ctx);
            return;
        }

        let position = ctx.state.kinematics.position;
        let detector = WallDetector::new(&*ctx.solver);
        let hit = detector.probe_around(position, config.probe_radius);
        let side = detector.hit_side(&hit, position);
        if !hit.blocking {
            Self::terminate(ctx);
            return;
        }

        let kin = &mut ctx.state.kinematics;
        let mut dir = horizontal(kin.velocity).normalize_or_zero();
        if dir == Vec3::ZERO {
            dir = kin.forward;
        }
        let delta = dir * config.speed * dt;
        let outcome = ctx
            .solver
            .slide_along_surface(position, delta, 1.0 - hit.travel_fraction, hit.normal, dt);
        kin.position = outcome.position;
        kin.velocity = dir * config.speed;
        kin.grounded = outcome.grounded;

        if let Some(side) = side {
            ctx.state.wall_run.last_hit_side = side;
        }
        ctx.state.wall_run.running_on_wall = true;
        ctx.state
            .play_effect(AbilityEffect::WallRun, &mut *ctx.effects);
    }
}
