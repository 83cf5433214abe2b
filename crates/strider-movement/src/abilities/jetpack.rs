//! Fuel-limited vertical thrust.

use tracing::debug;

use super::{Ability, AbilityContext};
use crate::base;
use crate::effects::AbilityEffect;
use crate::fuel::FuelDrain;
use crate::mode::MovementMode;
use crate::request::AbilityKind;
use crate::state::AbilityState;
use crate::tuning::{MovementTuning, ThrustModel};
use crate::wall::WallDetector;

pub struct JetpackAbility;

impl JetpackAbility {
    fn thrust(ctx: &mut AbilityContext<'_>, dt: f32) {
        let jet_dir = ctx.tuning.jet_direction();
        let max_speed = ctx.tuning.jetpack_max_speed;
        let state = &mut *ctx.state;
        match &ctx.tuning.thrust {
            ThrustModel::Curve {
                curve,
                scale_by_delta,
            } => {
                state.jetpack_elapsed += dt * jet_dir;
                let mut vy = curve.sample(state.jetpack_elapsed.abs()) * max_speed * jet_dir;
                if *scale_by_delta {
                    vy *= dt;
                }
                state.kinematics.velocity.y = vy;
            }
            ThrustModel::Direct { acceleration } => {
                let vy = state.kinematics.velocity.y + acceleration * dt * jet_dir;
                state.kinematics.velocity.y = vy.clamp(-max_speed, max_speed);
            }
        }
    }

    /// Flight is over: land if ground is close, otherwise fall.
    fn end_flight(ctx: &mut AbilityContext<'_>, dt: f32) {
        let position = ctx.state.kinematics.position;
        let near_ground = ctx.tuning.land_on_ground_probe
            && WallDetector::new(&*ctx.solver)
                .probe_ground(position, ctx.tuning.ground_check_distance);
        if near_ground {
            ctx.state.kinematics.velocity.y = 0.0;
            ctx.state
                .set_movement_mode(MovementMode::Walking, &mut *ctx.effects);
        } else {
            ctx.state
                .set_movement_mode(MovementMode::Falling, &mut *ctx.effects);
            base::fall_step(ctx, dt);
        }
    }
}

impl Ability for JetpackAbility {
    fn kind(&self) -> AbilityKind {
        AbilityKind::Jetpack
    }

    fn accepts(&self, state: &AbilityState, active: bool) -> bool {
        !active || (state.gate.is_open() && !state.fuel.fuel_over())
    }

    fn exec(&self, state: &mut AbilityState, _tuning: &MovementTuning, active: bool) {
        if state.flags.jetpack == active {
            return;
        }
        if active {
            if state.fuel.fuel_over() {
                return;
            }
            state.flags.jetpack = true;
            state.gate.close();
            state.jetpack_elapsed = 0.0;
            state.fuel.reset_consumption();
            state.stop_fuel_recovery();
        } else {
            state.flags.jetpack = false;
            state.gate.open();
            state.start_fuel_recovery();
        }
    }

    fn phys(&self, ctx: &mut AbilityContext<'_>, dt: f32) {
        if !ctx.state.flags.jetpack {
            Self::end_flight(ctx, dt);
            return;
        }

        if ctx.state.fuel.consume(dt) == FuelDrain::Exhausted {
            debug!("jetpack out of fuel");
            self.exec(&mut *ctx.state, ctx.tuning, false);
            Self::end_flight(ctx, dt);
            return;
        }

        Self::thrust(ctx, dt);
        ctx.state
            .play_effect(AbilityEffect::Jetpack, &mut *ctx.effects);
        base::integrate_fall(ctx, dt);
    }
}
