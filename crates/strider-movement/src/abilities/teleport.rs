//! Short forward blink with a cooldown.

use glam::Vec3;
use tracing::debug;

use super::{Ability, AbilityContext};
use crate::effects::AbilityEffect;
use crate::mode::MovementMode;
use crate::request::AbilityKind;
use crate::state::AbilityState;
use crate::timers::ScheduledEvent;
use crate::tuning::MovementTuning;

pub struct TeleportAbility;

impl Ability for TeleportAbility {
    fn kind(&self) -> AbilityKind {
        AbilityKind::Teleport
    }

    fn exec(&self, state: &mut AbilityState, _tuning: &MovementTuning, active: bool) {
        if state.flags.teleport == active {
            return;
        }
        state.flags.teleport = active;
        if active {
            state.gate.close();
        } else {
            // Only a teleport that never ran gets here; an executed one has
            // already lowered its flag and waits for the cooldown timer.
            state.gate.open();
        }
    }

    fn phys(&self, ctx: &mut AbilityContext<'_>, _dt: f32) {
        if !ctx.state.flags.teleport {
            ctx.state
                .set_movement_mode(MovementMode::Falling, &mut *ctx.effects);
            return;
        }

        let kin = &mut ctx.state.kinematics;
        let destination = kin.position + kin.forward * ctx.tuning.teleport.distance;
        match ctx.solver.relocate(kin.position, destination) {
            Some(position) => kin.position = position,
            None => debug!(?destination, "teleport destination blocked, staying put"),
        }
        kin.velocity = Vec3::new(0.0, kin.velocity.y, 0.0);

        ctx.state
            .play_effect(AbilityEffect::Teleport, &mut *ctx.effects);
        ctx.state.flags.teleport = false;
        ctx.state
            .set_movement_mode(MovementMode::Walking, &mut *ctx.effects);
        ctx.state.timers.schedule_once(
            ScheduledEvent::EnableAbility,
            ctx.tuning.teleport.cooldown_secs,
        );
        debug!(position = ?ctx.state.kinematics.position, "teleported");
    }
}
