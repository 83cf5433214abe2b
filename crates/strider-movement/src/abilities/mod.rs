//! Special movement abilities.
//!
//! Each ability is a stateless controller. All state lives in the agent's
//! [`AbilityState`]; a controller gets it, the tuning and the collaborators
//! through an [`AbilityContext`] for the duration of one physics step.

mod jetpack;
mod teleport;
mod wall_run;

pub use jetpack::JetpackAbility;
pub use teleport::TeleportAbility;
pub use wall_run::WallRunAbility;

use glam::Vec3;

use crate::collision::MovementSolver;
use crate::effects::EffectSink;
use crate::mode::CustomMode;
use crate::request::AbilityKind;
use crate::state::AbilityState;
use crate::tuning::MovementTuning;

/// Borrowed view of one agent and its collaborators.
pub struct AbilityContext<'a> {
    pub state: &'a mut AbilityState,
    pub tuning: &'a MovementTuning,
    pub solver: &'a mut dyn MovementSolver,
    pub effects: &'a mut dyn EffectSink,
    /// This tick's horizontal input direction, unit length or zero.
    pub input: Vec3,
}

/// Activation protocol and physics of one special ability.
pub trait Ability: Sync {
    fn kind(&self) -> AbilityKind;

    /// Whether a gated request may go through.
    ///
    /// Activation needs the gate open; deactivation is always honoured.
    fn accepts(&self, state: &AbilityState, active: bool) -> bool {
        !active || state.gate.is_open()
    }

    /// Raw flag mutation shared by gated requests and replay. Idempotent.
    fn exec(&self, state: &mut AbilityState, tuning: &MovementTuning, active: bool);

    /// One physics step while the agent is in this ability's custom mode.
    fn phys(&self, ctx: &mut AbilityContext<'_>, dt: f32);
}

static TELEPORT: TeleportAbility = TeleportAbility;
static JETPACK: JetpackAbility = JetpackAbility;
static WALL_RUN: WallRunAbility = WallRunAbility;

/// Controller for an ability.
pub fn controller(kind: AbilityKind) -> &'static dyn Ability {
    match kind {
        AbilityKind::Teleport => &TELEPORT,
        AbilityKind::Jetpack => &JETPACK,
        AbilityKind::WallRun => &WALL_RUN,
    }
}

/// Controller driving a custom sub-mode.
pub fn controller_for_mode(mode: CustomMode) -> &'static dyn Ability {
    match mode {
        CustomMode::Teleport => &TELEPORT,
        CustomMode::Jetpack => &JETPACK,
        CustomMode::WallRun => &WALL_RUN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controllers_match_kinds() {
        for kind in AbilityKind::ALL {
            assert_eq!(controller(kind).kind(), kind);
            assert_eq!(controller_for_mode(kind.mode()).kind(), kind);
        }
    }
}
