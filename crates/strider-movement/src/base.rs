//! Minimal walking and falling integration the abilities build on.

use glam::Vec3;

use crate::abilities::AbilityContext;
use crate::collision::MoveOutcome;
use crate::kinematics::horizontal;
use crate::mode::MovementMode;

/// Fraction of the gap to the desired air velocity closed per second.
const AIR_CONTROL: f32 = 2.0;

/// Ground movement: input sets horizontal velocity directly.
pub fn walk_step(ctx: &mut AbilityContext<'_>, dt: f32) {
    let speed = ctx.tuning.max_speed(ctx.state.kinematics.modifiers);
    let kin = &mut ctx.state.kinematics;
    kin.velocity = ctx.input * speed;

    // Press into the ground so that walking off a ledge is noticed.
    let delta = kin.velocity * dt + Vec3::Y * (ctx.tuning.gravity * dt * dt);
    let outcome = ctx.solver.move_and_slide(kin.position, delta, dt);
    kin.position = outcome.position;
    kin.grounded = outcome.grounded;

    if !outcome.grounded {
        ctx.state
            .set_movement_mode(MovementMode::Falling, &mut *ctx.effects);
    }
}

/// Gravity plus limited air control; does not change mode.
pub fn integrate_fall(ctx: &mut AbilityContext<'_>, dt: f32) -> MoveOutcome {
    let speed = ctx.tuning.max_speed(ctx.state.kinematics.modifiers);
    let kin = &mut ctx.state.kinematics;

    if ctx.input != Vec3::ZERO {
        let current = horizontal(kin.velocity);
        let steered = current.lerp(ctx.input * speed, (AIR_CONTROL * dt).min(1.0));
        kin.velocity = Vec3::new(steered.x, kin.velocity.y, steered.z);
    }
    kin.velocity.y += ctx.tuning.gravity * dt;

    let outcome = ctx.solver.move_and_slide(kin.position, kin.velocity * dt, dt);
    kin.position = outcome.position;
    kin.grounded = outcome.grounded;
    outcome
}

/// Airborne movement; lands on contact while moving down.
pub fn fall_step(ctx: &mut AbilityContext<'_>, dt: f32) {
    let outcome = integrate_fall(ctx, dt);
    let kin = &mut ctx.state.kinematics;
    if outcome.grounded && kin.velocity.y * ctx.tuning.jet_direction() <= 0.0 {
        kin.velocity.y = 0.0;
        ctx.state
            .set_movement_mode(MovementMode::Walking, &mut *ctx.effects);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::TestArena;
    use crate::kinematics::Kinematics;
    use crate::state::AbilityState;
    use crate::tuning::MovementTuning;

    fn run<F>(state: &mut AbilityState, arena: &mut TestArena, input: Vec3, ticks: usize, step: F)
    where
        F: Fn(&mut AbilityContext<'_>, f32),
    {
        let tuning = MovementTuning::default();
        for _ in 0..ticks {
            let mut ctx = AbilityContext {
                state: &mut *state,
                tuning: &tuning,
                solver: &mut *arena,
                effects: &mut (),
                input,
            };
            step(&mut ctx, 0.125);
        }
    }

    #[test]
    fn test_walk_moves_at_walk_speed() {
        let mut arena = TestArena::flat();
        let start = Vec3::new(0.0, arena.stand_height(), 0.0);
        let mut state = AbilityState::new(&MovementTuning::default(), Kinematics::at(start));
        state.mode = MovementMode::Walking;
        run(&mut state, &mut arena, Vec3::X, 8, walk_step);
        assert!((state.kinematics.position.x - 5.0).abs() < 1e-4);
        assert_eq!(state.kinematics.position.y, arena.stand_height());
        assert_eq!(state.mode, MovementMode::Walking);
    }

    #[test]
    fn test_fall_lands_on_floor() {
        let mut arena = TestArena::flat();
        let start = Vec3::new(0.0, 5.0, 0.0);
        let mut state = AbilityState::new(&MovementTuning::default(), Kinematics::at(start));
        run(&mut state, &mut arena, Vec3::ZERO, 40, |ctx, dt| {
            if ctx.state.mode == MovementMode::Falling {
                fall_step(ctx, dt);
            }
        });
        assert_eq!(state.mode, MovementMode::Walking);
        assert_eq!(state.kinematics.velocity.y, 0.0);
        assert_eq!(state.kinematics.position.y, arena.stand_height());
    }

    #[test]
    fn test_walking_off_a_ledge_falls() {
        let mut arena = TestArena::flat();
        let start = Vec3::new(0.0, arena.stand_height() + 2.0, 0.0);
        let mut state = AbilityState::new(&MovementTuning::default(), Kinematics::at(start));
        state.mode = MovementMode::Walking;
        run(&mut state, &mut arena, Vec3::ZERO, 1, walk_step);
        assert_eq!(state.mode, MovementMode::Falling);
    }
}
