//! ECS glue: drives every character's movement tick through Rapier.

use bevy_ecs::prelude::*;
use strider_movement::{CharacterMovement, EffectLog, MoveInput};

use crate::PhysicsWorld;
use crate::character::CharacterBody;
use crate::solver::RapierSolver;

/// Fixed simulation step in seconds.
#[derive(Resource, Debug, Clone, Copy)]
pub struct SimTime {
    pub dt: f32,
}

/// Input to apply on the next movement tick.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct MovementIntent(pub MoveInput);

/// Effects reported by a character's abilities, oldest first.
#[derive(Component, Debug, Clone, Default)]
pub struct AbilityEffects(pub EffectLog);

/// Ticks every character once with its current intent.
pub fn ability_movement_system(
    time: Res<SimTime>,
    mut physics: ResMut<PhysicsWorld>,
    mut characters: Query<(
        &mut CharacterMovement,
        &CharacterBody,
        &MovementIntent,
        Option<&mut AbilityEffects>,
    )>,
) {
    for (mut movement, body, intent, effects) in characters.iter_mut() {
        let mut solver = RapierSolver::new(&mut physics, body);
        match effects {
            Some(mut effects) => movement.tick(&intent.0, time.dt, &mut solver, &mut effects.0),
            None => movement.tick(&intent.0, time.dt, &mut solver, &mut ()),
        }
    }
}
