//! Rapier-backed collision for the movement abilities.
//!
//! Wraps the Rapier 3D physics engine behind a single [`PhysicsWorld`]
//! resource, spawns capsule characters, and implements the movement
//! collision traits on top of Rapier's kinematic character controller.

mod character;
mod solver;
mod system;

pub use character::{CharacterBody, add_static_box, spawn_character};
pub use solver::RapierSolver;
pub use system::{AbilityEffects, MovementIntent, SimTime, ability_movement_system};

use bevy_ecs::prelude::*;
use rapier3d::prelude::*;

/// Central physics simulation resource owning all Rapier state.
///
/// Systems read via `Res<PhysicsWorld>` for queries or mutate via
/// `ResMut<PhysicsWorld>` to move characters and add geometry.
#[derive(Resource)]
pub struct PhysicsWorld {
    pub gravity: Vector,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    /// Broad-phase collision detection (also provides the query pipeline).
    pub broad_phase: BroadPhaseBvh,
    pub narrow_phase: NarrowPhase,
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
}

impl PhysicsWorld {
    /// Creates a world with gravity `(0, gravity_y, 0)` stepping at `dt`.
    pub fn new(gravity_y: f32, dt: f32) -> Self {
        let integration_parameters = IntegrationParameters {
            dt,
            ..Default::default()
        };

        Self {
            gravity: Vector::new(0.0, gravity_y, 0.0),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
        }
    }

    /// Advances the simulation by one fixed timestep.
    ///
    /// Also refreshes the broad phase, which queries depend on.
    pub fn step(&mut self) {
        self.physics_pipeline.step(
            self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            &(),
            &(),
        );
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(-9.81, 1.0 / 60.0)
    }
}

/// ECS system that steps the physics simulation once per invocation.
pub fn physics_step_system(mut physics: ResMut<PhysicsWorld>) {
    physics.step();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physics_world_initializes() {
        let world = PhysicsWorld::default();
        assert_eq!(world.rigid_body_set.len(), 0);
        assert_eq!(world.collider_set.len(), 0);
        assert_eq!(world.gravity.y, -9.81);
    }

    #[test]
    fn test_timestep_from_tick_rate() {
        let world = PhysicsWorld::new(-9.81, 1.0 / 30.0);
        assert!((world.integration_parameters.dt - 1.0 / 30.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_empty_world_steps_without_error() {
        let mut world = PhysicsWorld::default();
        for _ in 0..100 {
            world.step();
        }
    }
}
