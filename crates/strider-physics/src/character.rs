//! Capsule characters and static level geometry.

use bevy_ecs::prelude::*;
use rapier3d::control::{CharacterAutostep, CharacterLength, KinematicCharacterController};
use rapier3d::prelude::*;
use tracing::debug;

use crate::PhysicsWorld;

/// Capsule half-height of the cylindrical segment (meters).
pub(crate) const CAPSULE_HALF_HEIGHT: f32 = 0.6;
/// Capsule radius (meters).
pub(crate) const CAPSULE_RADIUS: f32 = 0.3;

/// Rapier handles and controller of one character.
///
/// The body is kinematic position-based: the movement tick decides where it
/// goes and the controller resolves collisions on the way.
#[derive(Component, Clone)]
pub struct CharacterBody {
    pub body_handle: RigidBodyHandle,
    pub collider_handle: ColliderHandle,
    pub controller: KinematicCharacterController,
}

impl CharacterBody {
    pub fn shape(&self) -> Capsule {
        Capsule::new_y(CAPSULE_HALF_HEIGHT, CAPSULE_RADIUS)
    }

    /// Distance from the body origin to the bottom of the capsule.
    pub fn stand_height(&self) -> f32 {
        CAPSULE_HALF_HEIGHT + CAPSULE_RADIUS
    }
}

/// Spawns a kinematic capsule (1.8 m tall, 0.3 m radius) at `position`.
pub fn spawn_character(physics: &mut PhysicsWorld, position: glam::Vec3) -> CharacterBody {
    let body = RigidBodyBuilder::kinematic_position_based()
        .translation(Vector::new(position.x, position.y, position.z))
        .build();
    let body_handle = physics.rigid_body_set.insert(body);

    let collider = ColliderBuilder::capsule_y(CAPSULE_HALF_HEIGHT, CAPSULE_RADIUS)
        .friction(0.0)
        .build();
    let collider_handle =
        physics
            .collider_set
            .insert_with_parent(collider, body_handle, &mut physics.rigid_body_set);

    let controller = KinematicCharacterController {
        max_slope_climb_angle: std::f32::consts::FRAC_PI_4,
        min_slope_slide_angle: std::f32::consts::FRAC_PI_4,
        autostep: Some(CharacterAutostep {
            max_height: CharacterLength::Absolute(0.5),
            min_width: CharacterLength::Absolute(0.3),
            include_dynamic_bodies: false,
        }),
        snap_to_ground: Some(CharacterLength::Absolute(0.2)),
        offset: CharacterLength::Absolute(0.01),
        ..Default::default()
    };

    debug!(?position, "spawned character capsule");
    CharacterBody {
        body_handle,
        collider_handle,
        controller,
    }
}

/// Adds a fixed box centered at `center` with the given half extents.
pub fn add_static_box(
    physics: &mut PhysicsWorld,
    center: glam::Vec3,
    half_extents: glam::Vec3,
) -> ColliderHandle {
    let body = RigidBodyBuilder::fixed()
        .translation(Vector::new(center.x, center.y, center.z))
        .build();
    let handle = physics.rigid_body_set.insert(body);
    let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z).build();
    physics
        .collider_set
        .insert_with_parent(collider, handle, &mut physics.rigid_body_set)
}
