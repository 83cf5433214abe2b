//! [`MovementSolver`] over Rapier queries and the kinematic character
//! controller.

use glam::Vec3;
use rapier3d::prelude::*;
use strider_movement::{GeometryQuery, MoveOutcome, MovementSolver, SurfaceHit};

use crate::PhysicsWorld;
use crate::character::CharacterBody;

/// Number of horizontal rays fanned out by [`GeometryQuery::overlap_sphere`].
const PROBE_RAYS: usize = 16;
/// A solid ray starting inside a collider reports an impact at (almost) zero.
const INSIDE_EPSILON: f32 = 1e-4;

fn to_vector(v: Vec3) -> Vector {
    Vector::new(v.x, v.y, v.z)
}

/// Per-character view of the physics world; queries exclude the character.
pub struct RapierSolver<'a> {
    physics: &'a mut PhysicsWorld,
    character: &'a CharacterBody,
}

impl<'a> RapierSolver<'a> {
    pub fn new(physics: &'a mut PhysicsWorld, character: &'a CharacterBody) -> Self {
        Self { physics, character }
    }

    fn filter(&self) -> QueryFilter<'static> {
        QueryFilter::new().exclude_rigid_body(self.character.body_handle)
    }

    fn place_body(&mut self, position: Vec3) {
        let body = &mut self.physics.rigid_body_set[self.character.body_handle];
        body.set_translation(to_vector(position), true);
        body.set_next_kinematic_translation(to_vector(position));
    }
}

impl GeometryQuery for RapierSolver<'_> {
    /// Approximated by a horizontal fan of rays of length `radius`, which
    /// finds walls around the character but never the floor under it.
    fn overlap_sphere(&self, center: Vec3, radius: f32) -> Option<SurfaceHit> {
        let query_pipeline = self.physics.broad_phase.as_query_pipeline(
            self.physics.narrow_phase.query_dispatcher(),
            &self.physics.rigid_body_set,
            &self.physics.collider_set,
            self.filter(),
        );

        let mut best: Option<(f32, SurfaceHit)> = None;
        for i in 0..PROBE_RAYS {
            let angle = i as f32 * std::f32::consts::TAU / PROBE_RAYS as f32;
            let dir = Vec3::new(angle.cos(), 0.0, angle.sin());
            let ray = Ray::new(to_vector(center), to_vector(dir));
            let Some((_, hit)) = query_pipeline.cast_ray_and_get_normal(&ray, radius, true) else {
                continue;
            };
            let toi = hit.time_of_impact;
            if best.as_ref().is_some_and(|(closest, _)| *closest <= toi) {
                continue;
            }
            let normal = Vec3::new(hit.normal.x, 0.0, hit.normal.z).normalize_or_zero();
            best = Some((
                toi,
                SurfaceHit {
                    point: center + dir * toi,
                    normal,
                    travel_fraction: 0.0,
                },
            ));
        }
        best.map(|(_, hit)| hit)
    }

    fn trace_down(&self, origin: Vec3, distance: f32) -> bool {
        let query_pipeline = self.physics.broad_phase.as_query_pipeline(
            self.physics.narrow_phase.query_dispatcher(),
            &self.physics.rigid_body_set,
            &self.physics.collider_set,
            self.filter(),
        );
        let ray = Ray::new(to_vector(origin), Vector::new(0.0, -1.0, 0.0));
        query_pipeline.cast_ray(&ray, distance, true).is_some()
    }
}

impl MovementSolver for RapierSolver<'_> {
    fn move_and_slide(&mut self, from: Vec3, delta: Vec3, dt: f32) -> MoveOutcome {
        let handle = self.character.body_handle;
        self.physics.rigid_body_set[handle].set_translation(to_vector(from), true);

        let corrected = {
            let query_pipeline = self.physics.broad_phase.as_query_pipeline(
                self.physics.narrow_phase.query_dispatcher(),
                &self.physics.rigid_body_set,
                &self.physics.collider_set,
                self.filter(),
            );
            let body_pos = self.physics.rigid_body_set[handle].position();
            self.character.controller.move_shape(
                dt,
                &query_pipeline,
                &self.character.shape(),
                body_pos,
                to_vector(delta),
                |_| {},
            )
        };

        let moved = corrected.translation;
        let position = from + Vec3::new(moved.x, moved.y, moved.z);
        self.place_body(position);
        MoveOutcome {
            position,
            grounded: corrected.grounded,
        }
    }

    fn relocate(&mut self, _from: Vec3, to: Vec3) -> Option<Vec3> {
        let blocked = {
            let query_pipeline = self.physics.broad_phase.as_query_pipeline(
                self.physics.narrow_phase.query_dispatcher(),
                &self.physics.rigid_body_set,
                &self.physics.collider_set,
                self.filter(),
            );
            let ray = Ray::new(to_vector(to), Vector::new(0.0, -1.0, 0.0));
            query_pipeline
                .cast_ray(&ray, self.character.stand_height(), true)
                .is_some_and(|(_, toi)| toi <= INSIDE_EPSILON)
        };
        if blocked {
            return None;
        }
        self.place_body(to);
        Some(to)
    }
}
