//! Analytic collision world for deterministic ability tests and tools.
//!
//! A flat floor, infinite vertical wall planes and solid boxes. The agent is
//! treated as a sphere of `radius` whose origin stands `stand_height` above
//! the floor. Wall planes only block from their front side.

use glam::Vec3;

use crate::collision::{GeometryQuery, MoveOutcome, MovementSolver, SurfaceHit};

/// Tolerance for "standing on the floor".
const GROUND_EPSILON: f32 = 1e-3;

/// Vertical plane through `point` facing `normal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallPlane {
    pub point: Vec3,
    pub normal: Vec3,
}

impl WallPlane {
    fn signed_distance(&self, p: Vec3) -> f32 {
        (p - self.point).dot(self.normal)
    }
}

/// Axis-aligned solid box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolidBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl SolidBox {
    fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestArena {
    pub floor_height: f32,
    pub radius: f32,
    stand_offset: f32,
    walls: Vec<WallPlane>,
    solids: Vec<SolidBox>,
}

impl TestArena {
    /// An empty floor at `y = 0`.
    pub fn flat() -> Self {
        Self {
            floor_height: 0.0,
            radius: 0.3,
            stand_offset: 0.9,
            walls: Vec::new(),
            solids: Vec::new(),
        }
    }

    /// Adds a wall plane; `normal` is flattened and normalized.
    pub fn with_wall(mut self, point: Vec3, normal: Vec3) -> Self {
        let normal = Vec3::new(normal.x, 0.0, normal.z).normalize_or_zero();
        self.walls.push(WallPlane { point, normal });
        self
    }

    pub fn with_solid(mut self, min: Vec3, max: Vec3) -> Self {
        self.solids.push(SolidBox { min, max });
        self
    }

    /// Origin height of an agent standing on the floor.
    pub fn stand_height(&self) -> f32 {
        self.floor_height + self.stand_offset
    }
}

impl GeometryQuery for TestArena {
    fn overlap_sphere(&self, center: Vec3, radius: f32) -> Option<SurfaceHit> {
        let walls = self.walls.iter().filter_map(|wall| {
            let d = wall.signed_distance(center);
            (d >= 0.0 && d <= radius).then(|| (d, center - wall.normal * d, wall.normal))
        });
        let solids = self.solids.iter().filter_map(|solid| {
            let closest = center.clamp(solid.min, solid.max);
            let offset = center - closest;
            let d = offset.length();
            (d > 0.0 && d <= radius).then(|| (d, closest, offset / d))
        });
        walls
            .chain(solids)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, point, normal)| SurfaceHit {
                point,
                normal,
                travel_fraction: 0.0,
            })
    }

    fn trace_down(&self, origin: Vec3, distance: f32) -> bool {
        let floor_gap = origin.y - self.floor_height;
        if (0.0..=distance).contains(&floor_gap) {
            return true;
        }
        self.solids.iter().any(|solid| {
            let over = origin.x >= solid.min.x
                && origin.x <= solid.max.x
                && origin.z >= solid.min.z
                && origin.z <= solid.max.z;
            let gap = origin.y - solid.max.y;
            over && (0.0..=distance).contains(&gap)
        })
    }
}

impl MovementSolver for TestArena {
    fn move_and_slide(&mut self, from: Vec3, delta: Vec3, _dt: f32) -> MoveOutcome {
        let mut target = from + delta;
        for wall in &self.walls {
            if wall.signed_distance(from) < 0.0 {
                continue;
            }
            let d = wall.signed_distance(target);
            if d < self.radius {
                target += wall.normal * (self.radius - d);
            }
        }

        let stand = self.stand_height();
        if target.y < stand {
            target.y = stand;
        }
        MoveOutcome {
            position: target,
            grounded: target.y <= stand + GROUND_EPSILON,
        }
    }

    fn relocate(&mut self, from: Vec3, to: Vec3) -> Option<Vec3> {
        let behind_wall = self.walls.iter().any(|wall| {
            wall.signed_distance(from) >= 0.0 && wall.signed_distance(to) < self.radius
        });
        if behind_wall || self.solids.iter().any(|solid| solid.contains(to)) {
            return None;
        }
        Some(Vec3::new(to.x, to.y.max(self.stand_height()), to.z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walled() -> TestArena {
        TestArena::flat().with_wall(Vec3::new(1.0, 0.0, 0.0), Vec3::NEG_X)
    }

    #[test]
    fn test_wall_blocks_movement() {
        let mut arena = walled();
        let from = Vec3::new(0.0, 0.9, 0.0);
        let out = arena.move_and_slide(from, Vec3::new(5.0, 0.0, 1.0), 0.1);
        assert!((out.position.x - 0.7).abs() < 1e-5);
        assert_eq!(out.position.z, 1.0);
        assert!(out.grounded);
    }

    #[test]
    fn test_overlap_finds_nearest_surface() {
        let arena = walled()
            .with_solid(Vec3::new(-3.0, 0.0, -1.0), Vec3::new(-2.0, 2.0, 1.0));
        let hit = arena.overlap_sphere(Vec3::new(0.5, 0.9, 0.0), 0.8).unwrap();
        assert_eq!(hit.normal, Vec3::NEG_X);
        let hit = arena.overlap_sphere(Vec3::new(-1.5, 0.9, 0.0), 0.8).unwrap();
        assert_eq!(hit.normal, Vec3::X);
        assert!(arena.overlap_sphere(Vec3::new(0.5, 0.9, 20.0), 0.8).is_some());
        assert!(arena.overlap_sphere(Vec3::new(0.0, 0.9, 20.0), 0.8).is_none());
        assert!(TestArena::flat().overlap_sphere(Vec3::ZERO, 5.0).is_none());
    }

    #[test]
    fn test_relocate_refuses_solids() {
        let mut arena = walled().with_solid(Vec3::new(-6.0, 0.0, -1.0), Vec3::new(-4.0, 3.0, 1.0));
        let from = Vec3::new(0.0, 0.9, 0.0);
        assert_eq!(arena.relocate(from, Vec3::new(5.0, 0.9, 0.0)), None);
        assert_eq!(arena.relocate(from, Vec3::new(-5.0, 0.9, 0.0)), None);
        assert_eq!(
            arena.relocate(from, Vec3::new(0.0, 0.9, -10.0)),
            Some(Vec3::new(0.0, 0.9, -10.0))
        );
    }

    #[test]
    fn test_trace_down() {
        let arena = TestArena::flat()
            .with_solid(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 3.0, 1.0));
        assert!(arena.trace_down(Vec3::new(5.0, 0.9, 0.0), 1.0));
        assert!(!arena.trace_down(Vec3::new(5.0, 3.5, 0.0), 1.0));
        assert!(arena.trace_down(Vec3::new(0.0, 3.5, 0.0), 1.0));
    }
}
