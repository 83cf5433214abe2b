//! Wall and ground detection feeding the wall-run and jetpack abilities.

use glam::Vec3;

use crate::collision::GeometryQuery;

/// How far along the hit normal the classification line is extended.
const SIDE_LINE_LENGTH: f32 = 2000.0;

/// Outcome of a probe around the agent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HitResult {
    /// Something blocking was found.
    pub blocking: bool,
    /// Impact point (meaningless unless `blocking`).
    pub point: Vec3,
    /// Outward surface normal (meaningless unless `blocking`).
    pub normal: Vec3,
    /// Fraction of the query travelled before the hit.
    pub travel_fraction: f32,
}

/// Geometry queries on behalf of one agent.
pub struct WallDetector<'a, G: GeometryQuery + ?Sized> {
    geometry: &'a G,
}

impl<'a, G: GeometryQuery + ?Sized> WallDetector<'a, G> {
    /// Wraps a geometry view that already excludes the querying agent.
    pub fn new(geometry: &'a G) -> Self {
        Self { geometry }
    }

    /// Sphere overlap around the agent, used to decide wall-run continuation.
    pub fn probe_around(&self, position: Vec3, radius: f32) -> HitResult {
        match self.geometry.overlap_sphere(position, radius) {
            Some(hit) => HitResult {
                blocking: true,
                point: hit.point,
                normal: hit.normal,
                travel_fraction: hit.travel_fraction,
            },
            None => HitResult::default(),
        }
    }

    /// Downward ray below the agent's origin.
    pub fn probe_ground(&self, origin: Vec3, distance: f32) -> bool {
        self.geometry.trace_down(origin, distance)
    }

    /// Which side of the wall's normal line the agent stands on.
    ///
    /// Returns `None` for a non-blocking hit.
    pub fn hit_side(&self, hit: &HitResult, position: Vec3) -> Option<f32> {
        hit.blocking.then(|| {
            classify_hit_side(hit.point, hit.point + hit.normal * SIDE_LINE_LENGTH, position)
        })
    }
}

/// 2-D cross product, in the horizontal X/Z plane, of `point` against the
/// line `line_start → line_end`.
///
/// Only the sign is meaningful: the same side always yields the same sign,
/// and zero means the point lies on the line.
pub fn classify_hit_side(line_start: Vec3, line_end: Vec3, point: Vec3) -> f32 {
    (point.x - line_start.x) * (line_end.z - line_start.z)
        - (point.z - line_start.z) * (line_end.x - line_start.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::SurfaceHit;

    /// A single wall plane at x = 1 facing -X.
    struct OneWall;

    impl GeometryQuery for OneWall {
        fn overlap_sphere(&self, center: Vec3, radius: f32) -> Option<SurfaceHit> {
            let distance = 1.0 - center.x;
            (distance.abs() <= radius).then(|| SurfaceHit {
                point: Vec3::new(1.0, center.y, center.z),
                normal: Vec3::NEG_X,
                travel_fraction: 0.0,
            })
        }

        fn trace_down(&self, origin: Vec3, distance: f32) -> bool {
            origin.y <= distance
        }
    }

    #[test]
    fn test_probe_around_reports_blocking_hit() {
        let detector = WallDetector::new(&OneWall);
        let hit = detector.probe_around(Vec3::new(0.5, 1.0, 0.0), 0.8);
        assert!(hit.blocking);
        assert_eq!(hit.normal, Vec3::NEG_X);
        assert_eq!(hit.point.x, 1.0);
    }

    #[test]
    fn test_probe_around_misses_far_wall() {
        let detector = WallDetector::new(&OneWall);
        let hit = detector.probe_around(Vec3::new(-5.0, 1.0, 0.0), 0.8);
        assert!(!hit.blocking);
        assert_eq!(detector.hit_side(&hit, Vec3::ZERO), None);
    }

    #[test]
    fn test_probe_ground() {
        let detector = WallDetector::new(&OneWall);
        assert!(detector.probe_ground(Vec3::new(0.0, 0.9, 0.0), 1.0));
        assert!(!detector.probe_ground(Vec3::new(0.0, 4.0, 0.0), 1.0));
    }

    #[test]
    fn test_classify_sign_is_consistent_per_side() {
        let start = Vec3::ZERO;
        let end = Vec3::new(0.0, 0.0, 10.0);
        let left = classify_hit_side(start, end, Vec3::new(3.0, 0.0, 2.0));
        let further_left = classify_hit_side(start, end, Vec3::new(50.0, 7.0, -4.0));
        let right = classify_hit_side(start, end, Vec3::new(-3.0, 0.0, 2.0));
        assert!(left > 0.0 && further_left > 0.0);
        assert!(right < 0.0);
        assert_eq!(classify_hit_side(start, end, Vec3::new(0.0, 5.0, 4.0)), 0.0);
    }

    #[test]
    fn test_hit_side_ignores_height() {
        let hit = HitResult {
            blocking: true,
            point: Vec3::new(1.0, 0.0, 0.0),
            normal: Vec3::NEG_X,
            travel_fraction: 0.0,
        };
        let detector = WallDetector::new(&OneWall);
        let low = detector.hit_side(&hit, Vec3::new(0.5, 0.0, 1.0)).unwrap();
        let high = detector.hit_side(&hit, Vec3::new(0.5, 9.0, 1.0)).unwrap();
        assert_eq!(low.signum(), high.signum());
    }
}
