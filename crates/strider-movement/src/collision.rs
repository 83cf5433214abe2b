//! Collision collaborator interfaces.
//!
//! The ability layer never talks to a physics engine directly. Every
//! implementation is a per-agent view: queries implicitly exclude the agent's
//! own body.

use glam::Vec3;

/// Contact reported by a sphere overlap query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// Closest point on the touched surface.
    pub point: Vec3,
    /// Outward surface normal at `point` (unit length).
    pub normal: Vec3,
    /// Fraction of the sweep travelled before contact (0 for an overlap).
    pub travel_fraction: f32,
}

/// Result of moving the agent through the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveOutcome {
    /// Position after collision response.
    pub position: Vec3,
    /// Whether the agent ended the move standing on something.
    pub grounded: bool,
}

/// Read-only geometry queries.
pub trait GeometryQuery {
    /// Closest blocking surface within `radius` of `center`, if any.
    fn overlap_sphere(&self, center: Vec3, radius: f32) -> Option<SurfaceHit>;

    /// Whether a downward ray from `origin` hits something within `distance`.
    fn trace_down(&self, origin: Vec3, distance: f32) -> bool;
}

/// Collision response for the agent's body.
pub trait MovementSolver: GeometryQuery {
    /// Moves by `delta` from `from`, sliding along whatever blocks the way.
    fn move_and_slide(&mut self, from: Vec3, delta: Vec3, dt: f32) -> MoveOutcome;

    /// Moves straight to `to` if the destination is free; `None` if refused.
    fn relocate(&mut self, from: Vec3, to: Vec3) -> Option<Vec3>;

    /// Moves `fraction` of `delta` projected onto the plane of `normal`.
    fn slide_along_surface(
        &mut self,
        from: Vec3,
        delta: Vec3,
        fraction: f32,
        normal: Vec3,
        dt: f32,
    ) -> MoveOutcome {
        let normal = normal.normalize_or_zero();
        let planar = delta - normal * delta.dot(normal);
        self.move_and_slide(from, planar * fraction.clamp(0.0, 1.0), dt)
    }
}
