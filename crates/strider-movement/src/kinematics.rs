//! Per-agent kinematic state and network role.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Which copy of an agent this simulation instance holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NetRole {
    /// Offline: locally controlled and authoritative.
    #[default]
    Standalone,
    /// The owning client's predicted copy.
    AutonomousProxy,
    /// The server's copy.
    Authority,
    /// Another client's interpolated copy.
    SimulatedProxy,
}

impl NetRole {
    /// Whether this copy's state is final.
    pub fn has_authority(self) -> bool {
        matches!(self, Self::Standalone | Self::Authority)
    }

    /// Whether input is produced on this machine.
    pub fn is_locally_controlled(self) -> bool {
        matches!(self, Self::Standalone | Self::AutonomousProxy)
    }
}

/// Speed modifiers applied on top of the walk speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpeedModifiers {
    /// Aiming slows the agent down.
    pub targeting: bool,
    /// Sprinting speeds it up.
    pub running: bool,
}

/// One tick of player input.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MoveInput {
    /// Desired horizontal direction, not necessarily normalized.
    pub direction: Vec3,
    /// Facing direction; zero keeps the previous facing.
    pub facing: Vec3,
    pub modifiers: SpeedModifiers,
}

/// Position, velocity and orientation of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Unit horizontal facing.
    pub forward: Vec3,
    /// Last non-zero horizontal input direction (unit length).
    pub last_input: Vec3,
    pub grounded: bool,
    pub modifiers: SpeedModifiers,
}

impl Default for Kinematics {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            forward: Vec3::NEG_Z,
            last_input: Vec3::ZERO,
            grounded: false,
            modifiers: SpeedModifiers::default(),
        }
    }
}

impl Kinematics {
    /// Places an agent at `position`, at rest.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Records the input's facing, direction and modifiers.
    pub fn apply_input(&mut self, input: &MoveInput) {
        let facing = horizontal(input.facing).normalize_or_zero();
        if facing != Vec3::ZERO {
            self.forward = facing;
        }
        let direction = horizontal(input.direction).normalize_or_zero();
        if direction != Vec3::ZERO {
            self.last_input = direction;
        }
        self.modifiers = input.modifiers;
    }

    /// Velocity with the vertical component removed.
    pub fn horizontal_velocity(&self) -> Vec3 {
        horizontal(self.velocity)
    }
}

/// Drops the Y component.
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles() {
        assert!(NetRole::Standalone.has_authority());
        assert!(NetRole::Standalone.is_locally_controlled());
        assert!(NetRole::Authority.has_authority());
        assert!(!NetRole::Authority.is_locally_controlled());
        assert!(!NetRole::AutonomousProxy.has_authority());
        assert!(NetRole::AutonomousProxy.is_locally_controlled());
        assert!(!NetRole::SimulatedProxy.has_authority());
        assert!(!NetRole::SimulatedProxy.is_locally_controlled());
    }

    #[test]
    fn test_apply_input_keeps_last_direction() {
        let mut kin = Kinematics::default();
        kin.apply_input(&MoveInput {
            direction: Vec3::new(3.0, 5.0, 0.0),
            ..Default::default()
        });
        assert_eq!(kin.last_input, Vec3::X);
        assert_eq!(kin.forward, Vec3::NEG_Z);

        kin.apply_input(&MoveInput::default());
        assert_eq!(kin.last_input, Vec3::X);
    }

    #[test]
    fn test_facing_is_flattened() {
        let mut kin = Kinematics::default();
        kin.apply_input(&MoveInput {
            facing: Vec3::new(0.0, -2.0, 4.0),
            ..Default::default()
        });
        assert_eq!(kin.forward, Vec3::Z);
    }
}
