//! Immutable per-agent tuning derived from [`Config`].

use strider_config::{Config, FuelConfig, JetpackThrust, TeleportConfig, WallRunConfig};

use crate::curve::ResponseCurve;
use crate::kinematics::SpeedModifiers;

/// Jetpack thrust integration model.
#[derive(Debug, Clone, PartialEq)]
pub enum ThrustModel {
    /// `velocity.y` is the curve value at the accumulated thrust time.
    Curve {
        curve: ResponseCurve,
        scale_by_delta: bool,
    },
    /// Constant acceleration, clamped to the max speed.
    Direct { acceleration: f32 },
}

/// Movement and ability tuning shared by every agent built from one config.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementTuning {
    pub gravity: f32,
    pub walk_speed: f32,
    pub targeting_speed_modifier: f32,
    pub running_speed_modifier: f32,
    pub teleport: TeleportConfig,
    pub jetpack_max_speed: f32,
    pub thrust: ThrustModel,
    pub fuel: FuelConfig,
    pub land_on_ground_probe: bool,
    pub ground_check_distance: f32,
    pub wall_run: WallRunConfig,
}

impl MovementTuning {
    pub fn from_config(config: &Config) -> Self {
        let thrust = match &config.jetpack.thrust {
            JetpackThrust::Curve {
                keys,
                scale_by_delta,
            } => ThrustModel::Curve {
                curve: ResponseCurve::new(keys.clone()),
                scale_by_delta: *scale_by_delta,
            },
            JetpackThrust::Direct { acceleration } => ThrustModel::Direct {
                acceleration: *acceleration,
            },
        };
        Self {
            gravity: config.movement.gravity,
            walk_speed: config.movement.walk_speed,
            targeting_speed_modifier: config.movement.targeting_speed_modifier,
            running_speed_modifier: config.movement.running_speed_modifier,
            teleport: config.teleport.clone(),
            jetpack_max_speed: config.jetpack.max_speed,
            thrust,
            fuel: config.jetpack.fuel.clone(),
            land_on_ground_probe: config.jetpack.land_on_ground_probe,
            ground_check_distance: config.jetpack.ground_check_distance,
            wall_run: config.wall_run.clone(),
        }
    }

    /// Ground speed for the given modifiers. Targeting wins over running.
    pub fn max_speed(&self, modifiers: SpeedModifiers) -> f32 {
        if modifiers.targeting {
            self.walk_speed * self.targeting_speed_modifier
        } else if modifiers.running {
            self.walk_speed * self.running_speed_modifier
        } else {
            self.walk_speed
        }
    }

    /// `+1` when gravity pulls down (or is zero), `-1` when it pulls up.
    pub fn jet_direction(&self) -> f32 {
        if self.gravity > 0.0 { -1.0 } else { 1.0 }
    }
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
