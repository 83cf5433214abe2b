//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name used inside the config directory.
const CONFIG_FILE: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Base walking/falling settings.
    pub movement: MovementConfig,
    /// Teleport ability tuning.
    pub teleport: TeleportConfig,
    /// Jetpack ability tuning.
    pub jetpack: JetpackConfig,
    /// Wall-run ability tuning.
    pub wall_run: WallRunConfig,
    /// Prediction/authority settings.
    pub network: NetworkConfig,
    /// Headless simulator settings.
    pub sim: SimConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Base movement settings shared by every mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MovementConfig {
    /// Vertical gravity in m/s² (negative = down).
    pub gravity: f32,
    /// Walk speed in m/s before modifiers.
    pub walk_speed: f32,
    /// Multiplier applied while aiming down sights.
    pub targeting_speed_modifier: f32,
    /// Multiplier applied while sprinting.
    pub running_speed_modifier: f32,
}

/// Teleport tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TeleportConfig {
    /// Distance travelled along the facing direction, in meters.
    pub distance: f32,
    /// Seconds before another ability may be requested.
    pub cooldown_secs: f32,
}

/// Jetpack tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct JetpackConfig {
    /// Maximum vertical speed in m/s.
    pub max_speed: f32,
    /// Thrust integration model.
    pub thrust: JetpackThrust,
    /// Fuel accounting.
    pub fuel: FuelConfig,
    /// End released flights on the ground when a ground probe hits.
    pub land_on_ground_probe: bool,
    /// Length of the downward ground probe, in meters.
    pub ground_check_distance: f32,
}

/// How the jetpack turns input into vertical velocity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum JetpackThrust {
    /// Sample a response curve at the accumulated thrust time.
    Curve {
        /// Piecewise-linear keys, sorted by time.
        keys: Vec<CurveKey>,
        /// Treat the curve as acceleration (scale by the tick delta).
        scale_by_delta: bool,
    },
    /// Integrate a constant acceleration, clamped to the max speed.
    Direct {
        /// Acceleration in m/s².
        acceleration: f32,
    },
}

/// A single key of a piecewise-linear response curve.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CurveKey {
    /// Sample time in seconds.
    pub time: f32,
    /// Curve value at `time`.
    pub value: f32,
}

/// Discrete fuel accounting: one quantum per full interval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FuelConfig {
    /// Maximum (and starting) fuel.
    pub capacity: f32,
    /// Fuel removed each consume interval while thrusting.
    pub consume_per_interval: f32,
    /// Length of a consume interval in seconds.
    pub consume_interval_secs: f32,
    /// Fuel restored each recover interval while idle.
    pub recover_per_interval: f32,
    /// Length of a recover interval in seconds.
    pub recover_interval_secs: f32,
}

/// Wall-run tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WallRunConfig {
    /// Radius of the wall probe sphere around the agent, in meters.
    pub probe_radius: f32,
    /// Horizontal running speed along the wall in m/s.
    pub speed: f32,
    /// Maximum wall-run duration in seconds.
    pub max_duration_secs: f32,
    /// Seconds the activation input must be held before the run starts.
    pub hold_threshold_secs: f32,
    /// Launch speed applied when leaving a wall (also the vertical boost).
    pub launch_velocity: f32,
}

/// Prediction and authority settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    /// Simulation ticks per second.
    pub tick_rate: u32,
    /// Maximum number of unacknowledged moves kept by the client.
    pub move_buffer_size: usize,
    /// Ticks between authoritative snapshots.
    pub snapshot_interval_ticks: u32,
    /// One-way latency, in ticks, applied by the simulator transport.
    pub simulated_latency_ticks: u32,
    /// Position error (meters) tolerated before a correction is applied.
    pub position_tolerance: f32,
}

/// Headless simulator settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    /// Number of ticks to simulate.
    pub duration_ticks: u32,
    /// Distance from spawn to the test wall, in meters.
    pub wall_distance: f32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Write JSON logs next to the config file.
    pub file_logging: bool,
}

// --- Default implementations ---

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            gravity: -9.81,
            walk_speed: 5.0,
            targeting_speed_modifier: 0.5,
            running_speed_modifier: 1.5,
        }
    }
}

impl Default for TeleportConfig {
    fn default() -> Self {
        Self {
            distance: 10.0,
            cooldown_secs: 1.0,
        }
    }
}

impl Default for JetpackConfig {
    fn default() -> Self {
        Self {
            max_speed: 6.0,
            thrust: JetpackThrust::default(),
            fuel: FuelConfig::default(),
            land_on_ground_probe: true,
            ground_check_distance: 1.0,
        }
    }
}

impl Default for JetpackThrust {
    fn default() -> Self {
        Self::Curve {
            keys: vec![
                CurveKey {
                    time: 0.0,
                    value: 0.25,
                },
                CurveKey {
                    time: 0.5,
                    value: 1.0,
                },
                CurveKey {
                    time: 3.0,
                    value: 1.0,
                },
            ],
            scale_by_delta: false,
        }
    }
}

impl Default for FuelConfig {
    fn default() -> Self {
        Self {
            capacity: 100.0,
            consume_per_interval: 20.0,
            consume_interval_secs: 0.5,
            recover_per_interval: 10.0,
            recover_interval_secs: 0.5,
        }
    }
}

impl Default for WallRunConfig {
    fn default() -> Self {
        Self {
            probe_radius: 0.8,
            speed: 8.0,
            max_duration_secs: 2.0,
            hold_threshold_secs: 0.25,
            launch_velocity: 6.0,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            move_buffer_size: 128,
            snapshot_interval_ticks: 6,
            simulated_latency_ticks: 4,
            position_tolerance: 0.01,
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            duration_ticks: 600,
            wall_distance: 1.0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            file_logging: false,
        }
    }
}

/// Returns `<platform config dir>/strider`.
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("strider"))
        .ok_or(ConfigError::NoConfigDir)
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            config.validate()?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE), serialized).map_err(ConfigError::WriteError)
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let contents =
            std::fs::read_to_string(config_dir.join(CONFIG_FILE)).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        new_config.validate()?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Rejects values the simulation cannot run with.
    ///
    /// Intervals and rates are divisors or accumulator thresholds, so they
    /// must be strictly positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fuel = &self.jetpack.fuel;
        positive("jetpack.fuel.capacity", fuel.capacity)?;
        positive("jetpack.fuel.consume_interval_secs", fuel.consume_interval_secs)?;
        positive("jetpack.fuel.recover_interval_secs", fuel.recover_interval_secs)?;
        positive("jetpack.max_speed", self.jetpack.max_speed)?;
        positive("wall_run.probe_radius", self.wall_run.probe_radius)?;
        positive("wall_run.max_duration_secs", self.wall_run.max_duration_secs)?;
        if self.teleport.cooldown_secs < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "teleport.cooldown_secs",
                reason: "must not be negative",
            });
        }
        if let JetpackThrust::Curve { keys, .. } = &self.jetpack.thrust {
            if keys.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "jetpack.thrust.keys",
                    reason: "curve needs at least one key",
                });
            }
            if keys.windows(2).any(|pair| pair[1].time < pair[0].time) {
                return Err(ConfigError::InvalidValue {
                    field: "jetpack.thrust.keys",
                    reason: "keys must be sorted by time",
                });
            }
        }
        if self.network.tick_rate == 0 {
            return Err(ConfigError::InvalidValue {
                field: "network.tick_rate",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Fixed simulation step in seconds.
    pub fn tick_seconds(&self) -> f32 {
        1.0 / self.network.tick_rate.max(1) as f32
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            reason: "must be greater than zero",
        })
    }
}
