//! Configuration system for Strider.
//!
//! Ability tuning, movement and network settings persist to disk as a RON
//! file. Supports CLI overrides via clap, hot-reload detection, and
//! forward/backward compatible serialization.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    Config, CurveKey, DebugConfig, FuelConfig, JetpackConfig, JetpackThrust, MovementConfig,
    NetworkConfig, SimConfig, TeleportConfig, WallRunConfig, default_config_dir,
};
pub use error::ConfigError;
