//! Command-line argument parsing for the simulator.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Strider command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "strider-sim", about = "Headless ability movement simulator")]
pub struct CliArgs {
    /// Simulation ticks per second.
    #[arg(long)]
    pub tick_rate: Option<u32>,

    /// Number of ticks to simulate.
    #[arg(long)]
    pub ticks: Option<u32>,

    /// One-way latency between client and server, in ticks.
    #[arg(long)]
    pub latency: Option<u32>,

    /// Ticks between authoritative snapshots.
    #[arg(long)]
    pub snapshot_interval: Option<u32>,

    /// Teleport distance in meters.
    #[arg(long)]
    pub teleport_distance: Option<f32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(rate) = args.tick_rate {
            self.network.tick_rate = rate;
        }
        if let Some(ticks) = args.ticks {
            self.sim.duration_ticks = ticks;
        }
        if let Some(latency) = args.latency {
            self.network.simulated_latency_ticks = latency;
        }
        if let Some(interval) = args.snapshot_interval {
            self.network.snapshot_interval_ticks = interval;
        }
        if let Some(distance) = args.teleport_distance {
            self.teleport.distance = distance;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_args() -> CliArgs {
        CliArgs {
            tick_rate: None,
            ticks: None,
            latency: None,
            snapshot_interval: None,
            teleport_distance: None,
            log_level: None,
            config: None,
        }
    }

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            latency: Some(10),
            teleport_distance: Some(1000.0),
            ..empty_args()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.network.simulated_latency_ticks, 10);
        assert_eq!(config.teleport.distance, 1000.0);
        // Non-overridden fields retain defaults
        assert_eq!(config.network.tick_rate, 60);
        assert_eq!(config.teleport.cooldown_secs, 1.0);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&empty_args());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::parse_from(["strider-sim", "--ticks", "120", "--log-level", "debug"]);
        assert_eq!(args.ticks, Some(120));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.config.is_none());
    }
}
