//! Headless simulator: one predicting client and one authority exchanging
//! ability requests, moves and snapshots over a delayed in-process link.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI
//! flags. Run with `cargo run -p strider-sim -- --latency 8 --ticks 900`.

mod scenario;

use clap::Parser;
use strider_config::{CliArgs, Config, default_config_dir};
use strider_net::ServerTickSchedule;
use tracing::{error, info};

use crate::scenario::{Simulation, default_timeline};

/// Wall-clock frame length fed to the tick schedule.
const FRAME_SECS: f64 = 1.0 / 144.0;

fn main() {
    let args = CliArgs::parse();

    let config_dir = match args.config.clone().map(Ok).unwrap_or_else(default_config_dir) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("{e}, using the working directory");
            std::path::PathBuf::from(".")
        }
    };

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    let file_logging = cfg!(debug_assertions) || config.debug.file_logging;
    strider_log::init_logging(Some(&log_dir), file_logging, Some(&config));

    if let Err(e) = config.validate() {
        error!(%e, "invalid configuration");
        std::process::exit(2);
    }

    info!(
        tick_rate = config.network.tick_rate,
        ticks = config.sim.duration_ticks,
        latency_ticks = config.network.simulated_latency_ticks,
        snapshot_interval = config.network.snapshot_interval_ticks,
        "starting simulation"
    );

    let mut sim = Simulation::new(&config, default_timeline());
    let mut schedule = ServerTickSchedule::with_tick_rate(config.network.tick_rate);
    let target = u64::from(config.sim.duration_ticks);

    'frames: while sim.stats().ticks < target {
        for _ in 0..schedule.accumulate(FRAME_SECS) {
            if let Err(e) = sim.step() {
                error!(%e, tick = sim.stats().ticks, "simulation aborted");
                break 'frames;
            }
            if sim.stats().ticks >= target {
                break 'frames;
            }
        }
    }

    sim.report();
}
