//! Structured logging and tracing for Strider.
//!
//! Span-based, filterable logging via the `tracing` ecosystem. Console output
//! carries uptime timestamps and module paths; debug builds can additionally
//! write JSON lines for replaying a desync after the fact. The filter follows
//! `RUST_LOG` first, then the config's `debug.log_level`.

use std::path::Path;

use strider_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config specify one.
const DEFAULT_FILTER: &str = "info,rapier3d=warn";

/// Name of the JSON log file written in debug builds.
pub const LOG_FILE_NAME: &str = "strider.log";

/// Initialize the global tracing subscriber.
///
/// * `log_dir` - Directory for the JSON log file (debug builds only)
/// * `debug_build` - Whether file logging may be enabled
/// * `config` - Optional configuration supplying the log level
///
/// # Examples
///
/// ```no_run
/// use strider_config::Config;
/// use strider_log::init_logging;
///
/// let config = Config::default();
/// init_logging(Some(std::path::Path::new("./logs")), true, Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config)));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join(LOG_FILE_NAME))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        return;
    }

    subscriber.init();
}

/// Returns the filter directive string derived from `config`.
///
/// An empty `debug.log_level` falls back to the default directive. A bare
/// level such as `"debug"` keeps rapier quiet.
pub fn filter_directive(config: Option<&Config>) -> String {
    match config.map(|c| c.debug.log_level.trim()) {
        Some(level) if !level.is_empty() && !level.contains(',') && !level.contains('=') => {
            format!("{level},rapier3d=warn")
        }
        Some(level) if !level.is_empty() => level.to_string(),
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// Create an `EnvFilter` with the default filter string.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_level() {
        let filter_str = format!("{}", default_env_filter());
        assert!(filter_str.contains("rapier3d=warn"));
        assert!(filter_str.contains("info"));
    }

    #[test]
    fn test_directive_without_config() {
        assert_eq!(filter_directive(None), DEFAULT_FILTER);
    }

    #[test]
    fn test_directive_from_bare_level() {
        let mut config = Config::default();
        config.debug.log_level = "debug".to_string();
        assert_eq!(filter_directive(Some(&config)), "debug,rapier3d=warn");
    }

    #[test]
    fn test_directive_passes_through_full_filter() {
        let mut config = Config::default();
        config.debug.log_level = "warn,strider_net=trace".to_string();
        assert_eq!(filter_directive(Some(&config)), "warn,strider_net=trace");
    }

    #[test]
    fn test_directive_empty_level_uses_default() {
        let mut config = Config::default();
        config.debug.log_level = "  ".to_string();
        assert_eq!(filter_directive(Some(&config)), DEFAULT_FILTER);
    }

    #[test]
    fn test_subsystem_filters_parse() {
        for directive in [
            "info",
            "debug,strider_movement=trace",
            "warn,strider_net=debug,rapier3d=error",
        ] {
            assert!(
                EnvFilter::try_new(directive).is_ok(),
                "failed to parse filter: {directive}"
            );
        }
    }

    #[test]
    fn test_log_file_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(LOG_FILE_NAME);
        assert_eq!(path.file_name().unwrap(), "strider.log");
    }
}
