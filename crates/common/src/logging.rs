//! Logging and tracing initialization.
//!
//! `RUST_LOG` wins when it is set. Otherwise the filter is the configured
//! level followed by its per-target overrides, so a config can turn up
//! the timer logs alone with `"targets": ["frameintro_orchestrator=debug"]`.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{IntroError, IntroResult};

/// Crates whose events trace the intro's timers and frames.
pub const TIMING_TARGETS: [&str; 2] = ["frameintro_motion", "frameintro_orchestrator"];

/// Build the filter described by `config`, ignoring the environment.
pub fn config_filter(config: &LoggingConfig) -> IntroResult<EnvFilter> {
    let directives = config.directives();
    EnvFilter::try_new(&directives)
        .map_err(|e| IntroError::config(format!("invalid log filter {directives:?}: {e}")))
}

/// Initialize the tracing subscriber with the given configuration.
///
/// Logs go to stderr. An unparsable filter falls back to the base level.
pub fn init_logging(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| config_filter(config))
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(config.show_targets);

    let installed = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.compact().finish())
    };
    if installed.is_ok() {
        tracing::debug!(filter = %config.directives(), "logging initialized");
    }
}
