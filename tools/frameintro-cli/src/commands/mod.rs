pub mod config;
pub mod curve;
pub mod run;
pub mod simulate;

use std::path::{Path, PathBuf};

use anyhow::Context;
use frameintro_common::config::{IntroConfig, IntroVariant, OrchestratorTimings};
use frameintro_model::event::{parse_events, InputEvent};

/// Resolve the configuration a command runs with.
///
/// An explicit file must load and validate; otherwise the standard
/// location is tried with a fallback to defaults. A variant replaces the
/// timer table of whatever was loaded.
pub fn load_config(
    path: Option<PathBuf>,
    variant: Option<IntroVariant>,
) -> anyhow::Result<IntroConfig> {
    let mut config = match path {
        Some(path) => IntroConfig::from_path(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => IntroConfig::load(),
    };
    if let Some(variant) = variant {
        config.variant = variant;
        config.timings = OrchestratorTimings::for_variant(variant);
        config.validate()?;
    }
    Ok(config)
}

/// Read a JSONL input script, or nothing when no path is given.
pub fn load_script(path: Option<&Path>) -> anyhow::Result<Vec<InputEvent>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    let events = parse_events(&content)
        .with_context(|| format!("Failed to parse script {}", path.display()))?;
    tracing::debug!(events = events.len(), path = %path.display(), "script loaded");
    Ok(events)
}
