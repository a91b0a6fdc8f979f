//! Intro configuration.
//!
//! The intro is a table of fixed delays. Two variants of the site shipped
//! with different values for the loader, intro start and idle threshold,
//! so they are configuration rather than constants.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{IntroError, IntroResult};

/// Which timing preset the configuration was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IntroVariant {
    /// Simulated pointer walks to the dock anchor before the content opens.
    #[default]
    SimulatedPointer,
    /// Earlier shell: shorter loader, later intro start, shorter idle window.
    Simple,
}

/// Global intro configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntroConfig {
    /// Preset the timings were taken from.
    #[serde(default)]
    pub variant: IntroVariant,

    /// Shutter easing parameters.
    pub shutter: ShutterConfig,

    /// Orchestrator timer table.
    pub timings: OrchestratorTimings,

    /// Simulated pointer sequence.
    pub pointer: PointerScript,

    /// Viewport assumed until the host reports a resize.
    pub viewport: ViewportConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Parameters of the two-phase shutter easing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShutterConfig {
    /// Angle the blades start and settle at (degrees).
    pub target_deg: f64,

    /// Duration of the closing phase (ms).
    pub phase1_ms: u64,

    /// Duration of the reopening phase (ms).
    pub phase2_ms: u64,

    /// Number of blades arranged around the aperture.
    pub blades: u32,
}

/// Delays of the orchestrator's timers, all relative to mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorTimings {
    /// Micro-motion start.
    pub intro_start_ms: u64,

    /// App assets ready; gates the dock anchor.
    pub assets_ready_ms: u64,

    /// Loader overlay dismissed.
    pub loader_dismiss_ms: u64,

    /// Expansion overlay collapsed ahead of content entry.
    pub expansion_collapse_ms: u64,

    /// Expanded content view entered.
    pub enter_content_ms: u64,

    /// Length of the activation acknowledgement motion.
    pub acknowledge_ms: u64,

    /// Time without qualifying input before the session counts as idle.
    pub idle_threshold_ms: u64,
}

/// The simulated pointer's walk to the dock anchor.
///
/// Positions are fractions of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerScript {
    /// Whether the pointer sequence runs at all.
    pub enabled: bool,

    /// Delay after mount before the pointer departs (ms).
    pub delay_ms: u64,

    /// Travel time to the anchor (ms).
    pub travel_ms: u64,

    /// Pause at the anchor before a synthetic activation (ms).
    pub settle_ms: u64,

    pub origin_x: f64,
    pub origin_y: f64,
    pub anchor_x: f64,
    pub anchor_y: f64,
}

/// Viewport dimensions in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    pub width: f64,
    pub height: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base log level (e.g., "info", "debug").
    pub level: String,

    /// Per-target overrides in `EnvFilter` syntax, applied after `level`
    /// (e.g., "frameintro_orchestrator=trace").
    #[serde(default)]
    pub targets: Vec<String>,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Whether to print event targets in text mode.
    #[serde(default)]
    pub show_targets: bool,
}

impl Default for IntroConfig {
    fn default() -> Self {
        Self::for_variant(IntroVariant::default())
    }
}

impl Default for ShutterConfig {
    fn default() -> Self {
        Self {
            target_deg: 40.0,
            phase1_ms: 700,
            phase2_ms: 1000,
            blades: 7,
        }
    }
}

impl Default for OrchestratorTimings {
    fn default() -> Self {
        Self::for_variant(IntroVariant::default())
    }
}

impl Default for PointerScript {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_ms: 800,
            travel_ms: 1200,
            settle_ms: 300,
            origin_x: 0.5,
            origin_y: 0.5,
            anchor_x: 0.5,
            anchor_y: 0.92,
        }
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1440.0,
            height: 900.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            targets: Vec::new(),
            json: false,
            show_targets: false,
        }
    }
}

impl LoggingConfig {
    /// The full filter: the base level followed by the target overrides.
    pub fn directives(&self) -> String {
        std::iter::once(self.level.as_str())
            .chain(self.targets.iter().map(String::as_str))
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Set `level` for the crates that log the intro's timers and frames,
    /// replacing any override they already had.
    pub fn with_timing_level(mut self, level: &str) -> Self {
        for target in crate::logging::TIMING_TARGETS {
            let prefix = format!("{target}=");
            self.targets.retain(|d| !d.starts_with(&prefix));
            self.targets.push(format!("{prefix}{level}"));
        }
        self
    }
}

impl OrchestratorTimings {
    /// Timer table of a variant.
    pub fn for_variant(variant: IntroVariant) -> Self {
        match variant {
            IntroVariant::SimulatedPointer => Self {
                intro_start_ms: 800,
                assets_ready_ms: 3000,
                loader_dismiss_ms: 4000,
                expansion_collapse_ms: 4800,
                enter_content_ms: 5000,
                acknowledge_ms: 100,
                idle_threshold_ms: 60_000,
            },
            IntroVariant::Simple => Self {
                intro_start_ms: 1500,
                assets_ready_ms: 3000,
                loader_dismiss_ms: 2500,
                expansion_collapse_ms: 4800,
                enter_content_ms: 5000,
                acknowledge_ms: 100,
                idle_threshold_ms: 30_000,
            },
        }
    }
}

impl PointerScript {
    /// Offset from mount at which a synthetic activation may fire.
    pub fn activation_at_ms(&self) -> u64 {
        self.delay_ms + self.travel_ms + self.settle_ms
    }
}

impl IntroConfig {
    /// Full configuration for a variant preset.
    pub fn for_variant(variant: IntroVariant) -> Self {
        Self {
            variant,
            shutter: ShutterConfig::default(),
            timings: OrchestratorTimings::for_variant(variant),
            pointer: PointerScript::default(),
            viewport: ViewportConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::from_path(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Read and validate a config file.
    pub fn from_path(path: &Path) -> IntroResult<Self> {
        if !path.exists() {
            return Err(IntroError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> IntroResult<PathBuf> {
        let config_path = config_file_path();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, path: &Path) -> IntroResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Check the invariants the intro choreography relies on.
    ///
    /// The cue order is a property of the chosen delays, not something the
    /// scheduler enforces, so a table that breaks it is rejected here.
    pub fn validate(&self) -> IntroResult<()> {
        let s = &self.shutter;
        if !s.target_deg.is_finite() || s.target_deg <= 0.0 {
            return Err(IntroError::config(format!(
                "shutter target must be a positive angle, got {}",
                s.target_deg
            )));
        }
        if s.phase1_ms == 0 || s.phase2_ms == 0 {
            return Err(IntroError::config("shutter phases must be non-zero"));
        }
        if s.blades == 0 {
            return Err(IntroError::config("shutter needs at least one blade"));
        }

        let t = &self.timings;
        if t.idle_threshold_ms == 0 {
            return Err(IntroError::invalid_timing("idle threshold must be non-zero"));
        }
        if t.intro_start_ms >= t.assets_ready_ms {
            return Err(IntroError::invalid_timing(format!(
                "intro-start ({} ms) must fire before assets-ready ({} ms)",
                t.intro_start_ms, t.assets_ready_ms
            )));
        }
        if t.assets_ready_ms >= t.enter_content_ms {
            return Err(IntroError::invalid_timing(format!(
                "assets-ready ({} ms) must fire before enter-content ({} ms)",
                t.assets_ready_ms, t.enter_content_ms
            )));
        }
        if t.loader_dismiss_ms >= t.expansion_collapse_ms {
            return Err(IntroError::invalid_timing(format!(
                "loader-dismiss ({} ms) must fire before expansion-collapse ({} ms)",
                t.loader_dismiss_ms, t.expansion_collapse_ms
            )));
        }
        if t.expansion_collapse_ms >= t.enter_content_ms {
            return Err(IntroError::invalid_timing(format!(
                "expansion-collapse ({} ms) must fire before enter-content ({} ms)",
                t.expansion_collapse_ms, t.enter_content_ms
            )));
        }

        let p = &self.pointer;
        if p.enabled {
            let expanded_at = p.activation_at_ms() + t.acknowledge_ms;
            if expanded_at >= t.expansion_collapse_ms {
                return Err(IntroError::invalid_timing(format!(
                    "simulated activation completes at {} ms, after expansion-collapse ({} ms)",
                    expanded_at, t.expansion_collapse_ms
                )));
            }
            let coords = [p.origin_x, p.origin_y, p.anchor_x, p.anchor_y];
            if coords.iter().any(|c| !(0.0..=1.0).contains(c)) {
                return Err(IntroError::config(
                    "pointer origin and anchor must be viewport fractions in [0, 1]",
                ));
            }
        }

        crate::logging::config_filter(&self.logging)?;

        let v = &self.viewport;
        if !(v.width > 0.0 && v.height > 0.0) {
            return Err(IntroError::config(format!(
                "viewport must have positive size, got {}x{}",
                v.width, v.height
            )));
        }

        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("frameintro").join("config.json")
}
