//! Engine configuration
//!
//! One `usher.toml` (or an in-code [`EngineConfig`]) configures every
//! component: readiness gate timings, transition cover duration and the
//! preserve-scroll carve-outs, governor ceilings and degradation
//! thresholds, and scroll smoothing. All durations are milliseconds.
//!
//! ```toml
//! [gate]
//! min_display_ms = 1200
//! fallback_ms = 5000
//!
//! [governor]
//! ceiling = 48
//! low_fps_threshold = 30.0
//!
//! [[transition.preserve_scroll]]
//! prefix = "/gallery/"
//! anchor = "gallery-grid"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, UsherError};

/// Top-level engine configuration
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub transition: TransitionConfig,
    #[serde(default)]
    pub governor: GovernorConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML file
    pub fn from_toml_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            UsherError::Config(format!("failed to read config at {}: {e}", path.display()))
        })?;
        let config: EngineConfig = toml::from_str(&raw).map_err(|e| {
            UsherError::Config(format!("failed to parse config at {}: {e}", path.display()))
        })?;
        tracing::debug!("loaded engine config from {}", path.display());
        Ok(config)
    }
}

/// Readiness gate timings
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GateConfig {
    /// Minimum time the loading screen stays up
    #[serde(default = "default_min_display_ms")]
    pub min_display_ms: u64,
    /// Hard deadline after which loading is forced to finish
    #[serde(default = "default_fallback_ms")]
    pub fallback_ms: u64,
    /// Pause after loading ends before entrance animations may measure
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    /// Whether the current route has a hero asset to wait for
    #[serde(default = "default_true")]
    pub hero_expected: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_display_ms: default_min_display_ms(),
            fallback_ms: default_fallback_ms(),
            settle_ms: default_settle_ms(),
            hero_expected: true,
        }
    }
}

impl GateConfig {
    pub fn min_display(&self) -> Duration {
        Duration::from_millis(self.min_display_ms)
    }

    pub fn fallback(&self) -> Duration {
        Duration::from_millis(self.fallback_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// A back-navigation scroll carve-out
///
/// When a back navigation leaves a path matching `prefix`, the
/// post-transition correction scrolls to `anchor` instead of the top,
/// preserving the visitor's place in long grids.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PreserveScroll {
    pub prefix: String,
    pub anchor: String,
}

/// Transition sequencer settings
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TransitionConfig {
    /// How long the overlay takes to fully cover the old content
    #[serde(default = "default_cover_ms")]
    pub cover_ms: u64,
    /// Back navigations from these prefixes skip scroll-to-top
    #[serde(default)]
    pub preserve_scroll: Vec<PreserveScroll>,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            cover_ms: default_cover_ms(),
            preserve_scroll: Vec::new(),
        }
    }
}

impl TransitionConfig {
    pub fn cover(&self) -> Duration {
        Duration::from_millis(self.cover_ms)
    }
}

/// Animation governor limits
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GovernorConfig {
    /// Maximum live scroll-trigger registrations
    #[serde(default = "default_ceiling")]
    pub ceiling: usize,
    /// Ceiling after a degradation step
    #[serde(default = "default_degraded_ceiling")]
    pub degraded_ceiling: usize,
    /// Effective FPS below which degradation is considered
    #[serde(default = "default_low_fps")]
    pub low_fps_threshold: f32,
    /// Window the FPS estimate must stay low before degrading
    #[serde(default = "default_debounce_ms")]
    pub low_fps_debounce_ms: u64,
    /// Frame samples kept in the rolling window
    #[serde(default = "default_sample_window")]
    pub sample_window: usize,
    /// User accessibility preference: skip animation entirely
    #[serde(default)]
    pub reduced_motion: bool,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            ceiling: default_ceiling(),
            degraded_ceiling: default_degraded_ceiling(),
            low_fps_threshold: default_low_fps(),
            low_fps_debounce_ms: default_debounce_ms(),
            sample_window: default_sample_window(),
            reduced_motion: false,
        }
    }
}

impl GovernorConfig {
    pub fn low_fps_debounce(&self) -> Duration {
        Duration::from_millis(self.low_fps_debounce_ms)
    }
}

/// Scroll controller settings
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ScrollConfig {
    /// Spring stiffness for smooth scrolling
    #[serde(default = "default_scroll_stiffness")]
    pub stiffness: f32,
    /// Spring damping for smooth scrolling
    #[serde(default = "default_scroll_damping")]
    pub damping: f32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            stiffness: default_scroll_stiffness(),
            damping: default_scroll_damping(),
        }
    }
}

fn default_min_display_ms() -> u64 {
    1200
}

fn default_fallback_ms() -> u64 {
    5000
}

fn default_settle_ms() -> u64 {
    300
}

fn default_cover_ms() -> u64 {
    600
}

fn default_ceiling() -> usize {
    48
}

fn default_degraded_ceiling() -> usize {
    16
}

fn default_low_fps() -> f32 {
    30.0
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_sample_window() -> usize {
    60
}

fn default_scroll_stiffness() -> f32 {
    170.0
}

fn default_scroll_damping() -> f32 {
    26.0
}

fn default_true() -> bool {
    true
}
