//! Engine settings
//!
//! Read once at startup from a JSON file. Missing fields take their defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable naming the settings file
pub const SETTINGS_ENV: &str = "LAUNCHPAD_ARCADE_SETTINGS";
/// Settings file looked up in the working directory
pub const DEFAULT_SETTINGS_FILE: &str = "launchpad-arcade.json";

/// Tunable timings of the engine and its animations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Wall-clock tick delta is divided by this before games see it
    pub time_scale: u32,

    // === Countdown ===
    /// Number of countdown glyphs
    pub countdown_steps: u8,
    /// Milliseconds each countdown glyph stays up
    pub countdown_step_ms: u64,
    /// Skip the countdown even when not debug logging
    pub skip_countdown: bool,

    // === Device ===
    /// How long one input poll may wait (terminal device)
    pub poll_timeout_ms: u64,

    // === Animations ===
    /// Frame time of the Pong point sweep
    pub point_animation_frame_ms: u64,
    /// Frames in the Pong point sweep
    pub point_animation_frames: u8,
    /// Pause per cleared Tetris row
    pub line_clear_pause_ms: u64,
    /// Intensity of the game-over flash
    pub game_over_intensity: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            time_scale: 4,

            countdown_steps: 3,
            countdown_step_ms: 1000,
            skip_countdown: false,

            poll_timeout_ms: 5,

            point_animation_frame_ms: 80,
            point_animation_frames: 14,
            line_clear_pause_ms: 500,
            game_over_intensity: 3,
        }
    }
}

impl Settings {
    /// Time scale divisor, never zero
    pub fn time_scale(&self) -> u32 {
        self.time_scale.max(1)
    }

    pub fn countdown_step(&self) -> Duration {
        Duration::from_millis(self.countdown_step_ms)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    pub fn point_animation_frame(&self) -> Duration {
        Duration::from_millis(self.point_animation_frame_ms)
    }

    pub fn line_clear_pause(&self) -> Duration {
        Duration::from_millis(self.line_clear_pause_ms)
    }

    /// Settings file path: `$LAUNCHPAD_ARCADE_SETTINGS` or the working directory default
    pub fn path() -> PathBuf {
        std::env::var_os(SETTINGS_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE))
    }

    /// Load from the default path, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    /// Load from `path`, falling back to defaults if it is missing or invalid
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring invalid settings in {}: {e}", path.display());
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Save as pretty JSON
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
