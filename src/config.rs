use serde::Deserialize;
use std::time::Duration;

use crate::error::{AnimError, Result};
use crate::playback::PlaybackOptions;

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Real-time playback settings.
    #[serde(default)]
    pub playback: PlaybackConfig,
    /// Sprite sheet + timeline encoder settings.
    #[serde(default)]
    pub encoder: EncoderConfig,
    /// Export settings.
    #[serde(default)]
    pub export: ExportConfig,
}

/// Playback parameters.
#[derive(Debug, Deserialize, Clone)]
pub struct PlaybackConfig {
    /// Number of passes over the timeline (0 = loop until interrupted).
    #[serde(default)]
    pub loops: u32,
    /// Playback speed multiplier; delays are divided by it.
    #[serde(default = "default_speed")]
    pub speed: f64,
    /// Lower bound on the wait between two frames, in milliseconds.
    #[serde(default)]
    pub min_delay_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self { loops: 0, speed: default_speed(), min_delay_ms: 0 }
    }
}

impl PlaybackConfig {
    pub fn options(&self) -> PlaybackOptions {
        PlaybackOptions {
            loops: self.loops,
            speed: self.speed,
            min_delay: Duration::from_millis(self.min_delay_ms),
        }
    }
}

/// Encoder parameters.
#[derive(Debug, Deserialize, Clone)]
pub struct EncoderConfig {
    /// Delay assigned to every encoded frame, in milliseconds.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u32,
    /// Unchanged gaps up to this many pixels are merged into one region.
    #[serde(default = "default_max_gap")]
    pub max_gap: u32,
    /// Append a frame restoring the first image so loops are seamless.
    #[serde(default = "default_loop_reset")]
    pub loop_reset: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            max_gap: default_max_gap(),
            loop_reset: default_loop_reset(),
        }
    }
}

/// Export parameters.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ExportConfig {
    /// GIF repeat count (0 = infinite).
    #[serde(default)]
    pub gif_repeat: u16,
}

fn default_speed() -> f64 { 1.0 }
fn default_delay_ms() -> u32 { 1000 }
fn default_max_gap() -> u32 { 4 }
fn default_loop_reset() -> bool { true }

impl Config {
    /// Load configuration from a TOML file at `path`.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AnimError::Config(format!("Cannot read config file: {e}")))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| AnimError::Config(format!("Invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(self.playback.speed.is_finite() && self.playback.speed > 0.0) {
            return Err(AnimError::Config("playback.speed must be > 0".into()));
        }
        Ok(())
    }
}
