//! Configuration management for GlanceTemp
//!
//! Timing, temperature range and glow styling, persisted as TOML.
//! A missing file means defaults; a present but invalid file is an error.

use crate::error::{GlanceError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// GlanceTemp configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Timer options
    #[serde(default)]
    pub general: GeneralConfig,
    /// GPU sensor options
    #[serde(default)]
    pub gpu: GpuConfig,
    /// Bar and glow appearance
    #[serde(default)]
    pub style: StyleConfig,
}

/// Timer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Sensor polling interval in milliseconds
    #[serde(default = "default_update_interval")]
    pub update_interval_ms: u64,
    /// Animation frame interval in milliseconds
    #[serde(default = "default_animation_interval")]
    pub animation_interval_ms: u64,
    /// How long a read failure stays on screen, in milliseconds
    #[serde(default = "default_error_display")]
    pub error_display_ms: u64,
}

/// GPU sensor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuConfig {
    /// Monitor the GPU at all
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// NVML device index
    #[serde(default)]
    pub device_index: u32,
    /// Temperature mapped to the coolest color (°C)
    #[serde(default = "default_min_temp")]
    pub min_temp: f32,
    /// Temperature mapped to the hottest color (°C)
    #[serde(default = "default_max_temp")]
    pub max_temp: f32,
}

/// Bar and glow configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    /// Width of the solid bar at the screen edge, in pixels
    #[serde(default = "default_bar_width")]
    pub bar_width: u32,
    /// Number of one-pixel glow lines drawn inward from the bar
    #[serde(default = "default_glow_width")]
    pub glow_width: u32,
    /// Base phase increment per animation frame, in radians
    #[serde(default = "default_breath_speed")]
    pub breath_speed: f32,
}

/// Largest accepted `bar_width` or `glow_width`, in pixels
pub const MAX_STYLE_WIDTH: u32 = 512;

fn default_update_interval() -> u64 {
    1000
}

fn default_animation_interval() -> u64 {
    50 // ~20 FPS
}

fn default_error_display() -> u64 {
    3000
}

fn default_true() -> bool {
    true
}

fn default_min_temp() -> f32 {
    15.0
}

fn default_max_temp() -> f32 {
    50.0
}

fn default_bar_width() -> u32 {
    1
}

fn default_glow_width() -> u32 {
    25
}

fn default_breath_speed() -> f32 {
    0.05
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: default_update_interval(),
            animation_interval_ms: default_animation_interval(),
            error_display_ms: default_error_display(),
        }
    }
}

impl Default for GpuConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            device_index: 0,
            min_temp: default_min_temp(),
            max_temp: default_max_temp(),
        }
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            bar_width: default_bar_width(),
            glow_width: default_glow_width(),
            breath_speed: default_breath_speed(),
        }
    }
}

impl GeneralConfig {
    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms)
    }

    pub fn animation_interval(&self) -> Duration {
        Duration::from_millis(self.animation_interval_ms)
    }

    pub fn error_display(&self) -> Duration {
        Duration::from_millis(self.error_display_ms)
    }
}

impl Config {
    /// Get the default configuration directory
    ///
    /// Returns `$XDG_CONFIG_HOME/glancetemp` or `~/.config/glancetemp` on Unix-like
    /// systems, or `%APPDATA%\glancetemp` on Windows.
    pub fn default_dir() -> PathBuf {
        let config_dir = if cfg!(windows) {
            std::env::var("APPDATA")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("."))
        } else if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(xdg)
        } else {
            std::env::var("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|_| PathBuf::from(".config"))
        };

        config_dir.join("glancetemp")
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        Self::default_dir().join("config.toml")
    }

    /// Load configuration from the default path, falling back to defaults
    pub fn load() -> Result<Self> {
        Self::load_or_default(&Self::default_path())
    }

    /// Load configuration from `path`, or defaults if there is no file there
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&contents)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a TOML document
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)
            .map_err(|e| GlanceError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| GlanceError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<PathBuf> {
        let config_file = Self::default_path();
        if let Some(dir) = config_file.parent() {
            std::fs::create_dir_all(dir)?;
        }
        self.save_to(&config_file)?;
        Ok(config_file)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Reject values the overlay cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.general.update_interval_ms == 0 {
            return Err(GlanceError::Config(
                "update_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.general.animation_interval_ms == 0 {
            return Err(GlanceError::Config(
                "animation_interval_ms must be greater than zero".to_string(),
            ));
        }
        if !self.gpu.min_temp.is_finite() || !self.gpu.max_temp.is_finite() {
            return Err(GlanceError::Config(
                "temperature range must be finite".to_string(),
            ));
        }
        if self.gpu.max_temp <= self.gpu.min_temp {
            return Err(GlanceError::Config(format!(
                "max_temp ({}) must be greater than min_temp ({})",
                self.gpu.max_temp, self.gpu.min_temp
            )));
        }
        if !(self.style.breath_speed.is_finite() && self.style.breath_speed >= 0.0) {
            return Err(GlanceError::Config(
                "breath_speed must be a non-negative number".to_string(),
            ));
        }
        for (name, width) in [
            ("bar_width", self.style.bar_width),
            ("glow_width", self.style.glow_width),
        ] {
            if width > MAX_STYLE_WIDTH {
                return Err(GlanceError::Config(format!(
                    "{} ({}) must be at most {}",
                    name, width, MAX_STYLE_WIDTH
                )));
            }
        }
        Ok(())
    }
}
