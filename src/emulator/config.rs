// Configuration management
//
// Presentation settings, loaded from TOML. Every key is optional; missing
// keys take their defaults.

use crate::display::UndersizedScreen;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file path
pub const CONFIG_FILE: &str = "gb_present.toml";

/// Errors that can occur while reading or writing the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration in '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Presentation configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentConfig {
    /// Video settings
    pub video: VideoConfig,

    /// Audio settings
    pub audio: AudioConfig,

    /// Boot settings
    pub boot: BootConfig,
}

/// Video configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Vertical blanks the core runs per presented frame. Only the last one
    /// is captured, so the presented rate is the core's rate divided by this.
    pub frame_divisor: u32,

    /// Wait for vertical sync on present (false = swap interval 0)
    pub vsync: bool,

    /// Cover the whole primary monitor
    pub fullscreen: bool,

    /// Window scale when not fullscreen (1-8)
    pub window_scale: u32,

    /// Policy when the screen is smaller than one logical frame
    pub undersized_screen: UndersizedScreen,
}

/// Audio configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Enable emulator sound output
    pub enabled: bool,
}

/// Boot configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootConfig {
    /// Start the program through the boot ROM
    pub use_boot_rom: bool,
}

impl Default for VideoConfig {
    fn default() -> Self {
        VideoConfig {
            frame_divisor: 3,
            vsync: false,
            fullscreen: true,
            window_scale: 3,
            undersized_screen: UndersizedScreen::Clamp,
        }
    }
}

impl VideoConfig {
    /// Frame divisor, never below 1
    pub fn frame_divisor(&self) -> u32 {
        self.frame_divisor.max(1)
    }

    /// Window scale clamped to 1x-8x
    pub fn window_scale(&self) -> u32 {
        self.window_scale.clamp(1, 8)
    }
}

impl PresentConfig {
    /// Load configuration from `path`, falling back to defaults
    ///
    /// A missing file is silent; an unreadable or malformed one is logged.
    /// Nothing is written back.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No configuration at '{}', using defaults", path.display());
            return Self::default();
        }

        Self::load_from(path).unwrap_or_else(|e| {
            log::warn!("{}; using defaults", e);
            Self::default()
        })
    }

    /// Load configuration from file
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save configuration to file
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
