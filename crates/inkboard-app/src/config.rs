//! Application configuration.

use inkboard_core::shapes::SerializableColor;
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::generate::DEFAULT_ENDPOINT;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "INKBOARD_CONFIG";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid background color: {0}")]
    InvalidColor(String),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Canvas background as a hex color.
    pub background_color: String,
    /// URL the sketch is posted to.
    pub generation_endpoint: String,
    /// Font file for text shapes. Falls back to a system font.
    pub font_path: Option<PathBuf>,
    /// Board directory. Falls back to the platform data directory.
    pub storage_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Inkboard".to_string(),
            width: 1280,
            height: 800,
            background_color: "#ffffff".to_string(),
            generation_endpoint: DEFAULT_ENDPOINT.to_string(),
            font_path: None,
            storage_dir: None,
        }
    }
}

impl AppConfig {
    /// Where the config is read from: `$INKBOARD_CONFIG`, else the platform config dir.
    pub fn config_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("inkboard").join("config.json"))
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        let config: Self = serde_json::from_str(&content)?;
        config.background()?;
        Ok(config)
    }

    /// Load the config, falling back to defaults on any error.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parsed background color.
    pub fn background(&self) -> Result<Color, ConfigError> {
        SerializableColor::parse_hex(&self.background_color)
            .map(Color::from)
            .ok_or_else(|| ConfigError::InvalidColor(self.background_color.clone()))
    }
}
