//! Application configuration: loading, saving and defaults

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use kineplot_renderer::AnnotLocation;

/// Configuration error types
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// IO error during file operations
    Io(String),
    /// Error during serialization
    Serialize(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "IO error: {}", msg),
            ConfigError::Serialize(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Playback preferences
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaybackConfig {
    /// Delay between animation steps, milliseconds
    pub interval_ms: u64,
    /// Animation time advanced per step, seconds
    pub time_step: f64,
    /// Start playing as soon as the app opens
    pub autoplay: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            interval_ms: 16,
            time_step: 0.02,
            autoplay: true,
        }
    }
}

/// View preferences
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViewConfig {
    /// Margin factor used when framing the scene
    pub auto_zoom_scale: f64,
    /// Where the hover annotation is placed
    pub annot_location: AnnotLocation,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            auto_zoom_scale: 1.1,
            annot_location: AnnotLocation::Object,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppConfig {
    /// Configuration format version
    #[serde(default)]
    pub version: u32,
    /// Playback settings
    #[serde(default)]
    pub playback: PlaybackConfig,
    /// View settings
    #[serde(default)]
    pub view: ViewConfig,
}

/// Handles loading, saving, and accessing app configuration
pub struct ConfigManager {
    config: AppConfig,
    config_path: PathBuf,
    dirty: bool,
}

impl ConfigManager {
    /// Create a new configuration manager, loading from disk if available
    pub fn new() -> Self {
        let config_path = Self::config_path();
        let config = Self::load_from_path(&config_path).unwrap_or_else(|| {
            tracing::info!("No config file found, using defaults");
            AppConfig::default()
        });

        Self {
            config,
            config_path,
            dirty: false,
        }
    }

    /// Get the OS-standard configuration directory
    fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kineplot")
    }

    /// Get the configuration file path
    fn config_path() -> PathBuf {
        Self::config_dir().join("config.ron")
    }

    /// Load configuration from a file path
    fn load_from_path(path: &PathBuf) -> Option<AppConfig> {
        let content = std::fs::read_to_string(path).ok()?;
        match ron::from_str(&content) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                Some(config)
            }
            Err(e) => {
                tracing::warn!("Failed to parse config file: {}", e);
                None
            }
        }
    }

    /// Get a reference to the current configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a mutable reference to the configuration (marks as dirty)
    pub fn config_mut(&mut self) -> &mut AppConfig {
        self.dirty = true;
        &mut self.config
    }

    /// Save the configuration to disk when it has unsaved changes
    pub fn save(&mut self) -> Result<(), ConfigError> {
        if !self.dirty {
            return Ok(());
        }

        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }

        let content = ron::ser::to_string_pretty(&self.config, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        std::fs::write(&self.config_path, &content).map_err(|e| ConfigError::Io(e.to_string()))?;

        tracing::info!("Saved config to {:?}", self.config_path);
        self.dirty = false;
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_ron_round_trip() {
        let mut config = AppConfig::default();
        config.playback.autoplay = false;
        config.view.annot_location = AnnotLocation::Mouse;

        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        let parsed: AppConfig = ron::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let parsed: AppConfig = ron::from_str("(version: 1)").unwrap();
        assert_eq!(parsed.version, 1);
        assert_eq!(parsed.playback, PlaybackConfig::default());
        assert_eq!(parsed.view, ViewConfig::default());
    }
}
