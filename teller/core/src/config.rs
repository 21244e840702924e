//! TOML Configuration
//!
//! Configuration for the Teller client, loaded from
//! `$XDG_CONFIG_HOME/teller/config.toml` with environment-variable
//! overrides and defaults as fallback.
//!
//! # Configuration Priority
//!
//! Values are resolved with the following priority (highest first):
//! 1. Environment variables (`TELLER_*`)
//! 2. TOML configuration file
//! 3. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [api]
//! mode = "simulated"
//! base_url = "http://localhost:8000/api"
//!
//! [voice]
//! speech_enabled = true
//! ```
//!
//! The file is also the persistence point for the speech-output toggle:
//! flipping it in the UI writes the config back.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading or saving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file
    #[error("failed to read config file at {}: {source}", path.display())]
    Read {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },
    /// Failed to parse TOML
    #[error("failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),
    /// Failed to write the config file
    #[error("failed to write config file at {}: {source}", path.display())]
    Write {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },
    /// Failed to encode the configuration
    #[error("failed to encode config: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Which API backend requests go to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiMode {
    /// Real server over the network
    Live,
    /// In-memory fixtures with an artificial delay
    #[default]
    Simulated,
}

impl std::str::FromStr for ApiMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "live" => Ok(Self::Live),
            "simulated" | "mock" => Ok(Self::Simulated),
            other => Err(format!("unknown api mode: {other}")),
        }
    }
}

/// API section of the configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Backend selection; switching is a pure toggle, no data migration
    pub mode: ApiMode,
    /// Base URL of the live server
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            mode: ApiMode::Simulated,
            base_url: "http://localhost:8000/api".to_string(),
        }
    }
}

/// Voice section of the configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Whether assistant replies are spoken aloud
    pub speech_enabled: bool,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            speech_enabled: true,
        }
    }
}

/// Full client configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TellerConfig {
    /// API backend selection
    pub api: ApiConfig,
    /// Voice output settings
    pub voice: VoiceConfig,
}

impl TellerConfig {
    /// Default config file location under the XDG config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("teller").join("config.toml"))
    }

    /// Load configuration with the standard priority order.
    ///
    /// A missing file falls through to defaults; a malformed file is
    /// logged and ignored rather than aborting startup.
    pub fn load() -> Self {
        let mut config = match Self::default_path() {
            Some(path) => match Self::load_from_path(&path) {
                Ok(config) => {
                    tracing::debug!(path = %path.display(), "loaded config file");
                    config
                }
                Err(ConfigError::Read { source, .. })
                    if source.kind() == std::io::ErrorKind::NotFound =>
                {
                    Self::default()
                }
                Err(err) => {
                    tracing::warn!(error = %err, "ignoring unusable config file");
                    Self::default()
                }
            },
            None => Self::default(),
        };
        config.apply_env();
        config
    }

    /// Load configuration from a specific file
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&raw)?)
    }

    /// Apply `TELLER_*` environment overrides
    pub fn apply_env(&mut self) {
        if let Ok(mode) = std::env::var("TELLER_API_MODE") {
            match mode.parse() {
                Ok(mode) => self.api.mode = mode,
                Err(err) => tracing::warn!(%err, "ignoring TELLER_API_MODE"),
            }
        }
        if let Ok(base_url) = std::env::var("TELLER_API_URL") {
            self.api.base_url = base_url;
        }
        if let Ok(speech) = std::env::var("TELLER_SPEECH") {
            self.voice.speech_enabled = !matches!(speech.as_str(), "0" | "false" | "off");
        }
    }

    /// Persist to the default location (used for the speech toggle)
    pub fn save(&self) -> Result<(), ConfigError> {
        let Some(path) = Self::default_path() else {
            return Ok(());
        };
        self.save_to_path(&path)
    }

    /// Persist to a specific file
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        let encoded = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, encoded).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TellerConfig::default();
        assert_eq!(config.api.mode, ApiMode::Simulated);
        assert_eq!(config.api.base_url, "http://localhost:8000/api");
        assert!(config.voice.speech_enabled);
    }

    #[test]
    fn test_partial_file_fills_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\nmode = \"live\"\n").unwrap();

        let config = TellerConfig::load_from_path(&path).unwrap();
        assert_eq!(config.api.mode, ApiMode::Live);
        // Unspecified sections keep their defaults
        assert_eq!(config.api.base_url, "http://localhost:8000/api");
        assert!(config.voice.speech_enabled);
    }

    #[test]
    fn test_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = TellerConfig::default();
        config.voice.speech_enabled = false;
        config.save_to_path(&path).unwrap();

        let reloaded = TellerConfig::load_from_path(&path).unwrap();
        assert!(!reloaded.voice.speech_enabled);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api = nonsense[").unwrap();

        assert!(matches!(
            TellerConfig::load_from_path(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_api_mode_parse() {
        assert_eq!("live".parse::<ApiMode>().unwrap(), ApiMode::Live);
        assert_eq!("simulated".parse::<ApiMode>().unwrap(), ApiMode::Simulated);
        assert_eq!("mock".parse::<ApiMode>().unwrap(), ApiMode::Simulated);
        assert!("browser".parse::<ApiMode>().is_err());
    }
}
