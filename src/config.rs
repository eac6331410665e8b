//! Application configuration
//!
//! Loaded from a camelCase JSON file, either the one given on the command
//! line or `<config dir>/video-recorder/config.json` when it exists. Every
//! key is optional.

use crate::capture::synthetic::SyntheticConfig;
use crate::capture::traits::AcquireError;
use crate::recorder::state::{DurationMode, RecordingOptions};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "video-recorder";
const CONFIG_FILE: &str = "config.json";

/// How the synthetic capture environment behaves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnvironmentConfig {
    /// Report a camera during device enumeration
    pub webcam_connected: bool,

    /// Refuse every capture request as if the user denied the prompt
    pub deny_permission: bool,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            webcam_connected: true,
            deny_permission: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// Options the settings panel starts from
    pub default_options: RecordingOptions,

    pub duration_mode: DurationMode,

    /// Milliseconds between encoded fragments
    pub fragment_interval_ms: u64,

    /// Where downloads are written; the working directory when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downloads_dir: Option<PathBuf>,

    /// Command used to open recordings for playback
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<String>,

    pub environment: EnvironmentConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_options: RecordingOptions::default(),
            duration_mode: DurationMode::default(),
            fragment_interval_ms: 1000,
            downloads_dir: None,
            player: None,
            environment: EnvironmentConfig::default(),
        }
    }
}

impl AppConfig {
    /// `<config dir>/video-recorder/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load from `explicit`, else from the default location if present
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.validate()?;

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.fragment_interval_ms == 0 {
            bail!("fragmentIntervalMs must be greater than zero");
        }
        let resolution = self.default_options.resolution;
        crate::capture::traits::Resolution::new(resolution.width, resolution.height)
            .context("defaultOptions.resolution")?;
        Ok(())
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.downloads_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Synthetic environment matching the `environment` section
    pub fn to_synthetic_config(&self) -> SyntheticConfig {
        let mut config = SyntheticConfig {
            fragment_interval: Duration::from_millis(self.fragment_interval_ms),
            ..SyntheticConfig::default()
        };
        if !self.environment.webcam_connected {
            config = config.without_webcam();
        }
        if self.environment.deny_permission {
            config = config.with_failure(AcquireError::PermissionDenied);
        }
        config
    }
}
