//! Configuration settings for the chairside scheduling library.

use crate::error::{ConfigError, Result};
use crate::retention::RetentionPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub scheduling: SchedulingConfig,
    pub retention: RetentionPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            scheduling: SchedulingConfig::default(),
            retention: RetentionPolicy::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations or use defaults.
    pub fn load() -> Result<Self> {
        // Try standard config locations
        let config_paths = [
            // Current directory
            PathBuf::from("config.toml"),
            PathBuf::from("chairside.toml"),
            // User config directory
            dirs::config_dir()
                .map(|p| p.join("chairside/config.toml"))
                .unwrap_or_default(),
            // Home directory
            dirs::home_dir()
                .map(|p| p.join(".chairside/config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.storage.persist && self.storage.data_dir.is_empty() {
            return Err(ConfigError::MissingField("storage.data_dir".to_string()).into());
        }

        if self.scheduling.search_horizon_days == 0 {
            return Err(ConfigError::Invalid(
                "scheduling.search_horizon_days must be > 0".to_string(),
            )
            .into());
        }

        Ok(())
    }

    /// Expand the data directory path.
    pub fn data_dir(&self) -> Result<PathBuf> {
        let expanded = shellexpand::full(&self.storage.data_dir)
            .map_err(|e| ConfigError::PathExpansion(e.to_string()))?;
        Ok(PathBuf::from(expanded.as_ref()))
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Persist the schedule to disk. When false the store is memory-only.
    pub persist: bool,
    /// Data directory for the persisted schedule file.
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            persist: true,
            data_dir: "~/.local/share/chairside".to_string(),
        }
    }
}

/// Scheduling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    /// How many days an opening search scans before giving up.
    pub search_horizon_days: u32,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            search_horizon_days: 60,
        }
    }
}
