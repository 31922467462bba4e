//! Configuration management for pixfit.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Every section is optional in the file.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use crate::types::FieldValues;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for pixfit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output settings
    pub output: OutputConfig,

    /// Template field defaults
    pub naming: NamingConfig,

    /// Processing settings
    pub processing: ProcessingConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// - macOS: ~/Library/Application Support/com.pixfit.pixfit/config.toml
    /// - Linux: ~/.config/pixfit/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\pixfit\config\config.toml
    ///
    /// Falls back to ~/.pixfit/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "pixfit", "pixfit")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".pixfit").join("config.toml")
            })
    }

    /// Resolved output folder (with ~ expansion). Empty config means `./pixfit-out`.
    pub fn output_folder(&self) -> PathBuf {
        if self.output.folder.as_os_str().is_empty() {
            return PathBuf::from("pixfit-out");
        }
        let path_str = self.output.folder.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Template field values seeded from the `[naming]` section.
    ///
    /// Blank entries are left out so they don't shadow values supplied later.
    pub fn field_values(&self) -> FieldValues {
        let mut values = FieldValues::new();
        if !self.naming.user_initials.is_empty() {
            values.insert(
                "user_initials".to_string(),
                self.naming.user_initials.clone(),
            );
        }
        if !self.naming.project_name.is_empty() {
            values.insert(
                "project_name".to_string(),
                self.naming.project_name.clone(),
            );
        }
        values
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
