//! Configuration management for formkeep.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "formkeep";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FORMKEEP_`, sections split on `__`)
/// 2. TOML config file at `~/.config/formkeep/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Field validation thresholds.
    pub validation: ValidationConfig,
    /// Notification configuration.
    pub notifications: NotificationConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the database and the image directory.
    /// Defaults to `~/.local/share/formkeep`
    pub data_dir: Option<PathBuf>,
    /// File name of the key-value database inside `data_dir`.
    pub database_file: String,
    /// Name of the image directory inside `data_dir`.
    pub image_dir_name: String,
    /// Key holding the draft record.
    pub draft_key: String,
    /// Key holding the submitted records list.
    pub submitted_key: String,
}

/// Thresholds used by the validation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Minimum trimmed length of the full name.
    pub min_name_length: usize,
    /// Minimum password length.
    pub min_password_length: usize,
    /// Minimum trimmed length of the bio.
    pub min_bio_length: usize,
    /// Minimum age in whole years (year arithmetic only).
    pub min_age_years: u32,
}

/// Notification-related configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// How long a toast stays visible, in milliseconds.
    pub display_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None, // Resolved at runtime
            database_file: "formkeep.db".to_string(),
            image_dir_name: "images".to_string(),
            draft_key: "@signup_form_draft".to_string(),
            submitted_key: "@submitted_forms".to_string(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_name_length: 2,
            min_password_length: 8,
            min_bio_length: 10,
            min_age_years: 13,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { display_ms: 3000 }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("FORMKEEP_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let storage = &self.storage;

        if storage.draft_key.is_empty() || storage.submitted_key.is_empty() {
            return Err(Error::ConfigValidation {
                message: "draft_key and submitted_key must not be empty".to_string(),
            });
        }

        if storage.draft_key == storage.submitted_key {
            return Err(Error::ConfigValidation {
                message: format!(
                    "draft_key and submitted_key must differ (both are '{}')",
                    storage.draft_key
                ),
            });
        }

        if storage.image_dir_name.is_empty() {
            return Err(Error::ConfigValidation {
                message: "image_dir_name must not be empty".to_string(),
            });
        }

        if self.validation.min_password_length == 0 {
            return Err(Error::ConfigValidation {
                message: "min_password_length must be greater than 0".to_string(),
            });
        }

        if self.notifications.display_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "display_ms must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get the data directory, resolving defaults if not set.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the key-value database path.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.data_dir().join(&self.storage.database_file)
    }

    /// Get the application-owned image directory.
    #[must_use]
    pub fn image_dir(&self) -> PathBuf {
        self.data_dir().join(&self.storage.image_dir_name)
    }

    /// Get how long a notification stays visible.
    #[must_use]
    pub fn notification_duration(&self) -> Duration {
        Duration::from_millis(self.notifications.display_ms)
    }
}
