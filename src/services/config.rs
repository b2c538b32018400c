use crate::error::ConfigError;
use crate::models::config::AppConfig;
use crate::services::weather::BASE_URL_ENV;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration manager for app settings
pub struct ConfigManager {
    config_dir: PathBuf,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a manager for the platform config directory (`<config>/thermocheck`).
    ///
    /// This will create the config directory if it doesn't exist.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join("thermocheck");

        Self::with_dir(config_dir)
    }

    /// Create a manager rooted at an explicit directory
    pub fn with_dir(config_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let config_dir = config_dir.into();
        create_dir(&config_dir)?;
        let config_path = config_dir.join("config.json");

        Ok(Self {
            config_dir,
            config_path,
        })
    }

    /// Save configuration to disk
    pub fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        create_dir(&self.config_dir)?;

        let json = serde_json::to_string_pretty(config)?;

        fs::write(&self.config_path, json).map_err(|source| ConfigError::Io {
            path: self.config_path.clone(),
            source,
        })?;

        tracing::info!(path = %self.config_path.display(), "Saved config");
        Ok(())
    }

    /// Load configuration from disk
    ///
    /// If config file doesn't exist, returns default configuration
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        if !self.config_exists() {
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_path).map_err(|source| ConfigError::Io {
            path: self.config_path.clone(),
            source,
        })?;

        Ok(serde_json::from_str(&content)?)
    }

    /// Load configuration and apply environment overrides
    pub fn load_effective(&self) -> Result<AppConfig, ConfigError> {
        let mut config = self.load()?;
        config.apply_overrides(std::env::var(BASE_URL_ENV).ok());
        Ok(config)
    }

    /// Get the config file path
    pub fn config_file_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Check if config file exists
    pub fn config_exists(&self) -> bool {
        self.config_path.exists()
    }
}

fn create_dir(dir: &Path) -> Result<(), ConfigError> {
    fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
        path: dir.to_path_buf(),
        source,
    })
}
