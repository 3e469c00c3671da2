//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use crate::application::errors::ConfigError;
use crate::infrastructure::storage::credentials::DEFAULT_CREDENTIAL_KEY;

pub const DEFAULT_IMAGE: &str = "/images/default-restaurant.png";

/// Client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub api: ApiConfig,
    pub images: ImageConfig,
    pub storage: StorageConfig,
    pub stores: StoreConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ImageConfig {
    /// Origin serving `/api/images`, `/api/files/image` and `/uploads`
    pub base_url: String,
    pub default_restaurant_image: String,
    pub default_review_image: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    File,
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub path: PathBuf,
    pub credential_key: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StoreConfig {
    pub page_size: u32,
    /// Restore `isFavorite` when a restaurant favorite toggle fails
    pub rollback_favorite_on_failure: bool,
    /// Reject a toggle while another one on the same id is in flight
    pub serialize_toggles: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8080/api".to_string(),
                timeout_secs: 15,
            },
            images: ImageConfig {
                base_url: "http://localhost:8080".to_string(),
                default_restaurant_image: DEFAULT_IMAGE.to_string(),
                default_review_image: DEFAULT_IMAGE.to_string(),
            },
            storage: StorageConfig {
                backend: StorageBackend::File,
                path: PathBuf::from(".restaurant-client"),
                credential_key: DEFAULT_CREDENTIAL_KEY.to_string(),
            },
            stores: StoreConfig {
                page_size: 10,
                rollback_favorite_on_failure: true,
                serialize_toggles: false,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_env() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    /// Environment overrides on top of whatever was loaded
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("RESTAURANT_API_URL") {
            self.api.base_url = url;
        }

        if let Ok(url) = std::env::var("RESTAURANT_IMAGE_URL") {
            self.images.base_url = url;
        }

        if let Ok(image) = std::env::var("RESTAURANT_DEFAULT_IMAGE") {
            self.images.default_restaurant_image = image.clone();
            self.images.default_review_image = image;
        }

        if let Ok(path) = std::env::var("RESTAURANT_STORAGE_PATH") {
            self.storage.path = PathBuf::from(path);
        }

        if let Ok(secs) = std::env::var("RESTAURANT_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                self.api.timeout_secs = secs;
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField("api.base-url".to_string()));
        }
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(format!(
                "api.base-url must be an http(s) URL: {}",
                self.api.base_url
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("api.timeout-secs must be positive".to_string()));
        }
        if self.stores.page_size == 0 {
            return Err(ConfigError::InvalidValue("stores.page-size must be positive".to_string()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }
}
