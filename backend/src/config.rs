use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::domain::notification_service::EmailConfig;

/// Application configuration, loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind_address: String,
    pub database_url: String,
    /// Origin of the dashboard allowed to call this API
    pub cors_origin: String,
    pub email: EmailConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            database_url: "sqlite:wellness.db".to_string(),
            cors_origin: "http://localhost:8080".to_string(),
            email: EmailConfig::default(),
        }
    }
}

pub struct ConfigService;

impl ConfigService {
    pub fn load_config(config_path: &Path) -> Result<AppConfig> {
        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let config: AppConfig =
            toml::from_str(&config_content).with_context(|| "Failed to parse config TOML")?;

        Ok(config)
    }

    pub fn load_config_or_default(config_path: &Path) -> AppConfig {
        match Self::load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load config from {:?}: {}", config_path, e);
                info!("Using default config (email notifications disabled)");
                AppConfig::default()
            }
        }
    }
}
