use crate::api::constants::{API_VERSION, DEFAULT_MAX_PAGE_SIZE};
use crate::api::error::{WebApiError, WebApiResult};
use crate::api::logging::LoggingConfig;
use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_HOST: &str = "DYNAMICS_HOST";
pub const ENV_ACCESS_TOKEN: &str = "DYNAMICS_ACCESS_TOKEN";
pub const ENV_MAX_PAGE_SIZE: &str = "DYNAMICS_MAX_PAGE_SIZE";
pub const ENV_API_VERSION: &str = "DYNAMICS_API_VERSION";

/// Per-call client settings; every call works from a snapshot of these
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Page size sent in the `Prefer` header of list retrievals
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

fn default_max_page_size() -> u32 {
    DEFAULT_MAX_PAGE_SIZE
}

fn default_api_version() -> String {
    API_VERSION.to_string()
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            max_page_size: default_max_page_size(),
            api_version: default_api_version(),
        }
    }
}

impl ClientSettings {
    pub fn with_max_page_size(mut self, max_page_size: u32) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn validate(&self) -> WebApiResult<()> {
        if self.max_page_size == 0 {
            return Err(WebApiError::Config("max_page_size must be greater than zero".to_string()));
        }
        if self.api_version.trim().is_empty() {
            return Err(WebApiError::Config("api_version must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Where and how to connect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Organization URL, e.g. `https://org.crm.dynamics.com`
    #[serde(default)]
    pub host: Option<String>,
    /// Bearer token sent with every request
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: None,
            access_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub settings: ClientSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "linux") {
            // Use XDG config directory on Linux
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join("xrm-webapi")
        } else {
            // Use home directory with dot prefix on Windows/Mac
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".xrm-webapi")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config file (if any), then overlay the environment
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        let mut config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            info!("Config file doesn't exist, using defaults");
            Self::default()
        };

        dotenvy::dotenv().ok();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from: {:?}", path);

        let config_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::from_toml_str(&config_content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.settings.validate()?;
        Ok(config)
    }

    /// Overlay values found through `lookup` (normally the process environment)
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST) {
            self.connection.host = Some(host);
        }
        if let Some(token) = lookup(ENV_ACCESS_TOKEN) {
            self.connection.access_token = Some(token);
        }
        if let Some(size) = lookup(ENV_MAX_PAGE_SIZE) {
            self.settings.max_page_size = size
                .trim()
                .parse()
                .with_context(|| format!("{} must be a positive integer, got '{}'", ENV_MAX_PAGE_SIZE, size))?;
        }
        if let Some(version) = lookup(ENV_API_VERSION) {
            self.settings.api_version = version;
        }

        self.settings.validate()?;
        Ok(())
    }
}
