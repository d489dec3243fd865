use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::survey::DEFAULT_PAGE_SIZE;
use crate::survey::table::DisplayZone;

/// Environment variables that override the config file
pub mod env_keys {
    pub const BASE_URL: &str = "SURVEY_API_BASE_URL";
    pub const TOKEN: &str = "SURVEY_API_TOKEN";
    pub const SECRET: &str = "SURVEY_API_SECRET";
    pub const PROXY: &str = "SURVEY_API_PROXY";
    pub const TIMEZONE: &str = "SURVEY_TIMEZONE";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub api_version: String,
    /// HTTP Basic user name
    pub api_token: Option<String>,
    /// HTTP Basic password
    pub api_token_secret: Option<String>,
    pub proxy: Option<String>,
    pub page_size: usize,
    /// IANA zone for exported timestamps; the local zone when unset
    pub timezone: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://api.smartsurvey.io".to_string(),
            api_version: "v1".to_string(),
            api_token: None,
            api_token_secret: None,
            proxy: None,
            page_size: DEFAULT_PAGE_SIZE,
            timezone: None,
            request_timeout_secs: 60,
        }
    }
}

impl Config {
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "linux") {
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join("survey-export")
        } else {
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".survey-export")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, falling back to defaults when the file is absent
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        if !config_path.exists() {
            info!("Config file doesn't exist, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from: {:?}", path);

        let config_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::parse(&config_content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`, keyed by the names in [`env_keys`]
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(base_url) = lookup(env_keys::BASE_URL) {
            debug!("Base URL overridden from environment");
            self.base_url = base_url;
        }
        if let Some(token) = lookup(env_keys::TOKEN) {
            self.api_token = Some(token);
        }
        if let Some(secret) = lookup(env_keys::SECRET) {
            self.api_token_secret = Some(secret);
        }
        if let Some(proxy) = lookup(env_keys::PROXY) {
            self.proxy = Some(proxy);
        }
        if let Some(timezone) = lookup(env_keys::TIMEZONE) {
            self.timezone = Some(timezone);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            anyhow::bail!("page_size must be at least 1");
        }
        self.display_zone()?;
        Ok(())
    }

    /// Versioned API root, e.g. `https://api.smartsurvey.io/v1`
    pub fn server(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), self.api_version)
    }

    pub fn display_zone(&self) -> Result<DisplayZone> {
        match &self.timezone {
            None => Ok(DisplayZone::Local),
            Some(name) => name
                .parse::<chrono_tz::Tz>()
                .map(DisplayZone::Named)
                .map_err(|e| anyhow::anyhow!("Unknown timezone '{}': {}", name, e)),
        }
    }
}
