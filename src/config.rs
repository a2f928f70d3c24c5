//! Client configuration
//!
//! Settings come from `stackview.json` in the config directory, with the
//! backend URL overridable through `STACKVIEW_API_URL`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::{Result, StackViewError};

pub const CONFIG_FILE: &str = "stackview.json";
pub const API_URL_ENV: &str = "STACKVIEW_API_URL";
pub const DEFAULT_API_URL: &str = "http://localhost:8787";
const DEFAULT_RECONNECT_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewConfig {
    /// Backend base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Initial delay before the push channel reconnects
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconnect_delay_ms: Option<u64>,
}

impl ViewConfig {
    /// Default location: `<platform config dir>/stackview`
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("stackview"))
    }

    /// Load configuration from disk; a missing file yields defaults
    pub fn load(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(CONFIG_FILE);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;
        serde_json::from_str(&contents).map_err(|e| {
            StackViewError::Config(format!("Failed to parse {}: {}", config_path.display(), e))
        })
    }

    /// Save configuration to disk
    pub fn save(&self, config_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(config_dir)?;
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(config_dir.join(CONFIG_FILE), contents)?;
        Ok(())
    }

    /// Load from the default directory and apply environment overrides
    pub fn from_env() -> Result<Self> {
        let mut config = match Self::default_dir() {
            Some(dir) => Self::load(&dir)?,
            None => Self::default(),
        };
        config.apply_env(std::env::var(API_URL_ENV).ok());
        Ok(config)
    }

    /// Apply the value of `STACKVIEW_API_URL`, ignoring blanks
    pub fn apply_env(&mut self, api_url: Option<String>) {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            tracing::debug!("Using backend URL from {}: {}", API_URL_ENV, url);
            self.api_url = Some(url.trim().to_string());
        }
    }

    pub fn api_url(&self) -> Result<Url> {
        let raw = self.api_url.as_deref().unwrap_or(DEFAULT_API_URL);
        Ok(Url::parse(raw)?)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms.unwrap_or(DEFAULT_RECONNECT_DELAY_MS))
    }
}
