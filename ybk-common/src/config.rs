//! Configuration loading and validation
//!
//! Two layers, both built once at startup and passed by reference:
//! 1. [`Settings`]: named values from the process environment (image host
//!    account, credentials, app title, base URL, debug flag).
//! 2. [`BootstrapConfig`]: optional TOML file for the roster service (port,
//!    roster location, paging and debounce tuning, log level).
//!
//! Command-line arguments override both; compiled defaults fill the gaps.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::{Error, Result};

/// Title used when `YEARBOOK_APP_TITLE` is unset
pub const DEFAULT_APP_TITLE: &str = "Buku Angkatan 2025";

/// Base URL used when `YEARBOOK_BASE_URL` is unset
pub const DEFAULT_BASE_URL: &str = "http://localhost:5173";

/// Environment variable naming the bootstrap TOML file
pub const CONFIG_PATH_VAR: &str = "YEARBOOK_CONFIG";

/// Named environment settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Setting {
    CloudName,
    CloudApiKey,
    CloudApiSecret,
    AppTitle,
    BaseUrl,
    Debug,
}

impl Setting {
    /// Environment variable holding this setting
    pub fn env_var(&self) -> &'static str {
        match self {
            Setting::CloudName => "YEARBOOK_CLOUD_NAME",
            Setting::CloudApiKey => "YEARBOOK_CLOUD_API_KEY",
            Setting::CloudApiSecret => "YEARBOOK_CLOUD_API_SECRET",
            Setting::AppTitle => "YEARBOOK_APP_TITLE",
            Setting::BaseUrl => "YEARBOOK_BASE_URL",
            Setting::Debug => "YEARBOOK_DEBUG",
        }
    }
}

/// Settings the roster service needs for image URLs
pub const SERVICE_REQUIRED: [Setting; 2] = [Setting::CloudName, Setting::CloudApiKey];

/// Settings the photo matcher needs to call the image host API
pub const BATCH_REQUIRED: [Setting; 3] = [
    Setting::CloudName,
    Setting::CloudApiKey,
    Setting::CloudApiSecret,
];

/// Image host account and credentials
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CloudSettings {
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
}

// Credentials stay out of logs
impl std::fmt::Debug for CloudSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudSettings")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key.as_ref().map(|_| "<set>"))
            .field("api_secret", &self.api_secret.as_ref().map(|_| "<set>"))
            .finish()
    }
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSettings {
    pub title: String,
    pub base_url: String,
    pub debug: bool,
}

/// Environment settings, constructed once at process start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub cloud: CloudSettings,
    pub app: AppSettings,
}

impl Settings {
    /// Read settings from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |setting: Setting| lookup(setting.env_var()).filter(|v| !v.trim().is_empty());

        Self {
            cloud: CloudSettings {
                cloud_name: get(Setting::CloudName),
                api_key: get(Setting::CloudApiKey),
                api_secret: get(Setting::CloudApiSecret),
            },
            app: AppSettings {
                title: get(Setting::AppTitle).unwrap_or_else(|| DEFAULT_APP_TITLE.to_string()),
                base_url: get(Setting::BaseUrl).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                debug: get(Setting::Debug).as_deref() == Some("true"),
            },
        }
    }

    fn is_set(&self, setting: Setting) -> bool {
        match setting {
            Setting::CloudName => self.cloud.cloud_name.is_some(),
            Setting::CloudApiKey => self.cloud.api_key.is_some(),
            Setting::CloudApiSecret => self.cloud.api_secret.is_some(),
            // Defaulted settings are always present
            Setting::AppTitle | Setting::BaseUrl | Setting::Debug => true,
        }
    }

    /// Environment variable names of every unset setting in `required`
    pub fn missing(&self, required: &[Setting]) -> Vec<String> {
        required
            .iter()
            .filter(|setting| !self.is_set(**setting))
            .map(|setting| setting.env_var().to_string())
            .collect()
    }

    /// Check that every setting in `required` is present
    pub fn validate(&self, required: &[Setting]) -> Result<()> {
        let missing = self.missing(required);
        if !missing.is_empty() {
            return Err(Error::MissingSettings(missing));
        }
        if self.app.debug {
            info!(
                cloud_name = ?self.cloud.cloud_name,
                base_url = %self.app.base_url,
                "✓ Environment configuration loaded"
            );
        }
        Ok(())
    }
}

/// Bootstrap configuration for the roster service, loaded from TOML
///
/// Every field is optional; absent values fall back to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct BootstrapConfig {
    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// Roster location: `http(s)://` URL or local file path
    #[serde(default)]
    pub roster_source: Option<String>,

    /// Profiles per page
    #[serde(default)]
    pub page_size: Option<usize>,

    /// Search debounce delay in milliseconds
    #[serde(default)]
    pub debounce_ms: Option<u64>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default)]
    pub level: Option<String>,
}

impl BootstrapConfig {
    /// Parse a bootstrap file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load the bootstrap file, tolerating its absence
    ///
    /// Resolution order: explicit path, `YEARBOOK_CONFIG`, then
    /// `<config dir>/yearbook/config.toml`. An explicitly named file that
    /// cannot be read is an error; a missing default file is not.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path).map_err(|e| {
                Error::Config(format!("Failed to load {}: {}", path.display(), e))
            });
        }

        if let Ok(path) = std::env::var(CONFIG_PATH_VAR) {
            let path = PathBuf::from(path);
            return Self::from_file(&path).map_err(|e| {
                Error::Config(format!("Failed to load {}: {}", path.display(), e))
            });
        }

        match default_config_path() {
            Some(path) if path.exists() => {
                info!("Loading bootstrap config from {}", path.display());
                Self::from_file(&path)
            }
            _ => {
                warn!("No bootstrap config file found, using defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Platform config location, e.g. `~/.config/yearbook/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("yearbook").join("config.toml"))
}
