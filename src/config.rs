//! Client settings
//!
//! Settings are read from YAML. Every field is optional; missing fields take
//! the defaults below.
//!
//! ```yaml
//! base_url: https://api.dribbble.com
//! access_token: abc123
//! per_page: 30
//! state_path: ~/.cache/popular.json
//! http:
//!   timeout_seconds: 10
//!   max_retries: 2
//!   backoff:
//!     type: linear
//!     initial_ms: 250
//!     max_ms: 5000
//! ```

use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, DEFAULT_BASE_URL};
use crate::types::{BackoffType, OptionStringExt, DEFAULT_PER_PAGE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides `access_token`
pub const ACCESS_TOKEN_ENV: &str = "DRIBBBLE_ACCESS_TOKEN";

// ============================================================================
// Settings
// ============================================================================

/// Top-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// API root
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// OAuth access token, sent as a bearer token
    #[serde(default)]
    pub access_token: Option<String>,

    /// HTTP client behaviour
    #[serde(default)]
    pub http: HttpSettings,

    /// Page size for new pagers
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Default state file for pagers
    #[serde(default)]
    pub state_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            access_token: None,
            http: HttpSettings::default(),
            per_page: default_per_page(),
            state_path: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

impl Settings {
    /// Load settings from a YAML file, then apply environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("failed to read settings {}: {e}", path.display()))
        })?;
        let mut settings = Self::from_yaml(&contents)?;
        settings.apply_env();
        Ok(settings)
    }

    /// Parse settings from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Replace `access_token` with `DRIBBBLE_ACCESS_TOKEN` when it is set
    pub fn apply_env(&mut self) {
        if let Some(token) = std::env::var(ACCESS_TOKEN_ENV).ok().none_if_empty() {
            self.access_token = Some(token);
        }
    }

    /// HTTP client configuration for these settings
    pub fn http_client_config(&self) -> HttpClientConfig {
        let backoff = &self.http.backoff;
        let mut builder = HttpClientConfig::builder()
            .base_url(self.base_url.trim_end_matches('/'))
            .timeout(Duration::from_secs(self.http.timeout_seconds))
            .max_retries(self.http.max_retries)
            .backoff(
                backoff.backoff_type,
                Duration::from_millis(backoff.initial_ms),
                Duration::from_millis(backoff.max_ms),
            );

        if let Some(token) = self.access_token.as_deref().filter(|t| !t.is_empty()) {
            builder = builder.bearer_token(token);
        }

        builder.build()
    }
}

// ============================================================================
// HTTP Settings
// ============================================================================

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum number of retries
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Retry backoff
    #[serde(default)]
    pub backoff: BackoffSettings,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            backoff: BackoffSettings::default(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

/// Backoff settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffSettings {
    /// Type of backoff
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_ms")]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

impl Default for BackoffSettings {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::Exponential,
            initial_ms: default_initial_ms(),
            max_ms: default_max_ms(),
        }
    }
}

fn default_initial_ms() -> u64 {
    100
}

fn default_max_ms() -> u64 {
    60000
}
