// crates/shelfmark-config/src/config.rs
// ============================================================================
// Module: Shelfmark Configuration
// Description: Configuration loading and validation for Shelfmark.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: shelfmark-remote, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The file names two endpoint tables, `[source]` and `[target]`, and every
//! field is validated before a client configuration is handed out. Missing or
//! invalid configuration fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use shelfmark_remote::HttpArchiveConfig;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "shelfmark.toml";
/// Environment variable used to override the config path.
const CONFIG_ENV_VAR: &str = "SHELFMARK_CONFIG";
/// Maximum configuration file size in bytes.
const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum endpoint URL length.
const MAX_URL_LENGTH: usize = 2048;
/// Maximum username length.
const MAX_USERNAME_LENGTH: usize = 128;
/// Minimum request timeout in milliseconds.
const MIN_TIMEOUT_MS: u64 = 100;
/// Maximum request timeout in milliseconds.
const MAX_TIMEOUT_MS: u64 = 120_000;
/// Default request timeout in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// Maximum allowed response size cap in bytes.
const MAX_RESPONSE_BYTES_LIMIT: usize = 16 * 1024 * 1024;
/// Default response size cap in bytes.
const DEFAULT_MAX_RESPONSE_BYTES: usize = 1024 * 1024;
/// Default user agent for outbound requests.
const DEFAULT_USER_AGENT: &str = "shelfmark/0.1";

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Shelfmark synchronization configuration.
///
/// # Invariants
/// - Both endpoint tables are present; there is no implicit endpoint.
/// - Field values outside the constant limits fail validation.
#[derive(Debug, Clone, Deserialize)]
pub struct ShelfmarkConfig {
    /// Endpoint the synchronizer resolves canonical records from.
    pub source: EndpointConfig,
    /// Endpoint the synchronizer writes container updates to.
    pub target: EndpointConfig,
}

impl ShelfmarkConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// The path is taken from the argument, then the `SHELFMARK_CONFIG`
    /// environment variable, then the default filename.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.source.validate("source")?;
        self.target.validate("target")?;
        Ok(())
    }
}

/// One archival service endpoint table.
///
/// # Invariants
/// - `base_url`, `username`, and `password` carry no usable defaults.
/// - Omitted limit fields fall back to the constant defaults.
#[derive(Clone, Deserialize)]
pub struct EndpointConfig {
    /// Service base URL, scheme and host included.
    pub base_url: String,
    /// Username presented at session login.
    pub username: String,
    /// Password presented at session login.
    pub password: String,
    /// Allow cleartext HTTP (disabled by default).
    #[serde(default)]
    pub allow_http: bool,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Maximum response size allowed, in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
    /// User agent string for outbound requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl EndpointConfig {
    /// Validates one endpoint table, naming it in every error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when any field is out of range.
    fn validate(&self, section: &str) -> Result<(), ConfigError> {
        let base_url = self.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::Invalid(format!("{section}.base_url must be set")));
        }
        if base_url.len() > MAX_URL_LENGTH {
            return Err(ConfigError::Invalid(format!("{section}.base_url exceeds max length")));
        }
        let cleartext = base_url.starts_with("http://");
        if !base_url.starts_with("https://") && !(cleartext && self.allow_http) {
            return Err(ConfigError::Invalid(format!(
                "{section}.base_url must use https or opt into allow_http"
            )));
        }
        if self.username.trim().is_empty() {
            return Err(ConfigError::Invalid(format!("{section}.username must be set")));
        }
        if self.username.len() > MAX_USERNAME_LENGTH {
            return Err(ConfigError::Invalid(format!("{section}.username exceeds max length")));
        }
        if self.password.is_empty() {
            return Err(ConfigError::Invalid(format!("{section}.password must be set")));
        }
        if self.timeout_ms < MIN_TIMEOUT_MS || self.timeout_ms > MAX_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "{section}.timeout_ms must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}"
            )));
        }
        if self.max_response_bytes == 0 || self.max_response_bytes > MAX_RESPONSE_BYTES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "{section}.max_response_bytes out of range"
            )));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid(format!("{section}.user_agent must be set")));
        }
        Ok(())
    }

    /// Maps this endpoint table onto the HTTP client configuration.
    #[must_use]
    pub fn client_config(&self) -> HttpArchiveConfig {
        HttpArchiveConfig {
            base_url: self.base_url.trim().to_string(),
            username: self.username.clone(),
            password: self.password.clone(),
            allow_http: self.allow_http,
            timeout_ms: self.timeout_ms,
            max_response_bytes: self.max_response_bytes,
            user_agent: self.user_agent.clone(),
        }
    }
}

impl fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("allow_http", &self.allow_http)
            .field("timeout_ms", &self.timeout_ms)
            .field("max_response_bytes", &self.max_response_bytes)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the caller or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Default request timeout applied when an endpoint omits `timeout_ms`.
const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Default response size cap applied when an endpoint omits `max_response_bytes`.
const fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}

/// Default user agent applied when an endpoint omits `user_agent`.
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
