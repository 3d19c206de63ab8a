//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `MEDIHEALTH_*` environment overrides.

use crate::gateway::{GatewayConfig, SessionFile};
use crate::workflow::WorkflowConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub workflow: WorkflowSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Booking backend (Supabase project) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Project URL; empty means demo mode
    #[serde(default)]
    pub url: String,

    /// Public anon key
    #[serde(default)]
    pub anon_key: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// Token file for session recovery; empty disables persistence
    #[serde(default = "default_session_file")]
    pub session_file: String,

    pub email_redirect_to: Option<String>,
}

fn default_request_timeout() -> u64 {
    10_000
}

fn default_session_file() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("medihealth").join("session.json").to_string_lossy().to_string())
        .unwrap_or_else(|| "./medihealth_session.json".to_string())
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            request_timeout_ms: default_request_timeout(),
            session_file: default_session_file(),
            email_redirect_to: None,
        }
    }
}

impl BackendConfig {
    /// Whether any backend setting was supplied
    ///
    /// A half-filled pair still counts so the connect step can report it.
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty() || !self.anon_key.trim().is_empty()
    }

    pub fn session_file(&self) -> SessionFile {
        if self.session_file.trim().is_empty() {
            SessionFile::disabled()
        } else {
            SessionFile::new(&self.session_file)
        }
    }

    /// Settings for [`crate::gateway::SupabaseGateway::connect`]
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            url: self.url.trim().to_string(),
            anon_key: self.anon_key.trim().to_string(),
            request_timeout_ms: self.request_timeout_ms,
            email_redirect_to: self.email_redirect_to.clone(),
            session_file: self.session_file(),
        }
    }
}

/// Workflow tuning
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowSettings {
    /// Deadline for each backend call
    #[serde(default = "default_call_timeout")]
    pub call_timeout_ms: u64,
}

fn default_call_timeout() -> u64 {
    15_000
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            call_timeout_ms: default_call_timeout(),
        }
    }
}

impl WorkflowSettings {
    pub fn workflow_config(&self) -> WorkflowConfig {
        WorkflowConfig {
            call_timeout: Duration::from_millis(self.call_timeout_ms),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        for path in Self::search_paths() {
            if path.exists() {
                match Self::load_with_env(&path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Default config file locations, in lookup order
    pub fn search_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("medihealth").join("config.toml")),
            Some(PathBuf::from("/etc/medihealth/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply `MEDIHEALTH_*` overrides read through `lookup`
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Backend overrides
        if let Some(url) = lookup("MEDIHEALTH_BACKEND_URL") {
            self.backend.url = url;
        }
        if let Some(key) = lookup("MEDIHEALTH_BACKEND_KEY") {
            self.backend.anon_key = key;
        }
        if let Some(timeout) = lookup("MEDIHEALTH_REQUEST_TIMEOUT_MS") {
            if let Ok(ms) = timeout.parse() {
                self.backend.request_timeout_ms = ms;
            }
        }
        if let Some(path) = lookup("MEDIHEALTH_SESSION_FILE") {
            self.backend.session_file = path;
        }
        if let Some(redirect) = lookup("MEDIHEALTH_EMAIL_REDIRECT_TO") {
            self.backend.email_redirect_to = Some(redirect).filter(|r| !r.trim().is_empty());
        }

        // Workflow overrides
        if let Some(timeout) = lookup("MEDIHEALTH_CALL_TIMEOUT_MS") {
            if let Ok(ms) = timeout.parse() {
                self.workflow.call_timeout_ms = ms;
            }
        }

        // Logging overrides
        if let Some(level) = lookup("MEDIHEALTH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("MEDIHEALTH_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Please enter both backend URL and access key.")]
    MissingBackend,
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# MediHealth Configuration
#
# Environment variables override these settings:
# - MEDIHEALTH_BACKEND_URL
# - MEDIHEALTH_BACKEND_KEY
# - MEDIHEALTH_REQUEST_TIMEOUT_MS
# - MEDIHEALTH_SESSION_FILE
# - MEDIHEALTH_EMAIL_REDIRECT_TO
# - MEDIHEALTH_CALL_TIMEOUT_MS
# - MEDIHEALTH_LOG_LEVEL
# - MEDIHEALTH_LOG_FORMAT

[backend]
# Supabase project URL; leave empty to run in demo mode
url = ""

# Public anon key of the project
anon_key = ""

# HTTP request timeout (ms)
request_timeout_ms = 10000

# Where sign-in tokens are kept between runs; empty disables
# session_file = "~/.local/share/medihealth/session.json"

# Page confirmation emails link back to
# email_redirect_to = "https://clinic.example.com/"

[workflow]
# Deadline for each backend call (ms)
call_timeout_ms = 15000

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
