//! Configuration module for modhost.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;

use crate::{ModhostError, Result};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Socket address built from `host` and `port`.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ModhostError::Config(format!("invalid server address: {e}")))
    }
}

/// Modpack storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one subdirectory per modpack.
    #[serde(default = "default_modpacks_path")]
    pub modpacks_path: String,
    /// Directory for in-flight uploads. Must share a filesystem with
    /// `modpacks_path`.
    #[serde(default = "default_temp_path")]
    pub temp_path: String,
    /// Maximum request body size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
    /// Also require the `token` header on file removal, modpack removal and
    /// archive upload.
    #[serde(default)]
    pub require_token_for_all_mutations: bool,
}

fn default_modpacks_path() -> String {
    "modpacks".to_string()
}

fn default_temp_path() -> String {
    "tempfiles".to_string()
}

fn default_max_upload_size() -> u64 {
    512
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            modpacks_path: default_modpacks_path(),
            temp_path: default_temp_path(),
            max_upload_size_mb: default_max_upload_size(),
            require_token_for_all_mutations: false,
        }
    }
}

impl StorageConfig {
    /// Maximum request body size in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        usize::try_from(self.max_upload_size_mb.saturating_mul(1024 * 1024)).unwrap_or(usize::MAX)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/modhost.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ModhostError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    ///
    /// Ignored overrides are logged, so install logging first if they matter.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        for warning in config.apply_env_overrides() {
            tracing::warn!("{}", warning);
        }
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ModhostError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `MODHOST_PORT`: Override the listen port
    /// - `MODHOST_MODPACKS_PATH`: Override the modpack directory
    /// - `MODHOST_TEMP_PATH`: Override the upload staging directory
    ///
    /// Returns a message for every override that was ignored.
    pub fn apply_env_overrides(&mut self) -> Vec<String> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Vec<String> {
        let mut ignored = Vec::new();
        if let Some(port) = lookup("MODHOST_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => ignored.push(format!("Ignoring invalid MODHOST_PORT: {port:?}")),
            }
        }
        if let Some(path) = lookup("MODHOST_MODPACKS_PATH") {
            if !path.is_empty() {
                self.storage.modpacks_path = path;
            }
        }
        if let Some(path) = lookup("MODHOST_TEMP_PATH") {
            if !path.is_empty() {
                self.storage.temp_path = path;
            }
        }
        ignored
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.server.socket_addr()?;
        if self.storage.modpacks_path.is_empty() || self.storage.temp_path.is_empty() {
            return Err(ModhostError::Config(
                "storage.modpacks_path and storage.temp_path must be set".to_string(),
            ));
        }
        if self.storage.max_upload_size_mb == 0 {
            return Err(ModhostError::Config(
                "storage.max_upload_size_mb must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
