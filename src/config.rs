//! Configuration management for RAX Locker
//!
//! Separates startup configuration (network, storage locations, sessions)
//! from the quota limits enforced on every mutating request.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Complete server configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServerConfig {
    #[serde(flatten)]
    pub startup: StartupConfig,

    #[serde(flatten)]
    pub limits: LimitsConfig,
}

/// How the per-root disk usage is measured
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiskUsageMode {
    /// Sum file sizes with an in-process tree walk
    #[default]
    Walk,
    /// Shell out to `du -sk` and scale kilobytes by 1000
    Du,
}

/// Configuration loaded once when the server starts
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StartupConfig {
    // ═══ NETWORK (Environment Override Supported) ═══
    /// IP address to bind the request listener
    pub bind_address: String,

    /// Port for the request listener
    pub port: u16,

    /// Maximum concurrent client connections
    pub max_clients: usize,

    /// Longest accepted request line, in bytes
    pub max_request_bytes: usize,

    // ═══ STORAGE ═══
    /// Directory holding every account root
    pub storage_root: String,

    /// SQLite database file, or `:memory:`
    pub database_path: String,

    /// Disk usage measurement strategy
    pub disk_usage: DiskUsageMode,

    // ═══ SESSIONS ═══
    /// Lifetime of a session token in seconds
    pub session_ttl_secs: u64,
}

/// Quota and structure limits
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LimitsConfig {
    /// Bytes a single account may store
    pub user_quota_bytes: u64,

    /// Bytes all accounts together may store, checked at signup
    pub total_quota_bytes: u64,

    /// Fixed cost charged per account in the aggregate check
    pub account_overhead_bytes: u64,

    /// Nominal cost of creating an empty directory
    pub directory_cost_bytes: u64,

    pub max_name_length: usize,
    pub max_directory_depth: usize,
    pub max_subdirectories: usize,
    pub max_username_length: usize,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8080,
            max_clients: 64,
            max_request_bytes: 16 * 1024 * 1024,
            storage_root: "./server_root".to_string(),
            database_path: "./locker.db".to_string(),
            disk_usage: DiskUsageMode::Walk,
            session_ttl_secs: 600,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            user_quota_bytes: 5_000_000,
            total_quota_bytes: 100_000_000,
            account_overhead_bytes: 4096,
            directory_cost_bytes: 5000,
            max_name_length: 25,
            max_directory_depth: 20,
            max_subdirectories: 20,
            max_username_length: 32,
        }
    }
}

impl ServerConfig {
    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        // Try the packaged path first, then the development path
        let config_paths = ["rax-locker/config", "config"];

        let mut last_error = None;

        for config_path in &config_paths {
            match Self::load_from(config_path) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    last_error = Some(e);
                    continue;
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            config::ConfigError::Message(format!(
                "Failed to load config.toml from any location. Tried: {config_paths:?}"
            ))
        }))
    }

    /// Load configuration from a single file (extension optional)
    pub fn load_from(path: &str) -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("RAX_LOCKER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.startup.port == 0 {
            return Err(config::ConfigError::Message("port cannot be 0".into()));
        }

        if self.startup.storage_root.is_empty() {
            return Err(config::ConfigError::Message(
                "storage_root cannot be empty".into(),
            ));
        }

        if self.startup.database_path.is_empty() {
            return Err(config::ConfigError::Message(
                "database_path cannot be empty".into(),
            ));
        }

        if self.startup.max_clients == 0 {
            return Err(config::ConfigError::Message(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.startup.session_ttl_secs == 0 {
            return Err(config::ConfigError::Message(
                "session_ttl_secs must be greater than 0".into(),
            ));
        }

        if self.limits.user_quota_bytes == 0 || self.limits.total_quota_bytes == 0 {
            return Err(config::ConfigError::Message(
                "quotas must be greater than 0".into(),
            ));
        }

        if self.limits.total_quota_bytes < self.limits.user_quota_bytes {
            return Err(config::ConfigError::Message(
                "total_quota_bytes must be at least user_quota_bytes".into(),
            ));
        }

        Ok(())
    }
}

impl StartupConfig {
    /// Get bind address and port as a socket address string
    pub fn listen_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Get storage root as PathBuf
    pub fn storage_root_path(&self) -> PathBuf {
        PathBuf::from(&self.storage_root)
    }

    /// Get session lifetime as Duration
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}
