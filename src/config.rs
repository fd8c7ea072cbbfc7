//! Connection pool and logging configuration
//!
//! Pool settings come from a JSON file or from the environment:
//! - `DATABASE_URL` (required)
//! - `DOCSHIM_MAX_CONNECTIONS` (default 10)
//! - `DOCSHIM_MIN_CONNECTIONS` (default 0)
//! - `DOCSHIM_ACQUIRE_TIMEOUT_SECS` (default 30)

use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CompatError, CompatResult};

/// Connection pool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// PostgreSQL connection URL
    pub database_url: String,

    /// Upper bound on pooled connections (default: 10)
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connections kept open while idle (default: 0)
    #[serde(default)]
    pub min_connections: u32,

    /// Seconds to wait for a free connection (default: 30)
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout_secs() -> u64 {
    30
}

impl PoolConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: default_max_connections(),
            min_connections: 0,
            acquire_timeout_secs: default_acquire_timeout_secs(),
        }
    }

    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> CompatResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CompatError::config(format!("Failed to read config: {}", e)))?;

        let config: PoolConfig = serde_json::from_str(&content)
            .map_err(|e| CompatError::config(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the process environment
    pub fn from_env() -> CompatResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> CompatResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| CompatError::config("DATABASE_URL is not set"))?;

        let mut config = Self::new(database_url);
        if let Some(v) = parse_var(&lookup, "DOCSHIM_MAX_CONNECTIONS")? {
            config.max_connections = v;
        }
        if let Some(v) = parse_var(&lookup, "DOCSHIM_MIN_CONNECTIONS")? {
            config.min_connections = v;
        }
        if let Some(v) = parse_var(&lookup, "DOCSHIM_ACQUIRE_TIMEOUT_SECS")? {
            config.acquire_timeout_secs = v;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> CompatResult<()> {
        if self.database_url.trim().is_empty() {
            return Err(CompatError::config("database_url must not be empty"));
        }
        if self.max_connections == 0 {
            return Err(CompatError::config("max_connections must be > 0"));
        }
        if self.min_connections > self.max_connections {
            return Err(CompatError::config(format!(
                "min_connections ({}) exceeds max_connections ({})",
                self.min_connections, self.max_connections
            )));
        }
        if self.acquire_timeout_secs == 0 {
            return Err(CompatError::config("acquire_timeout_secs must be > 0"));
        }
        Ok(())
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> CompatResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| CompatError::config(format!("{} is not a valid number: {}", key, raw))),
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default filter directive when `RUST_LOG` is unset (default: "info")
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}
