//! Process configuration read once from the environment.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const HOST_ENV: &str = "DEXLENS_HOST";
pub const PORT_ENV: &str = "DEXLENS_PORT";
pub const MAX_INSTANCES_ENV: &str = "DEXLENS_MAX_INSTANCES";
pub const PROVIDER_ENV: &str = "DEXLENS_PROVIDER";

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8651;
pub const DEFAULT_MAX_INSTANCES: usize = 4;
pub const DEFAULT_PROVIDER: &str = "snapshot";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: '{value}' ({reason})")]
    InvalidValue { var: &'static str, value: String, reason: String },
}

/// Where the operations are exposed and how many programs may stay loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on simultaneously loaded program instances (at least 1).
    pub max_instances: usize,
    /// Provider used when none is named explicitly.
    pub provider: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_instances: DEFAULT_MAX_INSTANCES,
            provider: DEFAULT_PROVIDER.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Read from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read through `lookup`, falling back to defaults for unset variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(host) = lookup(HOST_ENV).filter(|h| !h.trim().is_empty()) {
            config.host = host.trim().to_string();
        }
        if let Some(port) = lookup(PORT_ENV) {
            config.port =
                port.trim().parse::<u16>().map_err(|e| invalid(PORT_ENV, &port, format!("{e}")))?;
        }
        if let Some(max) = lookup(MAX_INSTANCES_ENV) {
            let parsed = max
                .trim()
                .parse::<usize>()
                .map_err(|e| invalid(MAX_INSTANCES_ENV, &max, format!("{e}")))?;
            if parsed == 0 {
                return Err(invalid(MAX_INSTANCES_ENV, &max, "must be at least 1".to_string()));
            }
            config.max_instances = parsed;
        }
        if let Some(provider) = lookup(PROVIDER_ENV).filter(|p| !p.trim().is_empty()) {
            config.provider = provider.trim().to_string();
        }
        Ok(config)
    }

    /// `host:port` for binding or display.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn invalid(var: &'static str, value: &str, reason: String) -> ConfigError {
    ConfigError::InvalidValue { var, value: value.to_string(), reason }
}
