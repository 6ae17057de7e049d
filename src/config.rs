use std::time::Duration;
use thiserror::Error;

use crate::room::SweepConfig;

pub const BIND_ADDR_VAR: &str = "MUC_BIND_ADDR";
pub const SERVICE_ADDRESS_VAR: &str = "MUC_SERVICE_ADDRESS";
pub const SWEEP_INTERVAL_VAR: &str = "MUC_SWEEP_INTERVAL_MS";
pub const PURGE_TIMEOUT_VAR: &str = "MUC_PURGE_TIMEOUT_MS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Process configuration, read from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Address of the conference service the protocol session is bound to
    pub service_address: String,
    pub sweep: SweepConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            service_address: "conference.localhost".to_string(),
            sweep: SweepConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup, falling back to defaults for unset keys
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let sweep = SweepConfig {
            sweep_interval: match lookup(SWEEP_INTERVAL_VAR) {
                Some(raw) => parse_millis(SWEEP_INTERVAL_VAR, &raw)?,
                None => defaults.sweep.sweep_interval,
            },
            purge_timeout: match lookup(PURGE_TIMEOUT_VAR) {
                Some(raw) => parse_millis(PURGE_TIMEOUT_VAR, &raw)?,
                None => defaults.sweep.purge_timeout,
            },
        };

        Ok(Self {
            bind_addr: lookup(BIND_ADDR_VAR).unwrap_or(defaults.bind_addr),
            service_address: lookup(SERVICE_ADDRESS_VAR).unwrap_or(defaults.service_address),
            sweep,
        })
    }
}

fn parse_millis(key: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason| ConfigError::Invalid {
        key,
        value: raw.to_string(),
        reason,
    };

    match raw.trim().parse::<u64>() {
        Ok(0) => Err(invalid("must be greater than zero")),
        Ok(ms) => Ok(Duration::from_millis(ms)),
        Err(_) => Err(invalid("expected milliseconds")),
    }
}
