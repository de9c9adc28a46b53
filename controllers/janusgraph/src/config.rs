//! Controller configuration loaded from environment variables.

use crate::error::ControllerError;
use std::env;
use std::time::Duration;

/// Runtime configuration for the Janusgraph Controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Namespace to watch (`WATCH_NAMESPACE`); all namespaces when unset
    pub namespace: Option<String>,
    /// Maximum concurrent reconciliations (`RECONCILE_CONCURRENCY`)
    pub concurrency: u16,
    /// Debounce applied to incoming events (`RECONCILE_DEBOUNCE_SECS`)
    pub debounce: Duration,
    /// First requeue delay after an error (`ERROR_BACKOFF_MIN_SECS`)
    pub backoff_min_secs: u64,
    /// Cap on the requeue delay after repeated errors (`ERROR_BACKOFF_MAX_SECS`)
    pub backoff_max_secs: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            concurrency: 3,
            debounce: Duration::ZERO,
            backoff_min_secs: 5,
            backoff_max_secs: 300,
        }
    }
}

impl ControllerConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which returns the value of a variable if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ControllerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let namespace = lookup("WATCH_NAMESPACE").filter(|ns| !ns.trim().is_empty());
        let concurrency = parse_var(&lookup, "RECONCILE_CONCURRENCY", defaults.concurrency)?;
        let debounce_secs = parse_var(&lookup, "RECONCILE_DEBOUNCE_SECS", defaults.debounce.as_secs())?;
        let backoff_min_secs = parse_var(&lookup, "ERROR_BACKOFF_MIN_SECS", defaults.backoff_min_secs)?;
        let backoff_max_secs = parse_var(&lookup, "ERROR_BACKOFF_MAX_SECS", defaults.backoff_max_secs)?;

        if concurrency == 0 {
            return Err(ControllerError::InvalidConfig(
                "RECONCILE_CONCURRENCY must be greater than 0".to_string(),
            ));
        }
        if backoff_min_secs == 0 {
            return Err(ControllerError::InvalidConfig(
                "ERROR_BACKOFF_MIN_SECS must be greater than 0".to_string(),
            ));
        }
        if backoff_max_secs < backoff_min_secs {
            return Err(ControllerError::InvalidConfig(format!(
                "ERROR_BACKOFF_MAX_SECS ({backoff_max_secs}) must not be less than ERROR_BACKOFF_MIN_SECS ({backoff_min_secs})"
            )));
        }

        Ok(Self {
            namespace,
            concurrency,
            debounce: Duration::from_secs(debounce_secs),
            backoff_min_secs,
            backoff_max_secs,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ControllerError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e| {
            ControllerError::InvalidConfig(format!("{key}={raw:?} is not valid: {e}"))
        }),
        None => Ok(default),
    }
}
