//! Configuration Module
//!
//! Handles loading cache and demo settings from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{DEFAULT_TTL, INVALIDATION_OFFSET};
use crate::error::{CacheError, Result};

/// Default simulated database latency for the demo binary, in milliseconds.
pub const DEFAULT_DEMO_LATENCY_MS: u64 = 3000;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// TTL applied when the caller does not pass one
    pub default_ttl: Duration,
    /// How far into the past `invalidate` pushes an entry's expiry
    pub invalidation_offset: Duration,
    /// Simulated latency of the mock database used by the demo
    pub demo_latency: Duration,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds (default: 3600)
    /// - `CACHE_INVALIDATION_OFFSET` - Invalidation offset in seconds (default: 60)
    /// - `DEMO_LATENCY_MS` - Mock database latency in milliseconds (default: 3000)
    ///
    /// Unset variables fall back to their defaults; set but unparsable ones
    /// are an error.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Builds a Config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            default_ttl: parse_var(&lookup, "CACHE_DEFAULT_TTL")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.default_ttl),
            invalidation_offset: parse_var(&lookup, "CACHE_INVALIDATION_OFFSET")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.invalidation_offset),
            demo_latency: parse_var(&lookup, "DEMO_LATENCY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.demo_latency),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL,
            invalidation_offset: INVALIDATION_OFFSET,
            demo_latency: Duration::from_millis(DEFAULT_DEMO_LATENCY_MS),
        }
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| CacheError::InvalidConfig { var, value: raw }),
        None => Ok(None),
    }
}
