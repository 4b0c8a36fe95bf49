//! Configuration types

use crate::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default TTL for cached objects, in minutes.
pub const DEFAULT_TTL_MINUTES: u32 = 5;

/// Default outage window during which stale entries keep serving, in seconds.
pub const DEFAULT_RESILIENCE_SECONDS: u32 = 30;

/// Default number of identifiers resolved per backing-store query.
pub const DEFAULT_SPLIT_SIZE: usize = 20_000;

// ============================================================================
// PER-TYPE CACHE CONFIGURATION
// ============================================================================

/// Cache settings attached to one object type's resolution strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheConfig {
    /// Minutes until an entry is stale and evicted.
    pub ttl_minutes: u32,
    /// Seconds past expiry during which an entry still serves if the
    /// backing store is unavailable.
    pub resilience_seconds: u32,
    /// Whether this strategy caches at all.
    pub cache_enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: DEFAULT_TTL_MINUTES,
            resilience_seconds: DEFAULT_RESILIENCE_SECONDS,
            cache_enabled: true,
        }
    }
}

impl CacheConfig {
    /// Create a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// A config that bypasses the cache.
    pub fn disabled() -> Self {
        Self {
            cache_enabled: false,
            ..Self::default()
        }
    }

    /// Set the TTL in minutes.
    pub fn with_ttl_minutes(mut self, minutes: u32) -> Self {
        self.ttl_minutes = minutes;
        self
    }

    /// Set the resilience window in seconds.
    pub fn with_resilience_seconds(mut self, seconds: u32) -> Self {
        self.resilience_seconds = seconds;
        self
    }

    /// Enable or disable caching.
    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(u64::from(self.ttl_minutes) * 60)
    }

    pub fn resilience(&self) -> Duration {
        Duration::from_secs(u64::from(self.resilience_seconds))
    }

    /// Validate the configuration.
    ///
    /// Validates:
    /// - ttl_minutes > 0
    pub fn validate(&self) -> PreheatResult<()> {
        if self.ttl_minutes == 0 {
            return Err(PreheatError::Config(ConfigError::InvalidValue {
                field: "ttl_minutes".to_string(),
                value: self.ttl_minutes.to_string(),
                reason: "ttl_minutes must be greater than 0".to_string(),
            }));
        }

        Ok(())
    }
}

// ============================================================================
// SUBSYSTEM CONFIGURATION
// ============================================================================

/// Settings for the whole preheat subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreheatConfig {
    /// Global switch; when false every strategy skips the cache.
    pub cache_enabled: bool,
    /// Number of identifiers per backing-store query.
    pub split_size: usize,
    /// Cache settings for object types without an explicit strategy.
    pub default_cache: CacheConfig,
}

impl Default for PreheatConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            split_size: DEFAULT_SPLIT_SIZE,
            default_cache: CacheConfig::default(),
        }
    }
}

impl PreheatConfig {
    /// Create from environment variables with fallback to defaults.
    ///
    /// Environment variables:
    /// - `PREHEAT_CACHE_ENABLED`: "true" or "false" (default: true)
    /// - `PREHEAT_SPLIT_SIZE`: Identifiers per store query (default: 20000)
    /// - `PREHEAT_DEFAULT_TTL_MINUTES`: Default entry TTL (default: 5)
    /// - `PREHEAT_RESILIENCE_SECONDS`: Default outage window (default: 30)
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Create from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let cache_enabled = lookup("PREHEAT_CACHE_ENABLED")
            .map(|s| s.to_lowercase() != "false")
            .unwrap_or(defaults.cache_enabled);

        let split_size = lookup("PREHEAT_SPLIT_SIZE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.split_size);

        let ttl_minutes = lookup("PREHEAT_DEFAULT_TTL_MINUTES")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.default_cache.ttl_minutes);

        let resilience_seconds = lookup("PREHEAT_RESILIENCE_SECONDS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.default_cache.resilience_seconds);

        Self {
            cache_enabled,
            split_size,
            default_cache: CacheConfig {
                ttl_minutes,
                resilience_seconds,
                cache_enabled,
            },
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> PreheatResult<()> {
        if self.split_size == 0 {
            return Err(PreheatError::Config(ConfigError::InvalidValue {
                field: "split_size".to_string(),
                value: self.split_size.to_string(),
                reason: "split_size must be greater than 0".to_string(),
            }));
        }

        self.default_cache.validate()
    }
}

// =============================================================================
// TESTS
// =============================================================================
