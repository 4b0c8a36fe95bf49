//! Cache entries and lookup outcomes.
//!
//! An entry moves through three states as time passes:
//!
//! - **fresh** until `written_at + ttl`; served as a hit.
//! - **stale** for a further `resilience` window; never a hit, but kept as a
//!   fallback in case the refresh query fails with a store outage.
//! - **dead** afterwards; evicted on the next lookup or purge.

use chrono::Duration as ChronoDuration;
use preheat_core::{CacheConfig, Timestamp};
use std::time::Duration;

/// A cached value with the time it was written.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    value: T,
    written_at: Timestamp,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T, written_at: Timestamp) -> Self {
        Self { value, written_at }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn written_at(&self) -> Timestamp {
        self.written_at
    }

    /// How long ago the entry was written, or zero for entries written in
    /// the future relative to `now`.
    pub fn age(&self, now: Timestamp) -> Duration {
        (now - self.written_at).to_std().unwrap_or(Duration::ZERO)
    }

    /// Still a hit at `now`.
    pub fn is_fresh(&self, now: Timestamp, config: &CacheConfig) -> bool {
        now <= self.expires_at(config)
    }

    /// Past its TTL but inside the resilience window.
    pub fn is_stale(&self, now: Timestamp, config: &CacheConfig) -> bool {
        !self.is_fresh(now, config) && now <= self.expires_at(config) + resilience(config)
    }

    /// Past both TTL and resilience window.
    pub fn is_dead(&self, now: Timestamp, config: &CacheConfig) -> bool {
        now > self.expires_at(config) + resilience(config)
    }

    /// The instant after which this entry stops being a hit.
    pub fn expires_at(&self, config: &CacheConfig) -> Timestamp {
        self.written_at + ChronoDuration::minutes(i64::from(config.ttl_minutes))
    }
}

fn resilience(config: &CacheConfig) -> ChronoDuration {
    ChronoDuration::seconds(i64::from(config.resilience_seconds))
}

/// Outcome of probing a cache for one key.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// Within TTL.
    Fresh(T),
    /// Expired, but usable if the backing store is down.
    Stale { value: T, written_at: Timestamp },
    /// Absent or evicted.
    Miss,
}

impl<T> Lookup<T> {
    pub fn is_hit(&self) -> bool {
        matches!(self, Lookup::Fresh(_))
    }

    pub fn is_miss(&self) -> bool {
        matches!(self, Lookup::Miss)
    }

    /// The value, only if fresh.
    pub fn into_fresh(self) -> Option<T> {
        match self {
            Lookup::Fresh(value) => Some(value),
            Lookup::Stale { .. } | Lookup::Miss => None,
        }
    }

    /// The stale fallback, only if stale.
    pub fn into_stale(self) -> Option<T> {
        match self {
            Lookup::Stale { value, .. } => Some(value),
            Lookup::Fresh(_) | Lookup::Miss => None,
        }
    }
}
