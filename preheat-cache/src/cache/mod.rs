//! Per-type expiring caches and the registry that owns them.
//!
//! # Design Philosophy
//!
//! Each object type gets exactly one [`TypedCache`], created lazily by the
//! [`CacheRegistry`] the first time a resolver asks for it. The registry is
//! an ordinary value owned by the import service and injected into
//! resolvers, not ambient global state.
//!
//! Entries are fresh for the configured TTL. After that they stay around
//! for a short resilience window as *stale* fallbacks: they are never
//! returned as hits, but a resolver may hand them out if the refresh query
//! fails because the backing store is down. See [`Lookup`].
//!
//! # Example
//!
//! ```ignore
//! let registry = CacheRegistry::new();
//! let cache = registry
//!     .get_or_create::<MetadataObject>(&ObjectType::PROGRAM, CacheConfig::default())?;
//!
//! cache.put("UID:IpHINAT79UW", Some(program));
//! assert!(cache.get("UID:IpHINAT79UW").is_some());
//! ```

pub mod clock;
pub mod entry;
pub mod registry;
pub mod stats;
pub mod typed;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{CacheEntry, Lookup};
pub use registry::CacheRegistry;
pub use stats::CacheStats;
pub use typed::TypedCache;
