//! PREHEAT Cache - Identifier Batch Resolution
//!
//! Resolves batches of object identifiers (uid, code or attribute value)
//! for bulk imports, keeping recently resolved objects in short-lived
//! per-type caches so repeated imports skip the backing store.
//!
//! The pieces, bottom up:
//! - [`cache`]: expiring per-type caches and the registry owning them
//! - [`key_policy`]: cache keys and store filters per id scheme
//! - [`transform`]: post-fetch object mappers
//! - [`store`]: the backing-store interface and an in-memory store
//! - [`resolver`]: the cache-aware batch resolver
//! - [`strategy`]: per-type cache and transform settings
//! - [`preheat`]: chunked preheating of an import and reference checks
//! - [`telemetry`]: tracing subscriber setup

pub mod cache;
pub mod key_policy;
pub mod preheat;
pub mod resolver;
pub mod store;
pub mod strategy;
pub mod telemetry;
pub mod transform;

pub use cache::{
    CacheEntry, CacheRegistry, CacheStats, Clock, Lookup, ManualClock, SystemClock, TypedCache,
};
pub use key_policy::{IdentifierKeyPolicy, StoreFilter};
pub use preheat::{split_ids, Preheat, PreheatSupplier, SchemaStrategy, MISSING_REFERENCE_CODE};
pub use resolver::{BatchResolver, Resolution, ResolutionBatch, ResolutionFailure};
pub use store::{InMemoryObjectStore, ObjectStore, RecordedQuery};
pub use strategy::{StrategyConfig, StrategyTable};
pub use telemetry::{init_tracing, LogFormat, TelemetryConfig, TelemetryError};
pub use transform::{FnMapper, MetadataSummaryMapper, ObjectMapper, TransformKind};
