//! Registry owning one [`TypedCache`] per object type.

use dashmap::DashMap;
use preheat_core::{CacheConfig, CacheError, ObjectType, PreheatResult};
use std::any::Any;
use std::sync::Arc;

use super::clock::{Clock, SystemClock};
use super::stats::CacheStats;
use super::typed::TypedCache;

/// Type-erased view of a [`TypedCache`] so caches of different value types
/// can share one map.
trait ErasedCache: Send + Sync {
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
    fn config(&self) -> CacheConfig;
    fn stats(&self) -> CacheStats;
    fn purge_expired(&self) -> usize;
    fn clear(&self);
}

impl<T> ErasedCache for TypedCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn config(&self) -> CacheConfig {
        *TypedCache::config(self)
    }

    fn stats(&self) -> CacheStats {
        TypedCache::stats(self)
    }

    fn purge_expired(&self) -> usize {
        TypedCache::purge_expired(self)
    }

    fn clear(&self) {
        TypedCache::clear(self)
    }
}

/// Owner of every typed cache for the lifetime of an import service.
///
/// Inject one registry into all resolvers of a service; it is the only place
/// cached entries live. Creation of a type's cache is an atomic
/// insert-if-absent, so racing first accesses share one instance.
pub struct CacheRegistry {
    caches: DashMap<ObjectType, Arc<dyn ErasedCache>>,
    clock: Arc<dyn Clock>,
}

impl CacheRegistry {
    /// Create a registry backed by wall-clock time.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a registry with an explicit time source.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            caches: DashMap::new(),
            clock,
        }
    }

    /// Get the cache for a type, creating it with `config` on first use.
    ///
    /// Later calls reuse the existing cache and its original configuration.
    /// Fails if the type's cache was created for a different value type.
    pub fn get_or_create<T>(
        &self,
        object_type: &ObjectType,
        config: CacheConfig,
    ) -> PreheatResult<Arc<TypedCache<T>>>
    where
        T: Clone + Send + Sync + 'static,
    {
        if let Some(existing) = self.lookup(object_type) {
            return Self::downcast(object_type, existing, config);
        }

        config.validate()?;

        let erased = {
            let entry = self.caches.entry(object_type.clone()).or_insert_with(|| {
                tracing::info!(
                    object_type = %object_type,
                    ttl_minutes = config.ttl_minutes,
                    resilience_seconds = config.resilience_seconds,
                    "Creating preheat cache"
                );
                Arc::new(TypedCache::<T>::new(
                    object_type.clone(),
                    config,
                    Arc::clone(&self.clock),
                )) as Arc<dyn ErasedCache>
            });
            Arc::clone(entry.value())
        };

        Self::downcast(object_type, erased, config)
    }

    /// Get the cache for a type without creating one.
    pub fn get<T>(&self, object_type: &ObjectType) -> PreheatResult<Option<Arc<TypedCache<T>>>>
    where
        T: Clone + Send + Sync + 'static,
    {
        match self.lookup(object_type) {
            Some(erased) => {
                let config = erased.config();
                Self::downcast(object_type, erased, config).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Statistics for one type's cache, if it exists.
    pub fn stats(&self, object_type: &ObjectType) -> Option<CacheStats> {
        self.lookup(object_type).map(|cache| cache.stats())
    }

    /// Statistics for every cache, keyed by type.
    pub fn all_stats(&self) -> Vec<(ObjectType, CacheStats)> {
        let mut stats: Vec<_> = self
            .caches
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().stats()))
            .collect();
        stats.sort_by(|a, b| a.0.cmp(&b.0));
        stats
    }

    /// Drop dead entries from every cache. Returns the total removed.
    pub fn purge_expired(&self) -> usize {
        let caches: Vec<_> = self.caches.iter().map(|e| Arc::clone(e.value())).collect();
        let removed: usize = caches.iter().map(|cache| cache.purge_expired()).sum();
        if removed > 0 {
            tracing::debug!(removed, "Purged expired preheat cache entries");
        }
        removed
    }

    /// Empty every cache while keeping the per-type instances.
    pub fn clear(&self) {
        let caches: Vec<_> = self.caches.iter().map(|e| Arc::clone(e.value())).collect();
        for cache in caches {
            cache.clear();
        }
    }

    /// Number of object types with a cache.
    pub fn len(&self) -> usize {
        self.caches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }

    fn lookup(&self, object_type: &ObjectType) -> Option<Arc<dyn ErasedCache>> {
        self.caches
            .get(object_type)
            .map(|entry| Arc::clone(entry.value()))
    }

    fn downcast<T>(
        object_type: &ObjectType,
        erased: Arc<dyn ErasedCache>,
        requested: CacheConfig,
    ) -> PreheatResult<Arc<TypedCache<T>>>
    where
        T: Clone + Send + Sync + 'static,
    {
        let cache = erased
            .into_any()
            .downcast::<TypedCache<T>>()
            .map_err(|_| CacheError::TypeMismatch {
                object_type: object_type.clone(),
                requested: std::any::type_name::<T>(),
            })?;

        if *cache.config() != requested {
            tracing::debug!(
                object_type = %object_type,
                "Preheat cache already exists; keeping its original configuration"
            );
        }

        Ok(cache)
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheRegistry")
            .field("types", &self.caches.len())
            .field("clock", &self.clock)
            .finish()
    }
}
