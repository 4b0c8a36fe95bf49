//! Cache-aware resolution of identifier batches.
//!
//! For each batch the resolver probes the type's cache, sends exactly one
//! store query for whatever is missing, transforms the fetched objects and
//! writes them back under their scheme-derived keys. Attribute-scheme
//! batches and strategies with caching disabled always go to the store.
//! Attribute-scheme results are returned untransformed: callers index them
//! by attribute value, which a mapper may drop.
//!
//! When the refresh query fails because the store is unavailable, misses
//! still inside their resilience window are served from stale entries; the
//! rest are reported on the [`Resolution`] as a [`ResolutionFailure`].

use preheat_core::{
    Defaults, IdScheme, IdentifiableObject, ObjectType, PreheatResult, Query, StoreError,
    TrackerIdentifier, UserContext,
};
use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::cache::{CacheRegistry, Lookup, TypedCache};
use crate::key_policy::{IdentifierKeyPolicy, StoreFilter};
use crate::store::ObjectStore;
use crate::strategy::StrategyConfig;

/// One call's worth of identifiers for a single object type.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionBatch<'a> {
    pub object_type: &'a ObjectType,
    pub identifier: &'a TrackerIdentifier,
    pub ids: &'a [String],
    pub user: &'a UserContext,
}

impl<'a> ResolutionBatch<'a> {
    pub fn new(
        object_type: &'a ObjectType,
        identifier: &'a TrackerIdentifier,
        ids: &'a [String],
        user: &'a UserContext,
    ) -> Self {
        Self {
            object_type,
            identifier,
            ids,
            user,
        }
    }

    /// Input ids without duplicates, first occurrence wins.
    fn distinct_ids(&self) -> Vec<String> {
        let mut seen = HashSet::with_capacity(self.ids.len());
        self.ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect()
    }
}

/// Ids that could not be resolved because the store was unavailable.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionFailure {
    pub object_type: ObjectType,
    pub ids: Vec<String>,
    pub error: StoreError,
}

/// Objects resolved for a batch.
///
/// Unmatched ids are simply absent from `objects`; callers compare counts
/// or look objects up by identifier. Order is not meaningful.
#[derive(Debug, Clone)]
pub struct Resolution<T> {
    objects: Vec<T>,
    cache_hits: usize,
    stale_served: usize,
    store_queries: usize,
    failure: Option<ResolutionFailure>,
}

impl<T> Resolution<T> {
    fn empty() -> Self {
        Self {
            objects: Vec::new(),
            cache_hits: 0,
            stale_served: 0,
            store_queries: 0,
            failure: None,
        }
    }

    pub fn objects(&self) -> &[T] {
        &self.objects
    }

    pub fn into_objects(self) -> Vec<T> {
        self.objects
    }

    /// Ids answered by fresh cache entries.
    pub fn cache_hits(&self) -> usize {
        self.cache_hits
    }

    /// Ids answered by stale entries during an outage.
    pub fn stale_served(&self) -> usize {
        self.stale_served
    }

    /// Store round-trips made for this batch (0 or 1).
    pub fn store_queries(&self) -> usize {
        self.store_queries
    }

    pub fn failure(&self) -> Option<&ResolutionFailure> {
        self.failure.as_ref()
    }

    pub fn into_parts(self) -> (Vec<T>, Option<ResolutionFailure>) {
        (self.objects, self.failure)
    }

    /// Whether every id was at least looked up.
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Resolves identifier batches for object type `T` against one store.
pub struct BatchResolver<T, S> {
    registry: Arc<CacheRegistry>,
    store: S,
    _marker: PhantomData<fn() -> T>,
}

impl<T, S> BatchResolver<T, S>
where
    T: IdentifiableObject,
    S: ObjectStore<T>,
{
    pub fn new(registry: Arc<CacheRegistry>, store: S) -> Self {
        Self {
            registry,
            store,
            _marker: PhantomData,
        }
    }

    pub fn registry(&self) -> &Arc<CacheRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolve a batch under the given strategy.
    ///
    /// Errors are configuration problems, a cache holding another value
    /// type, or a non-transient store failure. Store outages are reported
    /// on the returned [`Resolution`] instead.
    pub fn resolve(
        &self,
        batch: &ResolutionBatch<'_>,
        strategy: &StrategyConfig<T>,
    ) -> PreheatResult<Resolution<T>> {
        let ids = batch.distinct_ids();
        if ids.is_empty() {
            return Ok(Resolution::empty());
        }

        let scheme = batch.identifier.id_scheme;
        if !uses_cache(scheme, strategy.cache.cache_enabled) {
            return self.resolve_uncached(batch, strategy, ids);
        }

        let cache = self
            .registry
            .get_or_create::<T>(batch.object_type, strategy.cache)?;
        self.resolve_cached(batch, strategy, &cache, ids)
    }

    fn resolve_uncached(
        &self,
        batch: &ResolutionBatch<'_>,
        strategy: &StrategyConfig<T>,
        ids: Vec<String>,
    ) -> PreheatResult<Resolution<T>> {
        let mut resolution = Resolution::empty();
        resolution.store_queries = 1;

        match self.fetch(batch, &ids)? {
            Ok(objects) if batch.identifier.id_scheme == IdScheme::Attribute => {
                resolution.objects = objects;
            }
            Ok(objects) => {
                resolution.objects = strategy.transform.apply(objects);
            }
            Err(error) if error.is_transient() => {
                tracing::warn!(
                    object_type = %batch.object_type,
                    id_scheme = %batch.identifier.id_scheme,
                    unresolved = ids.len(),
                    error = %error,
                    "Backing store unavailable for uncached batch"
                );
                resolution.failure = Some(ResolutionFailure {
                    object_type: batch.object_type.clone(),
                    ids,
                    error,
                });
            }
            Err(error) => return Err(error.into()),
        }

        tracing::debug!(
            object_type = %batch.object_type,
            id_scheme = %batch.identifier.id_scheme,
            resolved = resolution.objects.len(),
            "Resolved batch without cache"
        );
        Ok(resolution)
    }

    fn resolve_cached(
        &self,
        batch: &ResolutionBatch<'_>,
        strategy: &StrategyConfig<T>,
        cache: &TypedCache<T>,
        ids: Vec<String>,
    ) -> PreheatResult<Resolution<T>> {
        let scheme = batch.identifier.id_scheme;
        let mut hits = Vec::new();
        let mut misses = Vec::new();
        let mut fallbacks: HashMap<String, T> = HashMap::new();

        for id in ids {
            let Some(key) = IdentifierKeyPolicy::probe_key(scheme, &id) else {
                misses.push(id);
                continue;
            };
            match cache.lookup(&key) {
                Lookup::Fresh(value) => hits.push(value),
                Lookup::Stale { value, .. } => {
                    fallbacks.insert(id.clone(), value);
                    misses.push(id);
                }
                Lookup::Miss => misses.push(id),
            }
        }

        let mut resolution = Resolution::empty();
        resolution.cache_hits = hits.len();

        tracing::debug!(
            object_type = %batch.object_type,
            id_scheme = %scheme,
            hits = hits.len(),
            misses = misses.len(),
            "Probed preheat cache"
        );

        if misses.is_empty() {
            resolution.objects = hits;
            return Ok(resolution);
        }

        resolution.store_queries = 1;
        match self.fetch(batch, &misses)? {
            Ok(objects) => {
                let fetched = strategy.transform.apply(objects);
                for object in &fetched {
                    if let Some(key) = IdentifierKeyPolicy::cache_key(object, scheme) {
                        cache.put(key, Some(object.clone()));
                    }
                }
                resolution.objects = fetched;
            }
            Err(error) if error.is_transient() => {
                let (served, unresolved) = Self::serve_fallbacks(misses, fallbacks);
                cache.record_stale_served(served.len());
                resolution.stale_served = served.len();

                tracing::warn!(
                    object_type = %batch.object_type,
                    id_scheme = %scheme,
                    stale_served = served.len(),
                    unresolved = unresolved.len(),
                    error = %error,
                    "Backing store unavailable; serving stale preheat entries"
                );

                if !unresolved.is_empty() {
                    resolution.failure = Some(ResolutionFailure {
                        object_type: batch.object_type.clone(),
                        ids: unresolved,
                        error,
                    });
                }
                resolution.objects = served;
            }
            Err(error) => return Err(error.into()),
        }

        resolution.objects.extend(hits);
        Ok(resolution)
    }

    /// Split misses into stale values that can be served and ids left
    /// without any value.
    fn serve_fallbacks(
        misses: Vec<String>,
        mut fallbacks: HashMap<String, T>,
    ) -> (Vec<T>, Vec<String>) {
        let mut served = Vec::with_capacity(fallbacks.len());
        let mut unresolved = Vec::new();
        for id in misses {
            match fallbacks.remove(&id) {
                Some(value) => served.push(value),
                None => unresolved.push(id),
            }
        }
        (served, unresolved)
    }

    /// One store round-trip. The outer result carries configuration
    /// errors, the inner one the store's answer.
    fn fetch(
        &self,
        batch: &ResolutionBatch<'_>,
        ids: &[String],
    ) -> PreheatResult<Result<Vec<T>, StoreError>> {
        let filter = IdentifierKeyPolicy::store_filter(batch.object_type, batch.identifier, ids)?;
        Ok(match filter {
            StoreFilter::Restriction(restriction) => {
                let query = Query::from_type(batch.object_type.clone())
                    .with_user(batch.user.clone())
                    .with_filter(restriction)
                    .with_defaults(Defaults::Include);
                self.store.query(&query)
            }
            StoreFilter::AttributeValues { attribute, values } => {
                self.store
                    .find_by_attribute_values(batch.object_type, &attribute, &values)
            }
        })
    }
}

impl<T, S: std::fmt::Debug> std::fmt::Debug for BatchResolver<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchResolver")
            .field("registry", &self.registry)
            .field("store", &self.store)
            .finish()
    }
}

/// Whether a scheme's batches can ever be served from cache.
pub fn uses_cache(scheme: IdScheme, strategy_enabled: bool) -> bool {
    scheme.is_cacheable() && strategy_enabled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryObjectStore;
    use crate::transform::{MetadataSummaryMapper, TransformKind};
    use preheat_core::{CacheConfig, MetadataObject};

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn data_element(uid: &str, name: &str, code: &str) -> MetadataObject {
        MetadataObject::new(ObjectType::DATA_ELEMENT, uid, name)
            .with_code(code)
            .with_attribute("Ah3kQ9fL2mZ", code)
    }

    fn batch<'a>(
        identifier: &'a TrackerIdentifier,
        ids: &'a [String],
        user: &'a UserContext,
    ) -> ResolutionBatch<'a> {
        ResolutionBatch::new(&ObjectType::DATA_ELEMENT, identifier, ids, user)
    }

    fn resolver() -> (
        BatchResolver<MetadataObject, Arc<InMemoryObjectStore<MetadataObject>>>,
        Arc<InMemoryObjectStore<MetadataObject>>,
    ) {
        let store = Arc::new(
            InMemoryObjectStore::new()
                .with_objects(
                    ObjectType::DATA_ELEMENT,
                    vec![
                        data_element("fbfJHSPpUQD", "ANC 1st visit", "DE_359596"),
                        data_element("cYeuwXTCPkU", "ANC 2nd visit", "DE_359597"),
                    ],
                )
                .unwrap(),
        );
        let resolver = BatchResolver::new(Arc::new(CacheRegistry::new()), Arc::clone(&store));
        (resolver, store)
    }

    #[test]
    fn test_empty_batch_issues_no_query() {
        let (resolver, store) = resolver();
        let user = UserContext::system();
        let batch = batch(&TrackerIdentifier::UID, &[], &user);

        let resolution = resolver.resolve(&batch, &StrategyConfig::default()).unwrap();

        assert!(resolution.objects().is_empty());
        assert_eq!(store.query_count(), 0);
        assert!(resolver.registry().is_empty());
    }

    #[test]
    fn test_duplicate_ids_are_resolved_once() {
        let (resolver, store) = resolver();
        let user = UserContext::system();
        let input = ids(&["fbfJHSPpUQD", "fbfJHSPpUQD", "cYeuwXTCPkU"]);
        let batch = batch(&TrackerIdentifier::UID, &input, &user);

        let resolution = resolver.resolve(&batch, &StrategyConfig::default()).unwrap();

        assert_eq!(resolution.objects().len(), 2);
        let recorded = store.recorded_queries();
        let crate::store::RecordedQuery::Query(query) = &recorded[0] else {
            panic!("uid batch must use the query interface");
        };
        assert_eq!(query.filters[0].values(), vec!["fbfJHSPpUQD", "cYeuwXTCPkU"]);
    }

    #[test]
    fn test_query_carries_user_and_defaults() {
        let (resolver, store) = resolver();
        let user = UserContext::new("admin");
        let input = ids(&["DE_359596"]);
        let batch = batch(&TrackerIdentifier::CODE, &input, &user);

        let resolution = resolver.resolve(&batch, &StrategyConfig::default()).unwrap();

        assert_eq!(resolution.objects().len(), 1);
        let crate::store::RecordedQuery::Query(query) = &store.recorded_queries()[0] else {
            panic!("code batch must use the query interface");
        };
        assert_eq!(query.user.username, "admin");
        assert_eq!(query.defaults, Defaults::Include);
    }

    #[test]
    fn test_disabled_strategy_bypasses_registry() {
        let (resolver, store) = resolver();
        let user = UserContext::system();
        let input = ids(&["fbfJHSPpUQD"]);
        let batch = batch(&TrackerIdentifier::UID, &input, &user);
        let strategy = StrategyConfig::cached(CacheConfig::disabled());

        resolver.resolve(&batch, &strategy).unwrap();
        resolver.resolve(&batch, &strategy).unwrap();

        assert_eq!(store.query_count(), 2);
        assert!(resolver.registry().is_empty());
    }

    #[test]
    fn test_invalid_attribute_reference_is_an_error() {
        let (resolver, _store) = resolver();
        let user = UserContext::system();
        let input = ids(&["v1"]);
        let identifier = TrackerIdentifier {
            id_scheme: IdScheme::Attribute,
            value: Some("not a uid".to_string()),
        };
        let batch = batch(&identifier, &input, &user);

        assert!(resolver.resolve(&batch, &StrategyConfig::default()).is_err());
    }

    #[test]
    fn test_attribute_results_skip_transform() {
        let (resolver, _store) = resolver();
        let user = UserContext::system();
        let input = ids(&["DE_359596"]);
        let identifier = TrackerIdentifier::attribute("Ah3kQ9fL2mZ");
        let strategy = StrategyConfig::default()
            .with_transform(TransformKind::field_map(MetadataSummaryMapper));

        let resolution = resolver.resolve(&batch(&identifier, &input, &user), &strategy).unwrap();

        assert_eq!(resolution.objects().len(), 1);
        assert_eq!(resolution.objects()[0].attribute_values.len(), 1);
    }

    #[test]
    fn test_uses_cache() {
        assert!(uses_cache(IdScheme::Uid, true));
        assert!(!uses_cache(IdScheme::Code, false));
        assert!(!uses_cache(IdScheme::Attribute, true));
    }
}
