//! Concurrent access to the registry and resolver.

use preheat_cache::{
    BatchResolver, CacheRegistry, InMemoryObjectStore, ResolutionBatch, StrategyConfig, TypedCache,
};
use preheat_core::{CacheConfig, MetadataObject, ObjectType, TrackerIdentifier, UserContext};
use preheat_test_utils::fixtures;
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_racing_first_access_shares_one_cache() {
    const THREADS: usize = 50;
    let registry = CacheRegistry::new();
    let object_type = ObjectType::new("X");
    let barrier = Barrier::new(THREADS);

    let caches: Vec<Arc<TypedCache<String>>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    registry
                        .get_or_create::<String>(&object_type, CacheConfig::default())
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(registry.len(), 1);
    assert!(caches.iter().all(|cache| Arc::ptr_eq(cache, &caches[0])));
}

#[test]
fn test_concurrent_put_and_get_never_observe_torn_entries() {
    let registry = CacheRegistry::new();
    let cache = registry
        .get_or_create::<(u32, u32)>(&ObjectType::DATA_ELEMENT, CacheConfig::default())
        .unwrap();

    thread::scope(|scope| {
        for writer in 0..4u32 {
            let cache = Arc::clone(&cache);
            scope.spawn(move || {
                for i in 0..500u32 {
                    cache.put("shared", Some((writer * 1000 + i, writer * 1000 + i)));
                }
            });
        }
        for _ in 0..4 {
            let cache = Arc::clone(&cache);
            scope.spawn(move || {
                for _ in 0..500 {
                    if let Some((a, b)) = cache.get("shared") {
                        assert_eq!(a, b);
                    }
                }
            });
        }
    });

    assert_eq!(cache.len(), 1);
}

#[test]
fn test_concurrent_resolves_agree() {
    const THREADS: usize = 8;
    let store = Arc::new(
        InMemoryObjectStore::new()
            .with_objects(ObjectType::ORGANISATION_UNIT, fixtures::org_units())
            .unwrap(),
    );
    let resolver: BatchResolver<MetadataObject, _> =
        BatchResolver::new(Arc::new(CacheRegistry::new()), Arc::clone(&store));
    let strategy = StrategyConfig::cached(CacheConfig::default());
    let user = UserContext::system();
    let ids = fixtures::ids(&["ou1", "ou2"]);
    let barrier = Barrier::new(THREADS);

    let counts: Vec<usize> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    let batch = ResolutionBatch::new(
                        &ObjectType::ORGANISATION_UNIT,
                        &TrackerIdentifier::UID,
                        &ids,
                        &user,
                    );
                    resolver.resolve(&batch, &strategy).unwrap().objects().len()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(counts.iter().all(|&n| n == 2));
    assert!(store.query_count() <= THREADS);
    assert_eq!(resolver.registry().len(), 1);

    let settled = store.query_count();
    let batch =
        ResolutionBatch::new(&ObjectType::ORGANISATION_UNIT, &TrackerIdentifier::UID, &ids, &user);
    resolver.resolve(&batch, &strategy).unwrap();
    assert_eq!(store.query_count(), settled, "warm cache answers without the store");
}
