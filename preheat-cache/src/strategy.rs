//! Per-type resolution strategies, fixed at startup.

use preheat_core::{CacheConfig, ObjectType, PreheatConfig, PreheatResult};
use std::collections::HashMap;

use crate::transform::TransformKind;

/// How objects of one type are cached and transformed.
#[derive(Debug)]
pub struct StrategyConfig<T> {
    pub cache: CacheConfig,
    pub transform: TransformKind<T>,
}

impl<T> Clone for StrategyConfig<T> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache,
            transform: self.transform.clone(),
        }
    }
}

impl<T> Default for StrategyConfig<T> {
    fn default() -> Self {
        Self::cached(CacheConfig::default())
    }
}

impl<T> StrategyConfig<T> {
    pub fn new(cache: CacheConfig, transform: TransformKind<T>) -> Self {
        Self { cache, transform }
    }

    /// Cache with the given settings, no transform.
    pub fn cached(cache: CacheConfig) -> Self {
        Self::new(cache, TransformKind::Identity)
    }

    /// Always query the store.
    pub fn uncached() -> Self {
        Self::new(CacheConfig::disabled(), TransformKind::Identity)
    }

    pub fn with_transform(mut self, transform: TransformKind<T>) -> Self {
        self.transform = transform;
        self
    }
}

/// Strategy lookup by object type.
///
/// Types without an explicit entry use the default strategy, which caches
/// with the subsystem's default settings. When the global cache switch is
/// off every lookup comes back with caching disabled, whatever the entry
/// says.
#[derive(Debug)]
pub struct StrategyTable<T> {
    strategies: HashMap<ObjectType, StrategyConfig<T>>,
    fallback: StrategyConfig<T>,
    cache_enabled: bool,
}

impl<T> StrategyTable<T> {
    pub fn new(config: &PreheatConfig) -> Self {
        Self {
            strategies: HashMap::new(),
            fallback: StrategyConfig::cached(config.default_cache),
            cache_enabled: config.cache_enabled,
        }
    }

    /// Register the strategy for a type, replacing any previous one.
    pub fn with_strategy(mut self, object_type: ObjectType, strategy: StrategyConfig<T>) -> Self {
        self.strategies.insert(object_type, strategy);
        self
    }

    /// Replace the strategy used for unregistered types.
    pub fn with_fallback(mut self, strategy: StrategyConfig<T>) -> Self {
        self.fallback = strategy;
        self
    }

    /// Effective strategy for a type.
    pub fn get(&self, object_type: &ObjectType) -> StrategyConfig<T> {
        let strategy = self.strategies.get(object_type).unwrap_or(&self.fallback);
        let mut effective = strategy.clone();
        if !self.cache_enabled {
            effective.cache = effective.cache.with_cache_enabled(false);
        }
        effective
    }

    pub fn is_registered(&self, object_type: &ObjectType) -> bool {
        self.strategies.contains_key(object_type)
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache_enabled
    }

    /// Registered types, sorted.
    pub fn object_types(&self) -> Vec<ObjectType> {
        let mut types: Vec<_> = self.strategies.keys().cloned().collect();
        types.sort();
        types
    }

    /// Check every cache configuration in the table.
    pub fn validate(&self) -> PreheatResult<()> {
        self.fallback.cache.validate()?;
        for strategy in self.strategies.values() {
            strategy.cache.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::MetadataSummaryMapper;
    use preheat_core::MetadataObject;

    fn table(config: &PreheatConfig) -> StrategyTable<MetadataObject> {
        StrategyTable::new(config)
            .with_strategy(
                ObjectType::ORGANISATION_UNIT,
                StrategyConfig::cached(CacheConfig::new().with_ttl_minutes(10))
                    .with_transform(TransformKind::field_map(MetadataSummaryMapper)),
            )
            .with_strategy(ObjectType::RELATIONSHIP_TYPE, StrategyConfig::uncached())
    }

    #[test]
    fn test_registered_strategy_is_used() {
        let table = table(&PreheatConfig::default());
        let strategy = table.get(&ObjectType::ORGANISATION_UNIT);
        assert_eq!(strategy.cache.ttl_minutes, 10);
        assert_eq!(strategy.transform.name(), "metadata-summary");
        assert!(!table.get(&ObjectType::RELATIONSHIP_TYPE).cache.cache_enabled);
    }

    #[test]
    fn test_unknown_type_uses_fallback() {
        let config = PreheatConfig::default();
        let table = table(&config);
        let strategy = table.get(&ObjectType::PROGRAM_STAGE);
        assert!(!table.is_registered(&ObjectType::PROGRAM_STAGE));
        assert_eq!(strategy.cache, config.default_cache);
        assert_eq!(strategy.transform.name(), "identity");
    }

    #[test]
    fn test_global_switch_disables_every_strategy() {
        let config = PreheatConfig {
            cache_enabled: false,
            ..PreheatConfig::default()
        };
        let table = table(&config);
        assert!(!table.get(&ObjectType::ORGANISATION_UNIT).cache.cache_enabled);
        assert!(!table.get(&ObjectType::PROGRAM).cache.cache_enabled);
    }

    #[test]
    fn test_validate_rejects_zero_ttl() {
        let table: StrategyTable<MetadataObject> = StrategyTable::new(&PreheatConfig::default())
            .with_strategy(
                ObjectType::PROGRAM,
                StrategyConfig::cached(CacheConfig::new().with_ttl_minutes(0)),
            );
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_object_types_sorted() {
        let table = table(&PreheatConfig::default());
        assert_eq!(
            table.object_types(),
            vec![ObjectType::ORGANISATION_UNIT, ObjectType::RELATIONSHIP_TYPE]
        );
    }
}
