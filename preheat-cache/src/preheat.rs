//! Preheat assembly: resolving every referenced identifier of an import up
//! front and answering reference checks from the result.

use preheat_core::{
    AttributeRef, IdScheme, IdentifiableObject, ObjectType, PreheatConfig, PreheatResult,
    ReferenceError, TrackerIdentifier, TrackerIdentifierParams, UserContext,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::cache::CacheRegistry;
use crate::key_policy::IdentifierKeyPolicy;
use crate::resolver::{BatchResolver, ResolutionBatch, ResolutionFailure};
use crate::store::ObjectStore;
use crate::strategy::{StrategyConfig, StrategyTable};

/// Validation code reported for references that match no object.
pub const MISSING_REFERENCE_CODE: &str = "E1005";

/// Partition ids into chunks of at most `size` (a size of 0 is read as 1).
pub fn split_ids(ids: &[String], size: usize) -> Vec<Vec<String>> {
    ids.chunks(size.max(1)).map(<[String]>::to_vec).collect()
}

// ============================================================================
// PREHEAT CONTAINER
// ============================================================================

/// Resolved objects of one import, indexed by type and identifier.
///
/// Objects are indexed by the identifier they were requested with, so a
/// code-scheme import looks objects up by code.
#[derive(Debug, Clone)]
pub struct Preheat<T> {
    user: UserContext,
    objects: HashMap<ObjectType, HashMap<String, T>>,
    failures: Vec<ResolutionFailure>,
}

impl<T: IdentifiableObject> Preheat<T> {
    pub fn new(user: UserContext) -> Self {
        Self {
            user,
            objects: HashMap::new(),
            failures: Vec::new(),
        }
    }

    /// The user the import runs as.
    pub fn user(&self) -> &UserContext {
        &self.user
    }

    /// Index objects of a type by the identifier `identifier` selects.
    ///
    /// Objects without a value for that identifier are dropped.
    pub fn put(
        &mut self,
        object_type: &ObjectType,
        identifier: &TrackerIdentifier,
        objects: Vec<T>,
    ) -> PreheatResult<()> {
        let attribute: Option<AttributeRef> = match identifier.id_scheme {
            IdScheme::Attribute => Some(identifier.attribute_ref(object_type)?),
            IdScheme::Uid | IdScheme::Code => None,
        };

        let indexed = self.objects.entry(object_type.clone()).or_default();
        for object in objects {
            let key = IdentifierKeyPolicy::identify(&object, identifier, attribute.as_ref())
                .map(str::to_owned);
            if let Some(key) = key {
                indexed.insert(key, object);
            }
        }
        Ok(())
    }

    pub fn get(&self, object_type: &ObjectType, id: &str) -> Option<&T> {
        self.objects.get(object_type)?.get(id)
    }

    /// Every object of a type.
    pub fn all(&self, object_type: &ObjectType) -> Vec<&T> {
        self.objects
            .get(object_type)
            .map(|indexed| indexed.values().collect())
            .unwrap_or_default()
    }

    pub fn record_failure(&mut self, failure: ResolutionFailure) {
        self.failures.push(failure);
    }

    /// Batches that could not be resolved because the store was down.
    pub fn failures(&self) -> &[ResolutionFailure] {
        &self.failures
    }

    /// Look up a reference from the imported payload.
    ///
    /// A missing object is a validation error unless its batch failed with
    /// a store outage, in which case it is an infrastructure fault.
    pub fn check_reference(
        &self,
        object_type: &ObjectType,
        id: &str,
    ) -> Result<&T, ReferenceError> {
        if let Some(object) = self.get(object_type, id) {
            return Ok(object);
        }

        let outage = self
            .failures
            .iter()
            .find(|f| &f.object_type == object_type && f.ids.iter().any(|i| i == id));

        Err(match outage {
            Some(failure) => ReferenceError::StoreUnavailable {
                object_type: object_type.clone(),
                identifier: id.to_string(),
                reason: failure.error.to_string(),
            },
            None => ReferenceError::Missing {
                code: MISSING_REFERENCE_CODE,
                object_type: object_type.clone(),
                identifier: id.to_string(),
            },
        })
    }

    /// Number of indexed objects across all types.
    pub fn len(&self) -> usize {
        self.objects.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// SCHEMA STRATEGY
// ============================================================================

/// Preheats one object type through a shared resolver.
pub struct SchemaStrategy<T, S> {
    object_type: ObjectType,
    strategy: StrategyConfig<T>,
    resolver: Arc<BatchResolver<T, S>>,
}

impl<T, S> SchemaStrategy<T, S>
where
    T: IdentifiableObject,
    S: ObjectStore<T>,
{
    pub fn new(
        object_type: ObjectType,
        strategy: StrategyConfig<T>,
        resolver: Arc<BatchResolver<T, S>>,
    ) -> Self {
        Self {
            object_type,
            strategy,
            resolver,
        }
    }

    /// Build the strategy registered for `object_type` in `table`.
    pub fn from_table(
        object_type: ObjectType,
        table: &StrategyTable<T>,
        resolver: Arc<BatchResolver<T, S>>,
    ) -> Self {
        let strategy = table.get(&object_type);
        Self::new(object_type, strategy, resolver)
    }

    pub fn object_type(&self) -> &ObjectType {
        &self.object_type
    }

    /// Resolve every chunk and add the results to `preheat`.
    ///
    /// Store outages are recorded on the container and do not stop later
    /// chunks; any other error aborts.
    pub fn add(
        &self,
        params: &TrackerIdentifierParams,
        split_list: &[Vec<String>],
        preheat: &mut Preheat<T>,
    ) -> PreheatResult<()> {
        let identifier = params.by_type(&self.object_type);
        let user = preheat.user().clone();

        for ids in split_list {
            let batch = ResolutionBatch::new(&self.object_type, identifier, ids, &user);
            let (objects, failure) = self.resolver.resolve(&batch, &self.strategy)?.into_parts();
            preheat.put(&self.object_type, identifier, objects)?;
            if let Some(failure) = failure {
                preheat.record_failure(failure);
            }
        }
        Ok(())
    }
}

// ============================================================================
// SUPPLIER
// ============================================================================

/// Entry point for an import: preheats every referenced type.
pub struct PreheatSupplier<T, S> {
    config: PreheatConfig,
    table: StrategyTable<T>,
    resolver: Arc<BatchResolver<T, S>>,
}

impl<T, S> PreheatSupplier<T, S>
where
    T: IdentifiableObject,
    S: ObjectStore<T>,
{
    /// Validates both configurations before anything is resolved.
    pub fn new(
        config: PreheatConfig,
        table: StrategyTable<T>,
        registry: Arc<CacheRegistry>,
        store: S,
    ) -> PreheatResult<Self> {
        config.validate()?;
        table.validate()?;
        Ok(Self {
            config,
            table,
            resolver: Arc::new(BatchResolver::new(registry, store)),
        })
    }

    pub fn resolver(&self) -> &Arc<BatchResolver<T, S>> {
        &self.resolver
    }

    /// Resolve the referenced ids of every type into a fresh container.
    pub fn preheat(
        &self,
        params: &TrackerIdentifierParams,
        user: UserContext,
        references: &BTreeMap<ObjectType, Vec<String>>,
    ) -> PreheatResult<Preheat<T>> {
        let mut preheat = Preheat::new(user);

        for (object_type, ids) in references {
            let split_list = split_ids(ids, self.config.split_size);
            SchemaStrategy::from_table(object_type.clone(), &self.table, Arc::clone(&self.resolver))
                .add(params, &split_list, &mut preheat)?;
        }

        tracing::info!(
            types = references.len(),
            objects = preheat.len(),
            failures = preheat.failures().len(),
            "Preheat complete"
        );
        Ok(preheat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryObjectStore;
    use preheat_core::{MetadataObject, StoreError};

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn program(uid: &str, code: &str) -> MetadataObject {
        MetadataObject::new(ObjectType::PROGRAM, uid, code).with_code(code)
    }

    #[test]
    fn test_split_ids() {
        let input = ids(&["a", "b", "c", "d", "e"]);
        let chunks = split_ids(&input, 2);
        assert_eq!(chunks, vec![ids(&["a", "b"]), ids(&["c", "d"]), ids(&["e"])]);
        assert!(split_ids(&[], 2).is_empty());
        assert_eq!(split_ids(&input, 0).len(), 5);
    }

    #[test]
    fn test_put_indexes_by_requested_scheme() {
        let mut preheat = Preheat::new(UserContext::system());
        preheat
            .put(
                &ObjectType::PROGRAM,
                &TrackerIdentifier::CODE,
                vec![program("IpHINAT79UW", "CHILD")],
            )
            .unwrap();

        assert!(preheat.get(&ObjectType::PROGRAM, "CHILD").is_some());
        assert!(preheat.get(&ObjectType::PROGRAM, "IpHINAT79UW").is_none());
    }

    #[test]
    fn test_put_attribute_needs_reference() {
        let mut preheat = Preheat::<MetadataObject>::new(UserContext::system());
        let identifier = TrackerIdentifier {
            id_scheme: IdScheme::Attribute,
            value: None,
        };
        assert!(preheat.put(&ObjectType::PROGRAM, &identifier, Vec::new()).is_err());
    }

    #[test]
    fn test_check_reference_classifies_missing_ids() {
        let mut preheat = Preheat::new(UserContext::system());
        preheat
            .put(
                &ObjectType::PROGRAM,
                &TrackerIdentifier::UID,
                vec![program("IpHINAT79UW", "CHILD")],
            )
            .unwrap();
        preheat.record_failure(ResolutionFailure {
            object_type: ObjectType::PROGRAM,
            ids: ids(&["ur1Edk5Oe2n"]),
            error: StoreError::Unavailable {
                object_type: ObjectType::PROGRAM,
                reason: "connection refused".to_string(),
            },
        });

        assert!(preheat.check_reference(&ObjectType::PROGRAM, "IpHINAT79UW").is_ok());

        let missing = preheat
            .check_reference(&ObjectType::PROGRAM, "eBAyeGv0exc")
            .unwrap_err();
        assert!(matches!(missing, ReferenceError::Missing { code: MISSING_REFERENCE_CODE, .. }));
        assert!(!missing.is_infrastructure_fault());

        let outage = preheat
            .check_reference(&ObjectType::PROGRAM, "ur1Edk5Oe2n")
            .unwrap_err();
        assert!(outage.is_infrastructure_fault());
    }

    #[test]
    fn test_supplier_preheats_in_chunks() {
        let store = Arc::new(
            InMemoryObjectStore::new()
                .with_objects(
                    ObjectType::PROGRAM,
                    vec![
                        program("IpHINAT79UW", "CHILD"),
                        program("ur1Edk5Oe2n", "TB"),
                        program("eBAyeGv0exc", "INPATIENT"),
                    ],
                )
                .unwrap(),
        );
        let config = PreheatConfig {
            split_size: 2,
            ..PreheatConfig::default()
        };
        let table: StrategyTable<MetadataObject> = StrategyTable::new(&config);
        let supplier =
            PreheatSupplier::new(config, table, Arc::new(CacheRegistry::new()), Arc::clone(&store))
                .unwrap();

        let mut references = BTreeMap::new();
        references.insert(
            ObjectType::PROGRAM,
            ids(&["IpHINAT79UW", "ur1Edk5Oe2n", "eBAyeGv0exc", "xxxxxxxxxxx"]),
        );

        let preheat = supplier
            .preheat(&TrackerIdentifierParams::default(), UserContext::system(), &references)
            .unwrap();

        assert_eq!(preheat.len(), 3);
        assert_eq!(store.query_count(), 2);
        assert!(preheat.failures().is_empty());
    }

    #[test]
    fn test_supplier_rejects_invalid_config() {
        let config = PreheatConfig {
            split_size: 0,
            ..PreheatConfig::default()
        };
        let table: StrategyTable<MetadataObject> = StrategyTable::new(&config);
        let result = PreheatSupplier::new(
            config,
            table,
            Arc::new(CacheRegistry::new()),
            InMemoryObjectStore::<MetadataObject>::new(),
        );
        assert!(result.is_err());
    }
}
