//! Backing-store interface and an in-memory implementation.

use preheat_core::{
    AttributeRef, IdentifiableObject, ObjectType, Query, StoreError, CODE_FIELD, UID_FIELD,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

/// Source of truth for metadata objects.
///
/// Both calls are synchronous from the caller's point of view. Implementations
/// report outages as [`StoreError::Unavailable`] so resolvers can fall back
/// to stale cache entries.
pub trait ObjectStore<T>: Send + Sync {
    /// Objects of `query.object_type` matching every filter.
    fn query(&self, query: &Query) -> Result<Vec<T>, StoreError>;

    /// Objects whose value for `attribute` is one of `values`.
    fn find_by_attribute_values(
        &self,
        object_type: &ObjectType,
        attribute: &AttributeRef,
        values: &[String],
    ) -> Result<Vec<T>, StoreError>;
}

impl<T, S> ObjectStore<T> for Arc<S>
where
    S: ObjectStore<T> + ?Sized,
{
    fn query(&self, query: &Query) -> Result<Vec<T>, StoreError> {
        (**self).query(query)
    }

    fn find_by_attribute_values(
        &self,
        object_type: &ObjectType,
        attribute: &AttributeRef,
        values: &[String],
    ) -> Result<Vec<T>, StoreError> {
        (**self).find_by_attribute_values(object_type, attribute, values)
    }
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

/// A call observed by [`InMemoryObjectStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedQuery {
    Query(Query),
    AttributeValues {
        object_type: ObjectType,
        attribute: AttributeRef,
        values: Vec<String>,
    },
}

impl RecordedQuery {
    pub fn object_type(&self) -> &ObjectType {
        match self {
            RecordedQuery::Query(query) => &query.object_type,
            RecordedQuery::AttributeValues { object_type, .. } => object_type,
        }
    }
}

/// In-memory store for tests and local runs.
///
/// Every call is recorded, including calls that fail. Marking the store
/// unavailable makes every call fail with [`StoreError::Unavailable`].
/// The `defaults` policy of a query is recorded but not applied.
#[derive(Debug)]
pub struct InMemoryObjectStore<T> {
    objects: RwLock<HashMap<ObjectType, Vec<T>>>,
    recorded: RwLock<Vec<RecordedQuery>>,
    available: AtomicBool,
}

impl<T> Default for InMemoryObjectStore<T> {
    fn default() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            recorded: RwLock::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }
}

impl<T: IdentifiableObject> InMemoryObjectStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Self::insert`].
    pub fn with_objects(
        self,
        object_type: ObjectType,
        objects: impl IntoIterator<Item = T>,
    ) -> Result<Self, StoreError> {
        self.insert(object_type, objects)?;
        Ok(self)
    }

    /// Add objects of a type.
    pub fn insert(
        &self,
        object_type: ObjectType,
        objects: impl IntoIterator<Item = T>,
    ) -> Result<(), StoreError> {
        let mut stored = self.objects.write().map_err(|_| StoreError::LockPoisoned)?;
        stored.entry(object_type).or_default().extend(objects);
        Ok(())
    }

    /// Simulate an outage (`false`) or recovery (`true`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    /// Number of calls made so far.
    pub fn query_count(&self) -> usize {
        self.recorded.read().map(|r| r.len()).unwrap_or(0)
    }

    /// Every call made so far, oldest first.
    pub fn recorded_queries(&self) -> Vec<RecordedQuery> {
        self.recorded.read().map(|r| r.clone()).unwrap_or_default()
    }

    /// Forget recorded calls.
    pub fn reset_recorded(&self) {
        if let Ok(mut recorded) = self.recorded.write() {
            recorded.clear();
        }
    }

    fn record(&self, call: RecordedQuery) -> Result<(), StoreError> {
        let object_type = call.object_type().clone();
        self.recorded
            .write()
            .map_err(|_| StoreError::LockPoisoned)?
            .push(call);

        if self.is_available() {
            Ok(())
        } else {
            Err(StoreError::Unavailable {
                object_type,
                reason: "store marked unavailable".to_string(),
            })
        }
    }

    fn select<F>(&self, object_type: &ObjectType, predicate: F) -> Result<Vec<T>, StoreError>
    where
        F: Fn(&T) -> bool,
    {
        let stored = self.objects.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(stored
            .get(object_type)
            .map(|objects| objects.iter().filter(|o| predicate(o)).cloned().collect())
            .unwrap_or_default())
    }
}

impl<T: IdentifiableObject> ObjectStore<T> for InMemoryObjectStore<T> {
    fn query(&self, query: &Query) -> Result<Vec<T>, StoreError> {
        self.record(RecordedQuery::Query(query.clone()))?;

        if let Some(filter) = query
            .filters
            .iter()
            .find(|f| f.field != UID_FIELD && f.field != CODE_FIELD)
        {
            return Err(StoreError::QueryFailed {
                object_type: query.object_type.clone(),
                reason: format!("unsupported filter field `{}`", filter.field),
            });
        }

        self.select(&query.object_type, |object| {
            query.filters.iter().all(|filter| {
                let candidate = if filter.field == UID_FIELD {
                    Some(object.uid())
                } else {
                    object.code()
                };
                filter.matches(candidate)
            })
        })
    }

    fn find_by_attribute_values(
        &self,
        object_type: &ObjectType,
        attribute: &AttributeRef,
        values: &[String],
    ) -> Result<Vec<T>, StoreError> {
        self.record(RecordedQuery::AttributeValues {
            object_type: object_type.clone(),
            attribute: attribute.clone(),
            values: values.to_vec(),
        })?;

        self.select(object_type, |object| {
            object
                .attribute_value(attribute)
                .is_some_and(|value| values.iter().any(|v| v == value))
        })
    }
}
