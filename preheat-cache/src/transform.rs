//! Post-fetch transforms applied before objects are cached or returned.

use preheat_core::MetadataObject;
use std::fmt;
use std::sync::Arc;

/// A named object-to-object mapping.
///
/// Mappers usually copy an object into a restricted shape holding only the
/// fields later validation needs, which keeps cached values small.
pub trait ObjectMapper<T>: Send + Sync {
    fn name(&self) -> &str;

    fn map(&self, object: T) -> T;
}

/// Transform configured for an object type.
pub enum TransformKind<T> {
    /// Objects pass through unchanged.
    Identity,
    /// Objects are mapped one by one.
    FieldMap(Arc<dyn ObjectMapper<T>>),
}

impl<T> TransformKind<T> {
    /// Wrap a mapper.
    pub fn field_map(mapper: impl ObjectMapper<T> + 'static) -> Self {
        TransformKind::FieldMap(Arc::new(mapper))
    }

    pub fn name(&self) -> &str {
        match self {
            TransformKind::Identity => "identity",
            TransformKind::FieldMap(mapper) => mapper.name(),
        }
    }

    /// Apply the transform to every object.
    pub fn apply(&self, objects: Vec<T>) -> Vec<T> {
        match self {
            TransformKind::Identity => objects,
            TransformKind::FieldMap(mapper) => {
                objects.into_iter().map(|object| mapper.map(object)).collect()
            }
        }
    }
}

impl<T> Clone for TransformKind<T> {
    fn clone(&self) -> Self {
        match self {
            TransformKind::Identity => TransformKind::Identity,
            TransformKind::FieldMap(mapper) => TransformKind::FieldMap(Arc::clone(mapper)),
        }
    }
}

impl<T> Default for TransformKind<T> {
    fn default() -> Self {
        TransformKind::Identity
    }
}

impl<T> fmt::Debug for TransformKind<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformKind::Identity => write!(f, "Identity"),
            TransformKind::FieldMap(mapper) => {
                f.debug_tuple("FieldMap").field(&mapper.name()).finish()
            }
        }
    }
}

/// Mapper backed by a closure.
pub struct FnMapper<F> {
    name: String,
    f: F,
}

impl<F> FnMapper<F> {
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<T, F> ObjectMapper<T> for FnMapper<F>
where
    F: Fn(T) -> T + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn map(&self, object: T) -> T {
        (self.f)(object)
    }
}

/// Keeps identity fields and the name; drops descriptions, attribute values
/// and audit timestamps.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataSummaryMapper;

impl ObjectMapper<MetadataObject> for MetadataSummaryMapper {
    fn name(&self) -> &str {
        "metadata-summary"
    }

    fn map(&self, object: MetadataObject) -> MetadataObject {
        MetadataObject {
            uid: object.uid,
            object_type: object.object_type,
            code: object.code,
            name: object.name,
            short_name: None,
            description: None,
            attribute_values: Default::default(),
            last_updated: None,
        }
    }
}
