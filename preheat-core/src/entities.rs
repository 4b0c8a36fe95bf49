//! Domain objects that can be resolved from identifiers

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{AttributeRef, ObjectType, Timestamp};

/// An object that can be referenced by uid, code or attribute value.
///
/// # Implementation Requirements
///
/// - `uid()` must be stable for the object's lifetime
/// - Implementations must be `Clone + Send + Sync + 'static` so resolved
///   values can be shared across worker threads and held by the cache
pub trait IdentifiableObject: Clone + Send + Sync + 'static {
    /// The surrogate id.
    fn uid(&self) -> &str;

    /// The business code, if the object has one.
    fn code(&self) -> Option<&str>;

    /// The value of a custom attribute, if set.
    fn attribute_value(&self, _attribute: &AttributeRef) -> Option<&str> {
        None
    }
}

/// Generic metadata object as returned by the backing store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataObject {
    pub uid: String,
    pub object_type: ObjectType,
    pub code: Option<String>,
    pub name: String,
    pub short_name: Option<String>,
    pub description: Option<String>,
    /// Attribute uid to value
    #[serde(default)]
    pub attribute_values: BTreeMap<String, String>,
    pub last_updated: Option<Timestamp>,
}

impl MetadataObject {
    pub fn new(object_type: ObjectType, uid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            object_type,
            code: None,
            name: name.into(),
            short_name: None,
            description: None,
            attribute_values: BTreeMap::new(),
            last_updated: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_attribute(
        mut self,
        attribute_uid: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.attribute_values.insert(attribute_uid.into(), value.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl IdentifiableObject for MetadataObject {
    fn uid(&self) -> &str {
        &self.uid
    }

    fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    fn attribute_value(&self, attribute: &AttributeRef) -> Option<&str> {
        self.attribute_values.get(attribute.uid()).map(String::as_str)
    }
}
