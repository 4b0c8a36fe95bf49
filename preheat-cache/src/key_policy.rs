//! Cache keys and store filters derived from the id scheme.
//!
//! | scheme    | cache key        | store filter                              |
//! |-----------|------------------|-------------------------------------------|
//! | UID       | `UID:<uid>`      | `id in (ids)`                             |
//! | CODE      | `CODE:<code>`    | `code in (ids)`                           |
//! | ATTRIBUTE | never cached     | attribute lookup for the attribute value  |
//!
//! Keys carry the scheme so a code that happens to look like a uid can never
//! alias a uid-keyed entry in the same type's cache.

use preheat_core::{
    AttributeRef, ConfigError, FilterExpr, IdScheme, IdentifiableObject, ObjectType,
    TrackerIdentifier, CODE_FIELD, UID_FIELD,
};

/// How the backing store should be asked for a set of identifiers.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreFilter {
    /// A restriction for the generic query interface.
    Restriction(FilterExpr),
    /// A lookup through the attribute-value interface.
    AttributeValues {
        attribute: AttributeRef,
        values: Vec<String>,
    },
}

/// Derives cache keys and store filters from an id scheme.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentifierKeyPolicy;

impl IdentifierKeyPolicy {
    /// Key to probe the cache with for a caller-supplied identifier.
    pub fn probe_key(scheme: IdScheme, id: &str) -> Option<String> {
        match scheme {
            IdScheme::Uid | IdScheme::Code => Some(format!("{}:{}", scheme.as_str(), id)),
            IdScheme::Attribute => None,
        }
    }

    /// Key to store a fetched object under. Matches [`Self::probe_key`] for
    /// the identifier the object was requested by.
    pub fn cache_key<T: IdentifiableObject>(object: &T, scheme: IdScheme) -> Option<String> {
        match scheme {
            IdScheme::Uid => Self::probe_key(scheme, object.uid()),
            IdScheme::Code => object.code().and_then(|code| Self::probe_key(scheme, code)),
            IdScheme::Attribute => None,
        }
    }

    /// Filter selecting the objects referenced by `ids`.
    pub fn store_filter(
        object_type: &ObjectType,
        identifier: &TrackerIdentifier,
        ids: &[String],
    ) -> Result<StoreFilter, ConfigError> {
        match identifier.id_scheme {
            IdScheme::Uid => Ok(StoreFilter::Restriction(FilterExpr::in_list(UID_FIELD, ids))),
            IdScheme::Code => Ok(StoreFilter::Restriction(FilterExpr::in_list(CODE_FIELD, ids))),
            IdScheme::Attribute => Ok(StoreFilter::AttributeValues {
                attribute: identifier.attribute_ref(object_type)?,
                values: ids.to_vec(),
            }),
        }
    }

    /// The identifier an object answers to under `identifier`'s scheme.
    ///
    /// Used to index resolved objects; unlike [`Self::cache_key`] this covers
    /// attribute values too.
    pub fn identify<'a, T: IdentifiableObject>(
        object: &'a T,
        identifier: &TrackerIdentifier,
        attribute: Option<&AttributeRef>,
    ) -> Option<&'a str> {
        match identifier.id_scheme {
            IdScheme::Uid => Some(object.uid()),
            IdScheme::Code => object.code(),
            IdScheme::Attribute => attribute.and_then(|a| object.attribute_value(a)),
        }
    }
}
