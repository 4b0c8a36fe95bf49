//! Enum types for PREHEAT identifiers

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// OBJECT TYPES
// ============================================================================

/// Domain object kind, used as the cache partition key.
///
/// Callers must supply the same key for the same domain kind across calls:
/// every cache and strategy lookup is keyed by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectType(Cow<'static, str>);

impl ObjectType {
    pub const ORGANISATION_UNIT: ObjectType = ObjectType(Cow::Borrowed("OrganisationUnit"));
    pub const PROGRAM: ObjectType = ObjectType(Cow::Borrowed("Program"));
    pub const PROGRAM_STAGE: ObjectType = ObjectType(Cow::Borrowed("ProgramStage"));
    pub const DATA_ELEMENT: ObjectType = ObjectType(Cow::Borrowed("DataElement"));
    pub const CATEGORY_OPTION: ObjectType = ObjectType(Cow::Borrowed("CategoryOption"));
    pub const CATEGORY_OPTION_COMBO: ObjectType =
        ObjectType(Cow::Borrowed("CategoryOptionCombo"));
    pub const TRACKED_ENTITY_TYPE: ObjectType = ObjectType(Cow::Borrowed("TrackedEntityType"));
    pub const TRACKED_ENTITY_ATTRIBUTE: ObjectType =
        ObjectType(Cow::Borrowed("TrackedEntityAttribute"));
    pub const RELATIONSHIP_TYPE: ObjectType = ObjectType(Cow::Borrowed("RelationshipType"));

    /// Create an object type from any name.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// The type name, e.g. `"OrganisationUnit"`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&'static str> for ObjectType {
    fn from(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }
}

impl From<String> for ObjectType {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

// ============================================================================
// IDENTIFIER SCHEMES
// ============================================================================

/// Identifier space a caller uses to reference an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IdScheme {
    /// Surrogate id (the 11 character uid)
    #[default]
    #[serde(alias = "ID")]
    Uid,
    /// Business code
    Code,
    /// Value of a custom attribute
    Attribute,
}

impl IdScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdScheme::Uid => "UID",
            IdScheme::Code => "CODE",
            IdScheme::Attribute => "ATTRIBUTE",
        }
    }

    /// Whether objects resolved under this scheme can be cached.
    ///
    /// Attribute values are not cached yet.
    pub fn is_cacheable(&self) -> bool {
        !matches!(self, IdScheme::Attribute)
    }
}

impl fmt::Display for IdScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IdScheme {
    type Err = IdSchemeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "UID" | "ID" => Ok(IdScheme::Uid),
            "CODE" => Ok(IdScheme::Code),
            "ATTRIBUTE" => Ok(IdScheme::Attribute),
            _ => Err(IdSchemeParseError(s.to_string())),
        }
    }
}

/// Error when parsing an invalid id scheme string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdSchemeParseError(pub String);

impl fmt::Display for IdSchemeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid id scheme: {}", self.0)
    }
}

impl std::error::Error for IdSchemeParseError {}

// ============================================================================
// QUERY DEFAULTS
// ============================================================================

/// Whether default objects (e.g. the default category option) are included
/// in backing-store query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Defaults {
    #[default]
    Include,
    Exclude,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_type_const_and_owned_compare_equal() {
        let owned = ObjectType::from("OrganisationUnit".to_string());
        assert_eq!(owned, ObjectType::ORGANISATION_UNIT);
        assert_eq!(owned.to_string(), "OrganisationUnit");
    }

    #[test]
    fn test_id_scheme_from_str_accepts_id_alias() {
        assert_eq!("id".parse::<IdScheme>().unwrap(), IdScheme::Uid);
        assert_eq!("UID".parse::<IdScheme>().unwrap(), IdScheme::Uid);
        assert_eq!("Code".parse::<IdScheme>().unwrap(), IdScheme::Code);
        assert!("NAME".parse::<IdScheme>().is_err());
    }

    #[test]
    fn test_id_scheme_serde_uses_uppercase_names() {
        let json = serde_json::to_string(&IdScheme::Attribute).unwrap();
        assert_eq!(json, "\"ATTRIBUTE\"");
        let parsed: IdScheme = serde_json::from_str("\"ID\"").unwrap();
        assert_eq!(parsed, IdScheme::Uid);
    }

    #[test]
    fn test_only_attribute_scheme_is_uncacheable() {
        assert!(IdScheme::Uid.is_cacheable());
        assert!(IdScheme::Code.is_cacheable());
        assert!(!IdScheme::Attribute.is_cacheable());
    }
}
