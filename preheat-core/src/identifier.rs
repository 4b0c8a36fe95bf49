//! Identifier settings for an import
//!
//! An import payload references metadata by uid, code or attribute value,
//! chosen per object type. [`TrackerIdentifierParams`] carries that choice and
//! serializes in the same camelCase shape as the import request parameters.

use serde::{Deserialize, Serialize};

use crate::{AttributeRef, ConfigError, IdScheme, ObjectType};

/// An id scheme plus the attribute uid it needs when the scheme is
/// [`IdScheme::Attribute`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerIdentifier {
    pub id_scheme: IdScheme,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl TrackerIdentifier {
    pub const UID: TrackerIdentifier = TrackerIdentifier {
        id_scheme: IdScheme::Uid,
        value: None,
    };

    pub const CODE: TrackerIdentifier = TrackerIdentifier {
        id_scheme: IdScheme::Code,
        value: None,
    };

    /// Identify objects by the value of the given attribute.
    pub fn attribute(attribute_uid: impl Into<String>) -> Self {
        Self {
            id_scheme: IdScheme::Attribute,
            value: Some(attribute_uid.into()),
        }
    }

    /// The attribute this identifier resolves through.
    pub fn attribute_ref(&self, object_type: &ObjectType) -> Result<AttributeRef, ConfigError> {
        match &self.value {
            Some(uid) if self.id_scheme == IdScheme::Attribute => AttributeRef::new(uid.clone()),
            _ => Err(ConfigError::MissingAttributeReference {
                object_type: object_type.clone(),
            }),
        }
    }
}

/// Per-object-type identifier choices for an import.
///
/// Types without a dedicated field use `id_scheme`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackerIdentifierParams {
    pub id_scheme: TrackerIdentifier,
    pub org_unit_id_scheme: TrackerIdentifier,
    pub program_id_scheme: TrackerIdentifier,
    pub program_stage_id_scheme: TrackerIdentifier,
    pub data_element_id_scheme: TrackerIdentifier,
    pub category_option_combo_id_scheme: TrackerIdentifier,
    pub category_option_id_scheme: TrackerIdentifier,
}

impl TrackerIdentifierParams {
    /// Use the same identifier for every object type.
    pub fn uniform(identifier: TrackerIdentifier) -> Self {
        Self {
            id_scheme: identifier.clone(),
            org_unit_id_scheme: identifier.clone(),
            program_id_scheme: identifier.clone(),
            program_stage_id_scheme: identifier.clone(),
            data_element_id_scheme: identifier.clone(),
            category_option_combo_id_scheme: identifier.clone(),
            category_option_id_scheme: identifier,
        }
    }

    /// Select the identifier configured for an object type.
    pub fn by_type(&self, object_type: &ObjectType) -> &TrackerIdentifier {
        match object_type.as_str() {
            "OrganisationUnit" => &self.org_unit_id_scheme,
            "Program" => &self.program_id_scheme,
            "ProgramStage" => &self.program_stage_id_scheme,
            "DataElement" => &self.data_element_id_scheme,
            "CategoryOptionCombo" => &self.category_option_combo_id_scheme,
            "CategoryOption" => &self.category_option_id_scheme,
            _ => &self.id_scheme,
        }
    }
}
