//! Error types for PREHEAT operations

use crate::ObjectType;
use thiserror::Error;

/// Backing-store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Backing store unavailable for {object_type}: {reason}")]
    Unavailable {
        object_type: ObjectType,
        reason: String,
    },

    #[error("Query failed for {object_type}: {reason}")]
    QueryFailed {
        object_type: ObjectType,
        reason: String,
    },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// Transient failures are covered by the cache resilience window;
    /// everything else propagates to the caller.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable { .. })
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Attribute id scheme for {object_type} requires an attribute reference")]
    MissingAttributeReference { object_type: ObjectType },

    #[error("Invalid uid: {value}")]
    InvalidUid { value: String },
}

/// Cache layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache for {object_type} already holds values of a different type than {requested}")]
    TypeMismatch {
        object_type: ObjectType,
        requested: &'static str,
    },
}

/// Reference resolution errors, reported per identifier after preheating.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReferenceError {
    /// The identifier matched nothing. This is a validation error on the
    /// imported payload, not a fault.
    #[error("{code}: {object_type} `{identifier}` could not be found")]
    Missing {
        code: &'static str,
        object_type: ObjectType,
        identifier: String,
    },

    /// The identifier could not be checked because the backing store was
    /// unavailable and no cached value covered it.
    #[error("{object_type} `{identifier}` could not be resolved: {reason}")]
    StoreUnavailable {
        object_type: ObjectType,
        identifier: String,
        reason: String,
    },
}

impl ReferenceError {
    /// Whether this should surface as an infrastructure fault rather than
    /// a validation error.
    pub fn is_infrastructure_fault(&self) -> bool {
        matches!(self, ReferenceError::StoreUnavailable { .. })
    }
}

/// Master error type for all PREHEAT errors.
#[derive(Debug, Clone, Error)]
pub enum PreheatError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Reference error: {0}")]
    Reference(#[from] ReferenceError),
}

/// Result type alias for PREHEAT operations.
pub type PreheatResult<T> = Result<T, PreheatError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display_unavailable() {
        let err = StoreError::Unavailable {
            object_type: ObjectType::ORGANISATION_UNIT,
            reason: "connection refused".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("unavailable"));
        assert!(msg.contains("OrganisationUnit"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_only_unavailable_is_transient() {
        let unavailable = StoreError::Unavailable {
            object_type: ObjectType::PROGRAM,
            reason: "timeout".to_string(),
        };
        let failed = StoreError::QueryFailed {
            object_type: ObjectType::PROGRAM,
            reason: "syntax".to_string(),
        };
        assert!(unavailable.is_transient());
        assert!(!failed.is_transient());
        assert!(!StoreError::LockPoisoned.is_transient());
    }

    #[test]
    fn test_config_error_display_missing_attribute() {
        let err = ConfigError::MissingAttributeReference {
            object_type: ObjectType::PROGRAM,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Program"));
        assert!(msg.contains("attribute reference"));
    }

    #[test]
    fn test_reference_error_classification() {
        let missing = ReferenceError::Missing {
            code: "E1049",
            object_type: ObjectType::ORGANISATION_UNIT,
            identifier: "ou1".to_string(),
        };
        assert!(!missing.is_infrastructure_fault());
        assert!(missing.to_string().starts_with("E1049"));

        let down = ReferenceError::StoreUnavailable {
            object_type: ObjectType::ORGANISATION_UNIT,
            identifier: "ou1".to_string(),
            reason: "timeout".to_string(),
        };
        assert!(down.is_infrastructure_fault());
    }

    #[test]
    fn test_preheat_error_from_variants() {
        let store = PreheatError::from(StoreError::LockPoisoned);
        assert!(matches!(store, PreheatError::Store(_)));

        let config = PreheatError::from(ConfigError::InvalidUid {
            value: "x".to_string(),
        });
        assert!(matches!(config, PreheatError::Config(_)));

        let cache = PreheatError::from(CacheError::TypeMismatch {
            object_type: ObjectType::PROGRAM,
            requested: "Program",
        });
        assert!(matches!(cache, PreheatError::Cache(_)));
    }
}
