//! PREHEAT Test Utilities
//!
//! Shared test infrastructure for the PREHEAT workspace:
//! - Proptest generators for identifiers, objects and configs
//! - Fixtures modelled on a small demo database
//! - Assertions for PREHEAT error variants

// Re-export core types for convenience
pub use preheat_core::{
    AttributeRef, CacheConfig, ConfigError, IdScheme, MetadataObject, ObjectType, PreheatError,
    PreheatResult, ReferenceError, StoreError, TrackerIdentifier, TrackerIdentifierParams,
    UserContext,
};

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for PREHEAT types.

    use super::*;
    use proptest::prelude::*;

    /// Generate a valid 11-character uid.
    pub fn arb_uid() -> impl Strategy<Value = String> {
        "[a-zA-Z][a-zA-Z0-9]{10}"
    }

    /// Generate a business code.
    pub fn arb_code() -> impl Strategy<Value = String> {
        "[A-Z]{2,4}_[0-9]{1,6}"
    }

    /// Generate one of the built-in object types.
    pub fn arb_object_type() -> impl Strategy<Value = ObjectType> {
        prop_oneof![
            Just(ObjectType::ORGANISATION_UNIT),
            Just(ObjectType::PROGRAM),
            Just(ObjectType::PROGRAM_STAGE),
            Just(ObjectType::DATA_ELEMENT),
            Just(ObjectType::CATEGORY_OPTION),
            Just(ObjectType::CATEGORY_OPTION_COMBO),
            Just(ObjectType::TRACKED_ENTITY_TYPE),
            Just(ObjectType::TRACKED_ENTITY_ATTRIBUTE),
            Just(ObjectType::RELATIONSHIP_TYPE),
        ]
    }

    /// Generate an identifier; attribute identifiers carry a valid uid.
    pub fn arb_tracker_identifier() -> impl Strategy<Value = TrackerIdentifier> {
        prop_oneof![
            Just(TrackerIdentifier::UID),
            Just(TrackerIdentifier::CODE),
            arb_uid().prop_map(TrackerIdentifier::attribute),
        ]
    }

    /// Generate a cache config that passes validation.
    pub fn arb_cache_config() -> impl Strategy<Value = CacheConfig> {
        (1u32..=120, 0u32..=300, any::<bool>()).prop_map(|(ttl, resilience, enabled)| {
            CacheConfig::new()
                .with_ttl_minutes(ttl)
                .with_resilience_seconds(resilience)
                .with_cache_enabled(enabled)
        })
    }

    /// Generate objects of one type with distinct uids and codes.
    pub fn arb_distinct_objects(
        object_type: ObjectType,
        max: usize,
    ) -> impl Strategy<Value = Vec<MetadataObject>> {
        prop::collection::btree_set(arb_uid(), 0..=max).prop_map(move |uids| {
            uids.into_iter()
                .enumerate()
                .map(|(i, uid)| {
                    MetadataObject::new(object_type.clone(), uid, format!("Object {}", i))
                        .with_code(format!("CODE_{}", i))
                })
                .collect()
        })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built objects for common scenarios.

    use super::*;

    /// Attribute uid used by the fixtures' attribute values.
    pub const FIXTURE_ATTRIBUTE_UID: &str = "Ah3kQ9fL2mZ";

    pub fn attribute() -> AttributeRef {
        AttributeRef::new(FIXTURE_ATTRIBUTE_UID).expect("fixture attribute uid is well formed")
    }

    pub fn attribute_identifier() -> TrackerIdentifier {
        TrackerIdentifier::attribute(FIXTURE_ATTRIBUTE_UID)
    }

    /// An organisation unit with code `OU_<n>` and attribute value `ATTR_<n>`.
    pub fn org_unit(uid: &str, n: u32) -> MetadataObject {
        MetadataObject::new(ObjectType::ORGANISATION_UNIT, uid, format!("Clinic {}", n))
            .with_code(format!("OU_{}", n))
            .with_attribute(FIXTURE_ATTRIBUTE_UID, format!("ATTR_{}", n))
    }

    /// Two organisation units with uids `ou1` and `ou2`.
    pub fn org_units() -> Vec<MetadataObject> {
        vec![org_unit("ou1", 1), org_unit("ou2", 2)]
    }

    pub fn program() -> MetadataObject {
        MetadataObject::new(ObjectType::PROGRAM, "IpHINAT79UW", "Child Programme")
            .with_code("CHILD")
            .with_description("Routine child health follow-up")
    }

    pub fn data_element() -> MetadataObject {
        MetadataObject::new(ObjectType::DATA_ELEMENT, "fbfJHSPpUQD", "ANC 1st visit")
            .with_code("DE_359596")
            .with_attribute(FIXTURE_ATTRIBUTE_UID, "ANC1")
    }

    pub fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    /// A config with short TTL and resilience, for expiry tests.
    pub fn short_lived_cache() -> CacheConfig {
        CacheConfig::new()
            .with_ttl_minutes(1)
            .with_resilience_seconds(10)
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for PREHEAT-specific validation.

    use super::*;

    /// Assert that a PreheatResult is Ok.
    #[track_caller]
    pub fn assert_ok<T: std::fmt::Debug>(result: &PreheatResult<T>) {
        assert!(result.is_ok(), "Expected Ok, got Err: {:?}", result);
    }

    /// Assert that a PreheatResult is a Config error.
    #[track_caller]
    pub fn assert_config_error<T: std::fmt::Debug>(result: &PreheatResult<T>) {
        match result {
            Err(PreheatError::Config(_)) => {}
            other => panic!("Expected Config error, got: {:?}", other),
        }
    }

    /// Assert that a PreheatResult is a Store error.
    #[track_caller]
    pub fn assert_store_error<T: std::fmt::Debug>(result: &PreheatResult<T>) {
        match result {
            Err(PreheatError::Store(_)) => {}
            other => panic!("Expected Store error, got: {:?}", other),
        }
    }

    /// Assert that a reference check failed as a missing reference.
    #[track_caller]
    pub fn assert_missing_reference<T: std::fmt::Debug>(result: &Result<T, ReferenceError>) {
        match result {
            Err(ReferenceError::Missing { .. }) => {}
            other => panic!("Expected Missing reference, got: {:?}", other),
        }
    }

    /// Assert that a reference check failed because the store was down.
    #[track_caller]
    pub fn assert_store_unavailable<T: std::fmt::Debug>(result: &Result<T, ReferenceError>) {
        match result {
            Err(ReferenceError::StoreUnavailable { .. }) => {}
            other => panic!("Expected StoreUnavailable reference, got: {:?}", other),
        }
    }
}
