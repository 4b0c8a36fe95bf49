//! Identity types for PREHEAT objects

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Username used for imports that run without an authenticated user.
pub const SYSTEM_USERNAME: &str = "system-process";

static UID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new("^[a-zA-Z][a-zA-Z0-9]{10}$").expect("uid pattern is a valid regex")
});

/// Check whether a string is a well-formed uid: 11 alphanumeric characters,
/// starting with a letter.
pub fn is_valid_uid(value: &str) -> bool {
    UID_PATTERN.is_match(value)
}

/// Reference to a custom attribute, used by the attribute id scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeRef {
    uid: String,
}

impl AttributeRef {
    /// Create an attribute reference, rejecting malformed uids.
    pub fn new(uid: impl Into<String>) -> Result<Self, ConfigError> {
        let uid = uid.into();
        if !is_valid_uid(&uid) {
            return Err(ConfigError::InvalidUid { value: uid });
        }
        Ok(Self { uid })
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }
}

/// User on whose behalf backing-store queries run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserContext {
    pub username: String,
}

impl UserContext {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    /// The system user that runs unattended imports.
    pub fn system() -> Self {
        Self::new(SYSTEM_USERNAME)
    }
}

impl Default for UserContext {
    fn default() -> Self {
        Self::system()
    }
}
