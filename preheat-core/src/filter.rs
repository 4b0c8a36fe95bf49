//! Filter expressions for backing-store queries

use serde::{Deserialize, Serialize};

use crate::{Defaults, ObjectType, UserContext};

/// Field holding an object's surrogate id.
pub const UID_FIELD: &str = "id";

/// Field holding an object's business code.
pub const CODE_FIELD: &str = "code";

/// Filter operator for field comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    /// Equal to
    Eq,
    /// In list of values
    In,
}

/// Filter expression for queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterExpr {
    /// Field to filter on
    pub field: String,
    /// Operator to apply
    pub operator: FilterOperator,
    /// Value to compare against (a string, or an array of strings for `In`)
    pub value: serde_json::Value,
}

impl FilterExpr {
    /// Create a new filter expression.
    pub fn new(
        field: impl Into<String>,
        operator: FilterOperator,
        value: serde_json::Value,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    /// Create an equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Eq, serde_json::Value::String(value.into()))
    }

    /// Create a membership filter over a list of values.
    pub fn in_list<S: AsRef<str>>(field: impl Into<String>, values: &[S]) -> Self {
        let values = values
            .iter()
            .map(|v| serde_json::Value::String(v.as_ref().to_string()))
            .collect();
        Self::new(field, FilterOperator::In, serde_json::Value::Array(values))
    }

    /// String values this filter compares against.
    pub fn values(&self) -> Vec<&str> {
        match &self.value {
            serde_json::Value::String(s) => vec![s.as_str()],
            serde_json::Value::Array(items) => items.iter().filter_map(|v| v.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    /// Check a candidate field value against this filter.
    pub fn matches(&self, candidate: Option<&str>) -> bool {
        let Some(candidate) = candidate else {
            return false;
        };
        match self.operator {
            FilterOperator::Eq => self.value.as_str() == Some(candidate),
            FilterOperator::In => self.values().contains(&candidate),
        }
    }
}

/// A backing-store query: object type, restrictions, the user it runs as
/// and the default-object policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub object_type: ObjectType,
    pub filters: Vec<FilterExpr>,
    pub user: UserContext,
    pub defaults: Defaults,
}

impl Query {
    /// Start a query over all objects of a type.
    pub fn from_type(object_type: ObjectType) -> Self {
        Self {
            object_type,
            filters: Vec::new(),
            user: UserContext::default(),
            defaults: Defaults::Include,
        }
    }

    pub fn with_user(mut self, user: UserContext) -> Self {
        self.user = user;
        self
    }

    pub fn with_filter(mut self, filter: FilterExpr) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = defaults;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_list_matches_members_only() {
        let filter = FilterExpr::in_list(UID_FIELD, &["ou1", "ou2"]);
        assert_eq!(filter.values(), vec!["ou1", "ou2"]);
        assert!(filter.matches(Some("ou2")));
        assert!(!filter.matches(Some("ou3")));
        assert!(!filter.matches(None));
    }

    #[test]
    fn test_eq_filter() {
        let filter = FilterExpr::eq(CODE_FIELD, "OU_A");
        assert!(filter.matches(Some("OU_A")));
        assert!(!filter.matches(Some("OU_B")));
    }

    #[test]
    fn test_query_builder() {
        let query = Query::from_type(ObjectType::DATA_ELEMENT)
            .with_user(UserContext::new("admin"))
            .with_filter(FilterExpr::in_list(CODE_FIELD, &["DE_1"]))
            .with_defaults(Defaults::Exclude);
        assert_eq!(query.object_type, ObjectType::DATA_ELEMENT);
        assert_eq!(query.user.username, "admin");
        assert_eq!(query.filters.len(), 1);
        assert_eq!(query.defaults, Defaults::Exclude);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_in_list_matches_exactly_its_values(
                values in prop::collection::vec("[a-z]{1,8}", 0..20),
                candidate in "[a-z]{1,8}",
            ) {
                let filter = FilterExpr::in_list(UID_FIELD, &values);
                prop_assert_eq!(filter.values().len(), values.len());
                prop_assert_eq!(
                    filter.matches(Some(candidate.as_str())),
                    values.contains(&candidate)
                );
            }
        }
    }
}
