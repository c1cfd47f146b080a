//! Metadata predicates understood by the vector store.

use serde_json::{Map, Value, json};

/// Predicate over a record's metadata.
///
/// List-valued metadata fields match when any element satisfies the
/// predicate, mirroring how the hosted store treats string lists.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataFilter {
    /// Field equals the value.
    Eq {
        /// Metadata key.
        field: String,
        /// Expected value.
        value: Value,
    },
    /// Field equals one of the values.
    In {
        /// Metadata key.
        field: String,
        /// Accepted values.
        values: Vec<Value>,
    },
    /// Every nested predicate holds.
    And(Vec<MetadataFilter>),
}

impl MetadataFilter {
    /// Equality predicate.
    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Set-membership predicate.
    #[must_use]
    pub fn any_of<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Conjunction of `filters`; `None` when empty, the sole filter when there is one.
    #[must_use]
    pub fn all(filters: Vec<Self>) -> Option<Self> {
        let mut filters = filters;
        match filters.len() {
            0 => None,
            1 => filters.pop(),
            _ => Some(Self::And(filters)),
        }
    }

    /// Renders the predicate in the hosted store's native filter language.
    #[must_use]
    pub fn to_native(&self) -> Value {
        match self {
            Self::Eq { field, value } => json!({ field.as_str(): { "$eq": value } }),
            Self::In { field, values } => json!({ field.as_str(): { "$in": values } }),
            Self::And(filters) => {
                let clauses: Vec<Value> = filters.iter().map(Self::to_native).collect();
                json!({ "$and": clauses })
            }
        }
    }

    /// Evaluates the predicate locally.
    #[must_use]
    pub fn matches(&self, metadata: &Map<String, Value>) -> bool {
        match self {
            Self::Eq { field, value } => {
                field_values(metadata, field).any(|candidate| candidate == value)
            }
            Self::In { field, values } => {
                field_values(metadata, field).any(|candidate| values.contains(candidate))
            }
            Self::And(filters) => filters.iter().all(|filter| filter.matches(metadata)),
        }
    }
}

fn field_values<'a>(
    metadata: &'a Map<String, Value>,
    field: &str,
) -> Box<dyn Iterator<Item = &'a Value> + 'a> {
    match metadata.get(field) {
        Some(Value::Array(items)) => Box::new(items.iter()),
        Some(value) => Box::new(std::iter::once(value)),
        None => Box::new(std::iter::empty()),
    }
}
