//! Documents, filters and collection namespaces.
//!
//! A document is a flat JSON object. Filters are documents too: a document
//! matches a filter when every filter entry is present in the document with an
//! equal value. This is the only query shape the ticket workflow needs.

use crate::store::StoreError;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::fmt;

/// A stored document (top-level JSON object).
pub type Document = Map<String, Value>;

/// An exact-equality filter over top-level document fields.
pub type Filter = Map<String, Value>;

/// Identifies one collection inside one logical database.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace {
    database: String,
    collection: String,
}

impl Namespace {
    /// Creates a namespace for `collection` inside `database`.
    #[must_use]
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: collection.into(),
        }
    }

    /// The logical database name.
    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }

    /// The collection name.
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}

/// Builds a filter from string-valued `(field, value)` pairs.
///
/// # Example
///
/// ```
/// use ticket_chain_core::document::filter;
///
/// let f = filter([("ticketId", "T1"), ("contractAddress", "0xA")]);
/// assert_eq!(f.len(), 2);
/// ```
#[must_use]
pub fn filter<const N: usize>(pairs: [(&str, &str); N]) -> Filter {
    pairs
        .into_iter()
        .map(|(field, value)| (field.to_string(), Value::String(value.to_string())))
        .collect()
}

/// Returns `true` if `document` carries every entry of `filter` with an equal value.
///
/// An empty filter matches every document.
#[must_use]
pub fn matches(document: &Document, filter: &Filter) -> bool {
    filter
        .iter()
        .all(|(field, expected)| document.get(field) == Some(expected))
}

/// Serializes a domain value into a document.
///
/// # Errors
///
/// Returns [`StoreError::Serialization`] if the value does not serialize to a JSON object.
pub fn to_document<T: Serialize>(value: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(StoreError::Serialization(format!(
            "expected a JSON object, got {other}"
        ))),
        Err(e) => Err(StoreError::Serialization(e.to_string())),
    }
}

/// Deserializes a stored document into a domain value.
///
/// Unknown fields are ignored, so projections can be read from richer records.
///
/// # Errors
///
/// Returns [`StoreError::Serialization`] if required fields are missing or mistyped.
pub fn from_document<T: DeserializeOwned>(document: Document) -> Result<T, StoreError> {
    serde_json::from_value(Value::Object(document))
        .map_err(|e| StoreError::Serialization(e.to_string()))
}
