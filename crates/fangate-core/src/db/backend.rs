// Storage backend trait — the abstraction every persistence layer implements.
//
// The backend is schema-agnostic: records travel as `serde_json::Value` and
// the engine converts between typed models and JSON at its own boundary.
// Backends only need generic create/find/update/delete over named
// collections, so swapping the bundled in-memory store for a database is a
// matter of implementing this trait.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MarketError;

/// Result type for backend operations.
pub type BackendResult<T> = std::result::Result<T, MarketError>;

// ─── Filters ─────────────────────────────────────────────────────

/// Comparison operators for record filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// Equal (default).
    Eq,
    /// Not equal.
    Ne,
    /// Value is in the given list.
    In,
}

impl Default for Operator {
    fn default() -> Self {
        Self::Eq
    }
}

/// A single filter condition. Multiple filters combine conjunctively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Filter {
    /// The field name to filter on.
    pub field: String,
    /// The comparison value. For `In` this is an array of candidates.
    pub value: serde_json::Value,
    /// The comparison operator (default: Eq).
    #[serde(default)]
    pub operator: Operator,
}

impl Filter {
    /// Equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            operator: Operator::Eq,
        }
    }

    /// Inequality filter.
    pub fn ne(field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            operator: Operator::Ne,
        }
    }

    /// Membership filter: field value must be one of `values`.
    pub fn is_in(
        field: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<serde_json::Value>>,
    ) -> Self {
        Self {
            field: field.into(),
            value: serde_json::Value::Array(values.into_iter().map(Into::into).collect()),
            operator: Operator::In,
        }
    }
}

// ─── Sort / Pagination ───────────────────────────────────────────

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Sort order (field + direction). Sorting must be stable so that records
/// comparing equal keep their insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortBy {
    pub field: String,
    pub direction: SortDirection,
}

/// Query parameters for `find_many`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    pub filters: Vec<Filter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortBy>,
}

impl Query {
    /// Query matching the given filters, with no sort or pagination.
    pub fn filtered(filters: Vec<Filter>) -> Self {
        Self {
            filters,
            ..Default::default()
        }
    }
}

// ─── Backend Trait ───────────────────────────────────────────────

/// The storage backend trait.
///
/// Implementations persist JSON records in named collections and guarantee
/// that each operation is atomic: a failed call leaves the collection
/// unchanged, and concurrent readers never observe a half-applied write.
/// Unfiltered `find_many` returns records in insertion order.
#[async_trait]
pub trait StorageBackend: Send + Sync + fmt::Debug {
    /// Insert a record into the collection, generating an `id` when the
    /// caller did not supply one. Returns the stored record.
    async fn create(
        &self,
        collection: &str,
        data: serde_json::Value,
    ) -> BackendResult<serde_json::Value>;

    /// Find the first record matching all filters, in insertion order.
    async fn find_one(
        &self,
        collection: &str,
        filters: &[Filter],
    ) -> BackendResult<Option<serde_json::Value>>;

    /// Find every record matching the query.
    async fn find_many(
        &self,
        collection: &str,
        query: Query,
    ) -> BackendResult<Vec<serde_json::Value>>;

    /// Count records matching all filters.
    async fn count(&self, collection: &str, filters: &[Filter]) -> BackendResult<i64>;

    /// Merge `data` into the first record matching all filters.
    /// Returns the updated record, or `None` when nothing matched.
    async fn update(
        &self,
        collection: &str,
        filters: &[Filter],
        data: serde_json::Value,
    ) -> BackendResult<Option<serde_json::Value>>;

    /// Delete the first record matching all filters.
    /// Returns `true` when a record was removed.
    async fn delete(&self, collection: &str, filters: &[Filter]) -> BackendResult<bool>;
}

/// Convert a typed value into the JSON form backends store.
pub fn to_record<T: Serialize>(value: &T) -> BackendResult<serde_json::Value> {
    serde_json::to_value(value).map_err(MarketError::from)
}

/// Convert a stored JSON record back into its typed form.
pub fn from_record<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> BackendResult<T> {
    serde_json::from_value(value).map_err(MarketError::from)
}
