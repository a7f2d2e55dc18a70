// In-memory storage backend — HashMap-based store implementing the core
// StorageBackend trait.
//
// Records are stored per collection as `Vec<serde_json::Value>` in insertion
// order, behind a `tokio::sync::RwLock`. Each trait method takes the lock
// once, so every operation is atomic and readers always see a consistent
// snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use fangate_core::db::backend::{
    BackendResult, Filter, Operator, Query, SortDirection, StorageBackend,
};

/// Type alias for the in-memory store.
type Store = HashMap<String, Vec<serde_json::Value>>;

/// In-memory storage backend.
///
/// Cloning is cheap and clones share the same underlying store.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    store: Arc<RwLock<Store>>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Create a new empty backend.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a backend pre-populated with data.
    pub fn with_data(data: Store) -> Self {
        Self {
            store: Arc::new(RwLock::new(data)),
        }
    }

    /// Get a snapshot of all data (for debugging/testing).
    pub async fn snapshot(&self) -> Store {
        self.store.read().await.clone()
    }

    /// Clear all data.
    pub async fn clear(&self) {
        self.store.write().await.clear();
    }

    /// Record count for a collection.
    pub async fn collection_count(&self, collection: &str) -> usize {
        self.store
            .read()
            .await
            .get(collection)
            .map(|v| v.len())
            .unwrap_or(0)
    }
}

/// Check whether a record matches every filter.
fn matches_filters(record: &serde_json::Value, filters: &[Filter]) -> bool {
    filters.iter().all(|filter| {
        let field_val = record
            .get(&filter.field)
            .cloned()
            .unwrap_or(serde_json::Value::Null);
        match_operator(&field_val, &filter.value, &filter.operator)
    })
}

/// Match a single operator condition.
fn match_operator(
    field_val: &serde_json::Value,
    target: &serde_json::Value,
    op: &Operator,
) -> bool {
    match op {
        Operator::Eq => field_val == target,
        Operator::Ne => field_val != target,
        Operator::In => {
            if let serde_json::Value::Array(candidates) = target {
                candidates.contains(field_val)
            } else {
                false
            }
        }
    }
}

/// Compare two JSON values numerically or lexicographically.
fn compare_json(a: &serde_json::Value, b: &serde_json::Value) -> Option<std::cmp::Ordering> {
    match (a, b) {
        (serde_json::Value::Number(an), serde_json::Value::Number(bn)) => {
            an.as_f64()?.partial_cmp(&bn.as_f64()?)
        }
        (serde_json::Value::String(a_s), serde_json::Value::String(b_s)) => Some(a_s.cmp(b_s)),
        _ => None,
    }
}

/// Apply sorting to records. `sort_by` is stable, so records with equal
/// keys keep their insertion order.
fn sort_records(records: &mut [serde_json::Value], query: &Query) {
    if let Some(ref sort) = query.sort_by {
        records.sort_by(|a, b| {
            let cmp = match (a.get(&sort.field), b.get(&sort.field)) {
                (Some(av), Some(bv)) => compare_json(av, bv).unwrap_or(std::cmp::Ordering::Equal),
                (Some(_), None) => std::cmp::Ordering::Greater,
                (None, Some(_)) => std::cmp::Ordering::Less,
                (None, None) => std::cmp::Ordering::Equal,
            };
            match sort.direction {
                SortDirection::Asc => cmp,
                SortDirection::Desc => cmp.reverse(),
            }
        });
    }
}

/// Merge update data into an existing record. Only keys present in `data`
/// are touched.
fn merge_update(record: &mut serde_json::Value, data: &serde_json::Value) {
    if let (Some(rec_obj), Some(data_obj)) = (record.as_object_mut(), data.as_object()) {
        for (k, v) in data_obj {
            rec_obj.insert(k.clone(), v.clone());
        }
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn create(
        &self,
        collection: &str,
        data: serde_json::Value,
    ) -> BackendResult<serde_json::Value> {
        let mut record = data;

        // Backfill an ID when the caller did not supply one.
        if record.get("id").is_none() || record.get("id") == Some(&serde_json::Value::Null) {
            if let Some(obj) = record.as_object_mut() {
                obj.insert(
                    "id".to_string(),
                    serde_json::Value::String(uuid::Uuid::new_v4().to_string()),
                );
            }
        }

        let mut store = self.store.write().await;
        store
            .entry(collection.to_string())
            .or_default()
            .push(record.clone());

        Ok(record)
    }

    async fn find_one(
        &self,
        collection: &str,
        filters: &[Filter],
    ) -> BackendResult<Option<serde_json::Value>> {
        let store = self.store.read().await;
        Ok(store.get(collection).and_then(|records| {
            records
                .iter()
                .find(|r| matches_filters(r, filters))
                .cloned()
        }))
    }

    async fn find_many(
        &self,
        collection: &str,
        query: Query,
    ) -> BackendResult<Vec<serde_json::Value>> {
        let store = self.store.read().await;
        let empty = Vec::new();
        let records = store.get(collection).unwrap_or(&empty);

        let mut result: Vec<serde_json::Value> = records
            .iter()
            .filter(|r| matches_filters(r, &query.filters))
            .cloned()
            .collect();

        sort_records(&mut result, &query);

        if let Some(offset) = query.offset {
            if (offset as usize) < result.len() {
                result = result.split_off(offset as usize);
            } else {
                result.clear();
            }
        }

        if let Some(limit) = query.limit {
            result.truncate(limit as usize);
        }

        Ok(result)
    }

    async fn count(&self, collection: &str, filters: &[Filter]) -> BackendResult<i64> {
        let store = self.store.read().await;
        let count = store
            .get(collection)
            .map(|records| records.iter().filter(|r| matches_filters(r, filters)).count())
            .unwrap_or(0);
        Ok(count as i64)
    }

    async fn update(
        &self,
        collection: &str,
        filters: &[Filter],
        data: serde_json::Value,
    ) -> BackendResult<Option<serde_json::Value>> {
        let mut store = self.store.write().await;
        if let Some(records) = store.get_mut(collection) {
            if let Some(record) = records.iter_mut().find(|r| matches_filters(r, filters)) {
                merge_update(record, &data);
                return Ok(Some(record.clone()));
            }
        }
        Ok(None)
    }

    async fn delete(&self, collection: &str, filters: &[Filter]) -> BackendResult<bool> {
        let mut store = self.store.write().await;
        if let Some(records) = store.get_mut(collection) {
            if let Some(pos) = records.iter().position(|r| matches_filters(r, filters)) {
                records.remove(pos);
                return Ok(true);
            }
        }
        Ok(false)
    }
}
