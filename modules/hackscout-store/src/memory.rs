//! In-memory store for tests and dry runs. No database required.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Result, StoreError};
use crate::{matches_filter, merge_patch, DocumentStore, SortOrder};

/// Thread-safe in-memory `DocumentStore`. Vec order per collection is
/// the insertion order.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a collection in insertion order (for test assertions).
    pub fn dump(&self, collection: &str) -> Vec<Value> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of documents in a collection.
    pub fn len(&self, collection: &str) -> usize {
        self.dump(collection).len()
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: &str,
        filter: &Value,
        order: SortOrder,
        limit: Option<usize>,
    ) -> Result<Vec<Value>> {
        if !filter.is_object() {
            return Err(StoreError::InvalidFilter);
        }
        let guard = self.collections.lock().unwrap();
        let docs = guard.get(collection).map(Vec::as_slice).unwrap_or(&[]);

        let mut found: Vec<Value> = match order {
            SortOrder::OldestFirst => docs
                .iter()
                .filter(|d| matches_filter(d, filter))
                .cloned()
                .collect(),
            SortOrder::NewestFirst => docs
                .iter()
                .rev()
                .filter(|d| matches_filter(d, filter))
                .cloned()
                .collect(),
        };

        if let Some(limit) = limit {
            found.truncate(limit);
        }
        Ok(found)
    }

    async fn upsert(&self, collection: &str, filter: &Value, doc: Value) -> Result<bool> {
        if !filter.is_object() {
            return Err(StoreError::InvalidFilter);
        }
        if !doc.is_object() {
            return Err(StoreError::NotAnObject);
        }

        let mut guard = self.collections.lock().unwrap();
        let docs = guard.entry(collection.to_string()).or_default();
        if docs.iter().any(|d| matches_filter(d, filter)) {
            return Ok(false);
        }
        docs.push(doc);
        Ok(true)
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Value,
        patch: &Value,
    ) -> Result<Option<Value>> {
        if !filter.is_object() {
            return Err(StoreError::InvalidFilter);
        }
        let mut guard = self.collections.lock().unwrap();
        let Some(docs) = guard.get_mut(collection) else {
            return Ok(None);
        };
        for doc in docs.iter_mut() {
            if matches_filter(doc, filter) {
                merge_patch(doc, patch);
                return Ok(Some(doc.clone()));
            }
        }
        Ok(None)
    }

    async fn insert(&self, collection: &str, doc: Value) -> Result<()> {
        if !doc.is_object() {
            return Err(StoreError::NotAnObject);
        }
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .push(doc);
        Ok(())
    }
}
