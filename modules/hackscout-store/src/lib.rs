//! Collection-oriented document persistence.
//!
//! Documents are JSON objects; filters are JSON objects matched by
//! containment (every filter key must be present with an equal value).
//! Ordering is always insertion order — callers pick oldest- or
//! newest-first, which is the only ordering the agents need.

pub mod error;
pub mod memory;
pub mod postgres;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use postgres::PgDocStore;

use async_trait::async_trait;
use serde_json::Value;

/// Insertion-order sort direction for `find`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    OldestFirst,
    NewestFirst,
}

/// Generic collection-oriented persistence used by all agents.
///
/// Implemented by `PgDocStore` (production) and `MemoryStore` (tests,
/// dry runs). Also implemented for `Arc<S>` so a store can be shared
/// between components and test assertions.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch documents matching `filter`, in insertion order.
    async fn find(
        &self,
        collection: &str,
        filter: &Value,
        order: SortOrder,
        limit: Option<usize>,
    ) -> Result<Vec<Value>>;

    /// Fetch the oldest document matching `filter`, if any.
    async fn find_one(&self, collection: &str, filter: &Value) -> Result<Option<Value>> {
        Ok(self
            .find(collection, filter, SortOrder::OldestFirst, Some(1))
            .await?
            .into_iter()
            .next())
    }

    /// Insert `doc` unless a document matching `filter` already exists.
    /// An existing match is left untouched. Returns whether a new
    /// document was inserted.
    async fn upsert(&self, collection: &str, filter: &Value, doc: Value) -> Result<bool>;

    /// Shallow-merge `patch` into the oldest document matching `filter`
    /// and return the updated document, or `None` when nothing matched.
    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Value,
        patch: &Value,
    ) -> Result<Option<Value>>;

    /// Append a document unconditionally.
    async fn insert(&self, collection: &str, doc: Value) -> Result<()>;
}

#[async_trait]
impl<S: DocumentStore + ?Sized> DocumentStore for std::sync::Arc<S> {
    async fn find(
        &self,
        collection: &str,
        filter: &Value,
        order: SortOrder,
        limit: Option<usize>,
    ) -> Result<Vec<Value>> {
        (**self).find(collection, filter, order, limit).await
    }

    async fn find_one(&self, collection: &str, filter: &Value) -> Result<Option<Value>> {
        (**self).find_one(collection, filter).await
    }

    async fn upsert(&self, collection: &str, filter: &Value, doc: Value) -> Result<bool> {
        (**self).upsert(collection, filter, doc).await
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Value,
        patch: &Value,
    ) -> Result<Option<Value>> {
        (**self).find_one_and_update(collection, filter, patch).await
    }

    async fn insert(&self, collection: &str, doc: Value) -> Result<()> {
        (**self).insert(collection, doc).await
    }
}

#[async_trait]
impl<S: DocumentStore + ?Sized> DocumentStore for &S {
    async fn find(
        &self,
        collection: &str,
        filter: &Value,
        order: SortOrder,
        limit: Option<usize>,
    ) -> Result<Vec<Value>> {
        (**self).find(collection, filter, order, limit).await
    }

    async fn find_one(&self, collection: &str, filter: &Value) -> Result<Option<Value>> {
        (**self).find_one(collection, filter).await
    }

    async fn upsert(&self, collection: &str, filter: &Value, doc: Value) -> Result<bool> {
        (**self).upsert(collection, filter, doc).await
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Value,
        patch: &Value,
    ) -> Result<Option<Value>> {
        (**self).find_one_and_update(collection, filter, patch).await
    }

    async fn insert(&self, collection: &str, doc: Value) -> Result<()> {
        (**self).insert(collection, doc).await
    }
}

/// Containment match: every key in `filter` exists in `doc` with an
/// equal value. An empty filter matches everything.
pub(crate) fn matches_filter(doc: &Value, filter: &Value) -> bool {
    match (doc.as_object(), filter.as_object()) {
        (Some(doc), Some(filter)) => filter.iter().all(|(k, v)| doc.get(k) == Some(v)),
        _ => false,
    }
}

/// Shallow merge: each key of `patch` overwrites the same key in `doc`.
pub(crate) fn merge_patch(doc: &mut Value, patch: &Value) {
    if let (Some(doc), Some(patch)) = (doc.as_object_mut(), patch.as_object()) {
        for (k, v) in patch {
            doc.insert(k.clone(), v.clone());
        }
    }
}
