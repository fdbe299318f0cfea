//! Postgres-backed `DocumentStore`.
//!
//! One table holds every collection: a BIGSERIAL `seq` gives insertion
//! order, `doc` is a JSONB object. Filters use JSONB containment
//! (`doc @> filter`), so the upsert's insert-if-absent check and the
//! matching `find` share the same semantics.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

use crate::error::{Result, StoreError};
use crate::{DocumentStore, SortOrder};

#[derive(Clone)]
pub struct PgDocStore {
    pool: PgPool,
}

impl PgDocStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Create the documents table and indexes if they do not exist.
    /// Idempotent; run at startup.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                seq        BIGSERIAL PRIMARY KEY,
                collection TEXT      NOT NULL,
                doc        JSONB     NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents (collection)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_documents_doc ON documents USING GIN (doc jsonb_path_ops)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PgDocStore {
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

        let sql = match order {
            SortOrder::OldestFirst => {
                "SELECT doc FROM documents
                 WHERE collection = $1 AND doc @> $2
                 ORDER BY seq ASC
                 LIMIT $3"
            }
            SortOrder::NewestFirst => {
                "SELECT doc FROM documents
                 WHERE collection = $1 AND doc @> $2
                 ORDER BY seq DESC
                 LIMIT $3"
            }
        };

        let docs = sqlx::query_scalar::<_, Value>(sql)
            .bind(collection)
            .bind(filter)
            .bind(limit.map(|l| l as i64))
            .fetch_all(&self.pool)
            .await?;

        Ok(docs)
    }

    async fn upsert(&self, collection: &str, filter: &Value, doc: Value) -> Result<bool> {
        if !filter.is_object() {
            return Err(StoreError::InvalidFilter);
        }
        if !doc.is_object() {
            return Err(StoreError::NotAnObject);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO documents (collection, doc)
            SELECT $1, $2
            WHERE NOT EXISTS (
                SELECT 1 FROM documents WHERE collection = $1 AND doc @> $3
            )
            "#,
        )
        .bind(collection)
        .bind(&doc)
        .bind(filter)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Value,
        patch: &Value,
    ) -> Result<Option<Value>> {
        if !filter.is_object() || !patch.is_object() {
            return Err(StoreError::InvalidFilter);
        }

        let updated = sqlx::query_scalar::<_, Value>(
            r#"
            UPDATE documents SET doc = doc || $3
            WHERE seq = (
                SELECT seq FROM documents
                WHERE collection = $1 AND doc @> $2
                ORDER BY seq ASC
                LIMIT 1
            )
            RETURNING doc
            "#,
        )
        .bind(collection)
        .bind(filter)
        .bind(patch)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn insert(&self, collection: &str, doc: Value) -> Result<()> {
        if !doc.is_object() {
            return Err(StoreError::NotAnObject);
        }

        sqlx::query("INSERT INTO documents (collection, doc) VALUES ($1, $2)")
            .bind(collection)
            .bind(&doc)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
