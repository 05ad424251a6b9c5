//! PostgreSQL-backed document store
//!
//! Documents live in a single JSONB table keyed by `(collection, id)`.
//! Conditional updates lock the candidate rows with `SELECT ... FOR UPDATE`
//! inside a transaction, then evaluate the filter and apply the update with
//! the same code the in-memory store uses.

use crate::{assign_id, Document, DocumentStore, Filter, RecordId, StoreError, Update};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPool;
use sqlx::types::Json;
use sqlx::{Postgres, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `documents` table if needed
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        debug!("Running record-store migrations");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Record-store migrations completed successfully");
        Ok(())
    }

    /// Candidate rows for `filter`, locked for the rest of `tx`
    async fn lock_candidates(
        tx: &mut Transaction<'_, Postgres>,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<(Uuid, Document)>, StoreError> {
        let rows: Vec<(Uuid, Json<Document>)> = match filter.id() {
            Some(id) => {
                sqlx::query_as(
                    r#"
                    SELECT id, body FROM documents
                    WHERE collection = $1 AND id = $2
                    FOR UPDATE
                    "#,
                )
                .bind(collection)
                .bind(*id.as_uuid())
                .fetch_all(&mut **tx)
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"
                    SELECT id, body FROM documents
                    WHERE collection = $1 AND body @> $2
                    ORDER BY id
                    FOR UPDATE
                    "#,
                )
                .bind(collection)
                .bind(Json(Value::Object(filter.scalar_equalities())))
                .fetch_all(&mut **tx)
                .await?
            }
        };
        Ok(rows.into_iter().map(|(id, body)| (id, body.0)).collect())
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        let rows: Vec<Json<Document>> = match filter.id() {
            Some(id) => {
                sqlx::query_scalar(
                    r#"
                    SELECT body FROM documents
                    WHERE collection = $1 AND id = $2
                    "#,
                )
                .bind(collection)
                .bind(*id.as_uuid())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar(
                    r#"
                    SELECT body FROM documents
                    WHERE collection = $1 AND body @> $2
                    ORDER BY id
                    "#,
                )
                .bind(collection)
                .bind(Json(Value::Object(filter.scalar_equalities())))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows
            .into_iter()
            .map(|body| body.0)
            .find(|doc| filter.matches(doc)))
    }

    async fn insert_one(
        &self,
        collection: &str,
        mut document: Document,
    ) -> Result<RecordId, StoreError> {
        let id = assign_id(&mut document)?;
        let result = sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id) DO NOTHING
            "#,
        )
        .bind(collection)
        .bind(*id.as_uuid())
        .bind(Json(&document))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Duplicate(format!("{collection}/{id}")));
        }
        Ok(id)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;

        let candidates = Self::lock_candidates(&mut tx, collection, filter).await?;
        let Some((id, mut document)) = candidates.into_iter().find(|(_, doc)| filter.matches(doc))
        else {
            tx.rollback().await?;
            return Ok(0);
        };

        if !update.apply(&mut document)? {
            tx.rollback().await?;
            return Ok(0);
        }

        sqlx::query(
            r#"
            UPDATE documents
            SET body = $3, updated_at = NOW()
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Json(&document))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(1)
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;

        let candidates = Self::lock_candidates(&mut tx, collection, filter).await?;
        let Some((id, _)) = candidates.into_iter().find(|(_, doc)| filter.matches(doc)) else {
            tx.rollback().await?;
            return Ok(0);
        };

        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }
}
