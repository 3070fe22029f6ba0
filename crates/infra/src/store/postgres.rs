//! Postgres-backed document store.
//!
//! All documents live in one `documents` table keyed by `(collection, id)`.
//! A [`UnitOfWork`] runs inside a single transaction; version expectations are
//! enforced with compare-and-set statements (`UPDATE ... WHERE version = $n`),
//! so a concurrent writer that committed first makes the statement touch zero
//! rows and the whole transaction is rolled back.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Code | StoreError |
//! |------------|-----------------|------------|
//! | unique violation on `documents_pkey` | `23505` | `Conflict` |
//! | unique violation on `documents_unique_key` | `23505` | `Duplicate` |
//! | anything else | any | `Backend` |

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool, Postgres, Row, Transaction};
use tracing::instrument;

use atelier_core::ExpectedVersion;

use super::r#trait::{DocumentStore, StoreError, StoredDocument, UnitOfWork, WriteOp};

const SCHEMA: &str = include_str!("../../migrations/0001_documents.sql");
const UNIQUE_KEY_CONSTRAINT: &str = "documents_unique_key";

#[derive(Debug, Clone)]
pub struct PostgresDocumentStore {
    pool: Arc<PgPool>,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Apply the schema. Idempotent.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        tracing::info!("document schema applied");
        Ok(())
    }

    async fn apply(tx: &mut Transaction<'_, Postgres>, op: &WriteOp) -> Result<(), StoreError> {
        match op {
            WriteOp::Put {
                collection,
                id,
                unique_key,
                body,
                expected,
            } => match expected {
                ExpectedVersion::Exact(0) => {
                    sqlx::query(
                        r#"
                        INSERT INTO documents (collection, id, version, unique_key, body)
                        VALUES ($1, $2, 1, $3, $4)
                        "#,
                    )
                    .bind(collection)
                    .bind(id)
                    .bind(unique_key)
                    .bind(body)
                    .execute(&mut **tx)
                    .await
                    .map_err(|e| map_write_error(op, e))?;
                }
                ExpectedVersion::Exact(v) => {
                    let result = sqlx::query(
                        r#"
                        UPDATE documents
                        SET body = $4, unique_key = $5, version = version + 1, updated_at = now()
                        WHERE collection = $1 AND id = $2 AND version = $3
                        "#,
                    )
                    .bind(collection)
                    .bind(id)
                    .bind(*v as i64)
                    .bind(body)
                    .bind(unique_key)
                    .execute(&mut **tx)
                    .await
                    .map_err(|e| map_write_error(op, e))?;
                    if result.rows_affected() == 0 {
                        return Err(stale(op));
                    }
                }
                ExpectedVersion::Any => {
                    sqlx::query(
                        r#"
                        INSERT INTO documents (collection, id, version, unique_key, body)
                        VALUES ($1, $2, 1, $3, $4)
                        ON CONFLICT (collection, id) DO UPDATE
                        SET body = EXCLUDED.body,
                            unique_key = EXCLUDED.unique_key,
                            version = documents.version + 1,
                            updated_at = now()
                        "#,
                    )
                    .bind(collection)
                    .bind(id)
                    .bind(unique_key)
                    .bind(body)
                    .execute(&mut **tx)
                    .await
                    .map_err(|e| map_write_error(op, e))?;
                }
            },
            WriteOp::Delete {
                collection,
                id,
                expected,
            } => {
                let result = match expected {
                    ExpectedVersion::Exact(v) => {
                        sqlx::query(
                            "DELETE FROM documents WHERE collection = $1 AND id = $2 AND version = $3",
                        )
                        .bind(collection)
                        .bind(id)
                        .bind(*v as i64)
                        .execute(&mut **tx)
                        .await
                    }
                    ExpectedVersion::Any => {
                        sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
                            .bind(collection)
                            .bind(id)
                            .execute(&mut **tx)
                            .await
                    }
                }
                .map_err(|e| map_write_error(op, e))?;
                if matches!(expected, ExpectedVersion::Exact(_)) && result.rows_affected() == 0 {
                    return Err(stale(op));
                }
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl DocumentStore for PostgresDocumentStore {
    #[instrument(skip(self), err)]
    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT collection, id, version, unique_key, body
            FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get", e))?;

        row.map(|r| DocumentRow::from_row(&r).map(StoredDocument::from))
            .transpose()
            .map_err(|e| StoreError::Backend(format!("failed to read document row: {e}")))
    }

    #[instrument(skip(self), err)]
    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT collection, id, version, unique_key, body
            FROM documents
            WHERE collection = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(collection)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list", e))?;

        let mut docs = Vec::with_capacity(rows.len());
        for row in rows {
            let doc = DocumentRow::from_row(&row)
                .map_err(|e| StoreError::Backend(format!("failed to read document row: {e}")))?;
            docs.push(doc.into());
        }
        Ok(docs)
    }

    #[instrument(skip(self, unit), fields(ops = unit.len()), err)]
    async fn commit(&self, unit: UnitOfWork) -> Result<(), StoreError> {
        if unit.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        for op in unit.ops() {
            if let Err(err) = Self::apply(&mut tx, op).await {
                tx.rollback()
                    .await
                    .map_err(|e| map_sqlx_error("rollback", e))?;
                return Err(err);
            }
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(())
    }
}

fn stale(op: &WriteOp) -> StoreError {
    StoreError::Conflict(format!(
        "{}/{}: expected {:?} no longer holds",
        op.collection(),
        op.id(),
        op.expected()
    ))
}

fn map_write_error(op: &WriteOp, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            return if db_err.constraint() == Some(UNIQUE_KEY_CONSTRAINT) {
                StoreError::Duplicate(format!("{}: unique key already exists", op.collection()))
            } else {
                StoreError::Conflict(format!(
                    "{}/{}: concurrent insert detected",
                    op.collection(),
                    op.id()
                ))
            };
        }
    }
    map_sqlx_error("write", err)
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            StoreError::Backend(format!("database error in {operation}: {}", db_err.message()))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {operation}"))
        }
        other => StoreError::Backend(format!("{operation} failed: {other}")),
    }
}

// SQLx row types

#[derive(Debug)]
struct DocumentRow {
    collection: String,
    id: String,
    version: i64,
    unique_key: Option<String>,
    body: serde_json::Value,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for DocumentRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(DocumentRow {
            collection: row.try_get("collection")?,
            id: row.try_get("id")?,
            version: row.try_get("version")?,
            unique_key: row.try_get("unique_key")?,
            body: row.try_get("body")?,
        })
    }
}

impl From<DocumentRow> for StoredDocument {
    fn from(row: DocumentRow) -> Self {
        StoredDocument {
            collection: row.collection,
            id: row.id,
            version: row.version as u64,
            unique_key: row.unique_key,
            body: row.body,
        }
    }
}
