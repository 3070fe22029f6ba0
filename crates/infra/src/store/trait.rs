use std::sync::Arc;

use serde_json::Value as JsonValue;
use thiserror::Error;

use atelier_core::{Document, ExpectedVersion, Versioned};

/// A persisted document as seen by the store (untyped).
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub collection: String,
    pub id: String,
    /// Starts at 1 on insert, +1 per write.
    pub version: u64,
    pub unique_key: Option<String>,
    pub body: JsonValue,
}

impl StoredDocument {
    pub fn decode<T: Document>(&self) -> Result<Versioned<T>, StoreError> {
        let document = serde_json::from_value(self.body.clone()).map_err(|e| {
            StoreError::Serialization(format!(
                "failed to decode {}/{}: {e}",
                self.collection, self.id
            ))
        })?;
        Ok(Versioned::new(document, self.version))
    }
}

/// A single staged write.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Insert or replace a document body.
    ///
    /// `ExpectedVersion::ABSENT` means insert-only; `Exact(n)` means the
    /// document must currently be at version `n`; `Any` upserts.
    Put {
        collection: &'static str,
        id: String,
        unique_key: Option<String>,
        body: JsonValue,
        expected: ExpectedVersion,
    },
    /// Remove a document.
    Delete {
        collection: &'static str,
        id: String,
        expected: ExpectedVersion,
    },
}

impl WriteOp {
    pub fn collection(&self) -> &'static str {
        match self {
            WriteOp::Put { collection, .. } | WriteOp::Delete { collection, .. } => collection,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            WriteOp::Put { id, .. } | WriteOp::Delete { id, .. } => id,
        }
    }

    pub fn expected(&self) -> ExpectedVersion {
        match self {
            WriteOp::Put { expected, .. } | WriteOp::Delete { expected, .. } => *expected,
        }
    }
}

/// Writes staged for one atomic commit. Ops apply in staging order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitOfWork {
    ops: Vec<WriteOp>,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put<T: Document>(&mut self, doc: &T, expected: ExpectedVersion) -> Result<(), StoreError> {
        let body = serde_json::to_value(doc).map_err(|e| {
            StoreError::Serialization(format!("failed to encode {}: {e}", T::COLLECTION))
        })?;
        self.ops.push(WriteOp::Put {
            collection: T::COLLECTION,
            id: doc.document_id(),
            unique_key: doc.unique_key(),
            body,
            expected,
        });
        Ok(())
    }

    /// Stage a new document; commit fails with a conflict if it already exists.
    pub fn insert<T: Document>(&mut self, doc: &T) -> Result<(), StoreError> {
        self.put(doc, ExpectedVersion::ABSENT)
    }

    pub fn delete<T: Document>(&mut self, id: impl Into<String>, expected: ExpectedVersion) {
        self.ops.push(WriteOp::Delete {
            collection: T::COLLECTION,
            id: id.into(),
            expected,
        });
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }
}

/// Document store operation error.
///
/// These are **infrastructure errors**; domain failures never reach the store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A version expectation did not hold; nothing was written. Safe to retry
    /// from a fresh read.
    #[error("optimistic concurrency check failed: {0}")]
    Conflict(String),

    /// A unique key is already taken by another document in the collection.
    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Backend unavailable or returned an unexpected error.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Versioned document storage.
///
/// Implementations must:
/// - apply a [`UnitOfWork`] atomically (every op or none)
/// - check every op's expected version against the state at commit time
/// - enforce `unique_key` uniqueness per collection
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, StoreError>;

    /// All documents of a collection, in creation order.
    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError>;

    async fn commit(&self, unit: UnitOfWork) -> Result<(), StoreError>;
}

#[async_trait::async_trait]
impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, StoreError> {
        (**self).get(collection, id).await
    }

    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        (**self).list(collection).await
    }

    async fn commit(&self, unit: UnitOfWork) -> Result<(), StoreError> {
        (**self).commit(unit).await
    }
}

/// Typed access on top of [`DocumentStore`].
#[async_trait::async_trait]
pub trait DocumentStoreExt: DocumentStore {
    async fn load<T: Document>(&self, id: &str) -> Result<Option<Versioned<T>>, StoreError> {
        match self.get(T::COLLECTION, id).await? {
            Some(doc) => doc.decode().map(Some),
            None => Ok(None),
        }
    }

    async fn load_all<T: Document>(&self) -> Result<Vec<Versioned<T>>, StoreError> {
        self.list(T::COLLECTION)
            .await?
            .iter()
            .map(StoredDocument::decode)
            .collect()
    }
}

impl<S: DocumentStore + ?Sized> DocumentStoreExt for S {}
