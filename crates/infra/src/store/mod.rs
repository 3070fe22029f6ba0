//! Versioned document store with multi-document units of work.
//!
//! Every persisted record (products, orders, accounts, ...) is a JSON document
//! addressed by `(collection, id)` and carrying a store-assigned version. Writes
//! are staged into a [`UnitOfWork`] and committed all-or-nothing; each staged
//! write carries an [`ExpectedVersion`](atelier_core::ExpectedVersion) that must
//! still hold at commit time.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryDocumentStore;
pub use postgres::PostgresDocumentStore;
pub use r#trait::{DocumentStore, DocumentStoreExt, StoreError, StoredDocument, UnitOfWork, WriteOp};
