//! Persisted document contract and optimistic concurrency primitives.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A record stored as one JSON document in a named collection.
///
/// Every document carries a store-assigned version that starts at 1 on insert
/// and increments on every write. Version `0` denotes "no such document".
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection (table partition) the document lives in.
    const COLLECTION: &'static str;

    /// Stable key of the document within its collection.
    fn document_id(&self) -> String;

    /// Optional secondary key that must be unique within the collection.
    fn unique_key(&self) -> Option<String> {
        None
    }
}

/// Optimistic concurrency expectation for a document write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Skip version checking (seeding, idempotent upserts).
    Any,
    /// Require the document to be at an exact version.
    Exact(u64),
}

impl ExpectedVersion {
    /// The document must not exist yet.
    pub const ABSENT: ExpectedVersion = ExpectedVersion::Exact(0);

    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }
}

/// A document together with the version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub document: T,
    pub version: u64,
}

impl<T> Versioned<T> {
    pub fn new(document: T, version: u64) -> Self {
        Self { document, version }
    }

    /// Expectation to use when writing this document back.
    pub fn expected(&self) -> ExpectedVersion {
        ExpectedVersion::Exact(self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_version_must_match() {
        assert!(ExpectedVersion::Exact(3).matches(3));
        assert!(!ExpectedVersion::Exact(3).matches(4));
        assert!(ExpectedVersion::Any.matches(42));
        assert!(ExpectedVersion::ABSENT.matches(0));
        assert!(!ExpectedVersion::ABSENT.matches(1));
    }

    #[test]
    fn versioned_write_back_expects_read_version() {
        let v = Versioned::new("doc", 7);
        assert_eq!(v.expected(), ExpectedVersion::Exact(7));
    }
}
