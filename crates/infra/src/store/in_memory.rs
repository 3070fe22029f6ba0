use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use serde_json::Value as JsonValue;

use atelier_core::ExpectedVersion;

use super::r#trait::{DocumentStore, StoreError, StoredDocument, UnitOfWork, WriteOp};

#[derive(Debug, Clone)]
struct Entry {
    seq: u64,
    version: u64,
    unique_key: Option<String>,
    body: JsonValue,
}

#[derive(Debug, Default)]
struct State {
    docs: BTreeMap<(String, String), Entry>,
    next_seq: u64,
}

/// In-memory document store for tests/dev.
///
/// A commit takes the single write lock, validates every staged op against a
/// scratch overlay, and only then applies the overlay.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    inner: RwLock<State>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("in-memory store lock poisoned".to_string())
}

fn conflict(op: &WriteOp, actual: u64) -> StoreError {
    StoreError::Conflict(format!(
        "{}/{}: expected {:?}, found version {actual}",
        op.collection(),
        op.id(),
        op.expected()
    ))
}

#[async_trait::async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, StoreError> {
        let state = self.inner.read().map_err(|_| poisoned())?;
        Ok(state
            .docs
            .get(&(collection.to_string(), id.to_string()))
            .map(|e| StoredDocument {
                collection: collection.to_string(),
                id: id.to_string(),
                version: e.version,
                unique_key: e.unique_key.clone(),
                body: e.body.clone(),
            }))
    }

    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        let state = self.inner.read().map_err(|_| poisoned())?;
        let mut docs: Vec<(u64, StoredDocument)> = state
            .docs
            .iter()
            .filter(|((c, _), _)| c == collection)
            .map(|((c, id), e)| {
                (
                    e.seq,
                    StoredDocument {
                        collection: c.clone(),
                        id: id.clone(),
                        version: e.version,
                        unique_key: e.unique_key.clone(),
                        body: e.body.clone(),
                    },
                )
            })
            .collect();
        docs.sort_by_key(|(seq, _)| *seq);
        Ok(docs.into_iter().map(|(_, d)| d).collect())
    }

    async fn commit(&self, unit: UnitOfWork) -> Result<(), StoreError> {
        let mut state = self.inner.write().map_err(|_| poisoned())?;

        // None in the overlay marks a staged delete.
        let mut overlay: HashMap<(String, String), Option<Entry>> = HashMap::new();
        let mut next_seq = state.next_seq;

        for op in unit.ops() {
            let key = (op.collection().to_string(), op.id().to_string());
            let current = match overlay.get(&key) {
                Some(staged) => staged.clone(),
                None => state.docs.get(&key).cloned(),
            };
            let actual = current.as_ref().map_or(0, |e| e.version);
            if !op.expected().matches(actual) {
                return Err(conflict(op, actual));
            }

            match op {
                WriteOp::Put {
                    collection,
                    id,
                    unique_key,
                    body,
                    ..
                } => {
                    if let Some(uk) = unique_key {
                        let taken_in_overlay = overlay.iter().any(|((c, other), e)| {
                            c == collection
                                && other != id
                                && e.as_ref().is_some_and(|e| e.unique_key.as_ref() == Some(uk))
                        });
                        let taken_in_state = state.docs.iter().any(|((c, other), e)| {
                            c == collection
                                && other != id
                                && e.unique_key.as_ref() == Some(uk)
                                && !overlay.contains_key(&(c.clone(), other.clone()))
                        });
                        if taken_in_overlay || taken_in_state {
                            return Err(StoreError::Duplicate(format!(
                                "{collection}: unique key {uk} already exists"
                            )));
                        }
                    }
                    let seq = match &current {
                        Some(e) => e.seq,
                        None => {
                            next_seq += 1;
                            next_seq
                        }
                    };
                    overlay.insert(
                        key,
                        Some(Entry {
                            seq,
                            version: actual + 1,
                            unique_key: unique_key.clone(),
                            body: body.clone(),
                        }),
                    );
                }
                WriteOp::Delete { .. } => {
                    if current.is_none() && op.expected() != ExpectedVersion::Any {
                        return Err(conflict(op, 0));
                    }
                    overlay.insert(key, None);
                }
            }
        }

        for (key, entry) in overlay {
            match entry {
                Some(e) => {
                    state.docs.insert(key, e);
                }
                None => {
                    state.docs.remove(&key);
                }
            }
        }
        state.next_seq = next_seq;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DocumentStoreExt;
    use atelier_core::Document;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: String,
        slug: String,
        text: String,
    }

    impl Document for Note {
        const COLLECTION: &'static str = "notes";

        fn document_id(&self) -> String {
            self.id.clone()
        }

        fn unique_key(&self) -> Option<String> {
            Some(self.slug.clone())
        }
    }

    fn note(id: &str, slug: &str, text: &str) -> Note {
        Note {
            id: id.into(),
            slug: slug.into(),
            text: text.into(),
        }
    }

    async fn insert(store: &InMemoryDocumentStore, n: &Note) -> Result<(), StoreError> {
        let mut uow = UnitOfWork::new();
        uow.insert(n)?;
        store.commit(uow).await
    }

    #[tokio::test]
    async fn insert_assigns_version_one_and_lists_in_creation_order() {
        let store = InMemoryDocumentStore::new();
        insert(&store, &note("b", "b", "first")).await.unwrap();
        insert(&store, &note("a", "a", "second")).await.unwrap();

        let loaded = store.load::<Note>("b").await.unwrap().unwrap();
        assert_eq!(loaded.version, 1);
        let all: Vec<String> = store
            .load_all::<Note>()
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.document.text)
            .collect();
        assert_eq!(all, ["first", "second"]);
    }

    #[tokio::test]
    async fn stale_version_rejects_whole_unit() {
        let store = InMemoryDocumentStore::new();
        insert(&store, &note("a", "a", "v1")).await.unwrap();
        insert(&store, &note("b", "b", "v1")).await.unwrap();

        let mut uow = UnitOfWork::new();
        uow.put(&note("a", "a", "v2"), ExpectedVersion::Exact(1)).unwrap();
        uow.put(&note("b", "b", "v2"), ExpectedVersion::Exact(7)).unwrap();
        assert!(matches!(store.commit(uow).await, Err(StoreError::Conflict(_))));

        let a = store.load::<Note>("a").await.unwrap().unwrap();
        assert_eq!(a.document.text, "v1");
        assert_eq!(a.version, 1);
    }

    #[tokio::test]
    async fn double_insert_is_a_conflict() {
        let store = InMemoryDocumentStore::new();
        insert(&store, &note("a", "a", "v1")).await.unwrap();
        assert!(matches!(
            insert(&store, &note("a", "a", "v1")).await,
            Err(StoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn unique_keys_are_enforced_per_collection() {
        let store = InMemoryDocumentStore::new();
        insert(&store, &note("a", "same", "v1")).await.unwrap();
        assert!(matches!(
            insert(&store, &note("b", "same", "v1")).await,
            Err(StoreError::Duplicate(_))
        ));

        // Freed once the holder is deleted in the same unit.
        let mut uow = UnitOfWork::new();
        uow.delete::<Note>("a", ExpectedVersion::Exact(1));
        uow.insert(&note("b", "same", "v1")).unwrap();
        store.commit(uow).await.unwrap();
        assert!(store.load::<Note>("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn versioned_delete_and_sequential_ops_in_one_unit() {
        let store = InMemoryDocumentStore::new();
        insert(&store, &note("a", "a", "v1")).await.unwrap();

        let mut uow = UnitOfWork::new();
        uow.put(&note("a", "a", "v2"), ExpectedVersion::Exact(1)).unwrap();
        uow.put(&note("a", "a", "v3"), ExpectedVersion::Exact(2)).unwrap();
        store.commit(uow).await.unwrap();
        assert_eq!(store.load::<Note>("a").await.unwrap().unwrap().version, 3);

        let mut uow = UnitOfWork::new();
        uow.delete::<Note>("a", ExpectedVersion::Exact(2));
        assert!(matches!(store.commit(uow).await, Err(StoreError::Conflict(_))));

        let mut uow = UnitOfWork::new();
        uow.delete::<Note>("a", ExpectedVersion::Exact(3));
        store.commit(uow).await.unwrap();
        assert!(store.get("notes", "a").await.unwrap().is_none());
    }
}
