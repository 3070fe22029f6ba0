use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;

use atelier_products::{CatalogQuery, Page, Product};

/// Bounded, TTL-evicting cache of catalog listing pages keyed by query.
///
/// Cheap to clone; clones share the same entries. Any committed product
/// mutation must call [`CatalogCache::invalidate_all`].
///
/// A page built from a read that overlapped an invalidation must not be
/// stored. Readers take a [`CatalogCache::generation`] before loading and
/// fill through [`CatalogCache::insert_if_current`].
#[derive(Clone)]
pub struct CatalogCache {
    inner: Cache<CatalogQuery, Arc<Page<Product>>>,
    generation: Arc<AtomicU64>,
}

impl CatalogCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();
        Self {
            inner,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub async fn get(&self, query: &CatalogQuery) -> Option<Arc<Page<Product>>> {
        self.inner.get(query).await
    }

    /// Bumped by every invalidation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Store `page` only if no invalidation happened since `generation` was read.
    ///
    /// Returns whether the page was kept.
    pub async fn insert_if_current(
        &self,
        query: CatalogQuery,
        page: Arc<Page<Product>>,
        generation: u64,
    ) -> bool {
        if self.generation() != generation {
            return false;
        }
        self.inner.insert(query.clone(), page).await;
        // An invalidation may have slipped in between the check and the insert.
        if self.generation() != generation {
            self.inner.invalidate(&query).await;
            return false;
        }
        true
    }

    pub async fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.invalidate_all();
        self.inner.run_pending_tasks().await;
        tracing::debug!("catalog cache invalidated");
    }
}
