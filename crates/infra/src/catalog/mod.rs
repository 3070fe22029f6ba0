//! Catalog service: cached product browsing and admin product creation.

pub mod cache;

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use atelier_core::{Document, DomainError, ProductId};
use atelier_products::{CatalogQuery, NewProduct, Page, Product};

use crate::store::{DocumentStore, DocumentStoreExt, StoreError, UnitOfWork};

pub use cache::CatalogCache;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("a product with sku {0} already exists")]
    DuplicateSku(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn DocumentStore>,
    cache: CatalogCache,
}

impl CatalogService {
    pub fn new(store: Arc<dyn DocumentStore>, cache: CatalogCache) -> Self {
        Self { store, cache }
    }

    pub fn cache(&self) -> &CatalogCache {
        &self.cache
    }

    /// Filtered, sorted page of products. Served from cache when possible.
    pub async fn list(&self, query: &CatalogQuery) -> Result<Arc<Page<Product>>, CatalogError> {
        if let Some(page) = self.cache.get(query).await {
            tracing::debug!("catalog cache hit");
            return Ok(page);
        }

        let generation = self.cache.generation();
        let products: Vec<Product> = self
            .store
            .load_all::<Product>()
            .await?
            .into_iter()
            .map(|v| v.document)
            .collect();
        let page = Arc::new(query.run(&products));
        if !self
            .cache
            .insert_if_current(query.clone(), page.clone(), generation)
            .await
        {
            tracing::debug!("catalog changed during listing; page not cached");
        }
        Ok(page)
    }

    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, CatalogError> {
        Ok(self
            .store
            .load::<Product>(&id.to_string())
            .await?
            .map(|v| v.document))
    }

    #[tracing::instrument(skip(self, input), fields(sku = %input.sku), err)]
    pub async fn create(&self, input: NewProduct) -> Result<Product, CatalogError> {
        let product = Product::create(ProductId::new(), input, Utc::now())?;

        let mut uow = UnitOfWork::new();
        uow.insert(&product)?;
        match self.store.commit(uow).await {
            Ok(()) => {}
            Err(StoreError::Duplicate(_)) => {
                return Err(CatalogError::DuplicateSku(product.sku().to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        self.cache.invalidate_all().await;
        tracing::info!(
            product_id = %product.id(),
            collection = Product::COLLECTION,
            "product created"
        );
        Ok(product)
    }
}
