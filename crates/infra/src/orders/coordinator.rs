//! Order transaction coordinator.
//!
//! Owns the three state-changing order operations and the invariants that
//! span several documents:
//!
//! - **No oversell**: every product write is version-checked, so two
//!   overlapping reservations can never both commit against the same stock.
//! - **Atomic multi-document update**: product reservations and the new order
//!   (or restocks and the order deletion) commit in one [`UnitOfWork`].
//! - **Compensating restock**: rejecting a pending order releases every line
//!   back into its size bucket before the order is removed.
//!
//! ## Execution Flow (create)
//!
//! ```text
//! read products ─▶ reserve in memory ─▶ stage product puts + order insert ─▶ commit
//!        ▲                                                                    │
//!        └────────────── version conflict: re-run from a fresh read ◀─────────┘
//! ```
//!
//! All validation and inventory checks happen before anything is staged, so a
//! failed attempt leaves no observable effect. Conflicts are retried up to
//! `max_retries` times and then surface as [`OrderError::Internal`].
//!
//! Notifications are dispatched only after a successful commit and never
//! affect the outcome.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use atelier_auth::Principal;
use atelier_core::{OrderId, ProductId, Versioned};
use atelier_inventory::LedgerError;
use atelier_products::Product;
use atelier_sales::{Order, OrderLine, PurchaserSnapshot};

use crate::catalog::CatalogCache;
use crate::directory::ProfileLookup;
use crate::notify::{NotificationDispatcher, templates};
use crate::store::{DocumentStore, DocumentStoreExt, StoreError, UnitOfWork};

use super::error::OrderError;
use super::view::OrderView;

pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Outcome of one optimistic attempt.
enum Attempt<T> {
    Done(T),
    Conflict(String),
}

#[derive(Clone)]
pub struct OrderCoordinator {
    store: Arc<dyn DocumentStore>,
    profiles: Arc<dyn ProfileLookup>,
    notifications: NotificationDispatcher,
    catalog_cache: CatalogCache,
    max_retries: u32,
}

impl OrderCoordinator {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        profiles: Arc<dyn ProfileLookup>,
        notifications: NotificationDispatcher,
        catalog_cache: CatalogCache,
    ) -> Self {
        Self {
            store,
            profiles,
            notifications,
            catalog_cache,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Number of re-runs allowed after a version conflict.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Reserve stock for every cart line and record a pending order.
    #[instrument(skip(self, purchaser, cart), fields(uid = %purchaser.uid, lines = cart.len()), err)]
    pub async fn create(
        &self,
        purchaser: &Principal,
        cart: Vec<OrderLine>,
    ) -> Result<OrderView, OrderError> {
        if cart.is_empty() {
            return Err(OrderError::Validation(
                "order must contain at least one item".to_string(),
            ));
        }
        if cart.iter().any(|l| l.quantity == 0) {
            return Err(OrderError::Validation("quantity must be positive".to_string()));
        }

        let view = self
            .with_retries("create", || self.try_create(purchaser, &cart))
            .await?;

        self.catalog_cache.invalidate_all().await;
        tracing::info!(order_id = %view.order.id(), "order placed");
        Ok(view)
    }

    /// `pending -> confirmed`, then notify the purchaser.
    #[instrument(skip(self), fields(order_id = %order_id), err)]
    pub async fn approve(&self, order_id: OrderId) -> Result<OrderView, OrderError> {
        let order = self
            .with_retries("approve", || self.try_approve(order_id))
            .await?;

        // Already committed; a failed lookup only loses product detail.
        let view = match self.resolve(order.clone()).await {
            Ok(view) => view,
            Err(err) => {
                tracing::warn!(error = %err, "product lookup after approval failed");
                OrderView::resolve(order, &HashMap::new())
            }
        };
        self.notifications.dispatch(templates::order_confirmed(&view));
        tracing::info!("order approved");
        Ok(view)
    }

    /// Restock every line and delete the pending order, then notify the purchaser.
    #[instrument(skip(self), fields(order_id = %order_id), err)]
    pub async fn reject(&self, order_id: OrderId) -> Result<OrderView, OrderError> {
        let view = self
            .with_retries("reject", || self.try_reject(order_id))
            .await?;

        self.catalog_cache.invalidate_all().await;
        self.notifications.dispatch(templates::order_rejected(&view));
        tracing::info!("order rejected and stock restored");
        Ok(view)
    }

    pub async fn get(&self, order_id: OrderId) -> Result<OrderView, OrderError> {
        let order = self
            .store
            .load::<Order>(&order_id.to_string())
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;
        self.resolve(order.document).await
    }

    /// Every order, newest first.
    pub async fn list(&self) -> Result<Vec<OrderView>, OrderError> {
        let mut orders: Vec<Order> = self
            .store
            .load_all::<Order>()
            .await?
            .into_iter()
            .map(|v| v.document)
            .collect();
        orders.sort_by(|a, b| b.created_at().cmp(&a.created_at()));

        let products = self.product_index().await?;
        Ok(orders
            .into_iter()
            .map(|o| OrderView::resolve(o, &products))
            .collect())
    }

    async fn with_retries<T, F, Fut>(&self, op: &'static str, mut attempt: F) -> Result<T, OrderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Attempt<T>, OrderError>>,
    {
        let mut retries = 0;
        loop {
            match attempt().await? {
                Attempt::Done(value) => return Ok(value),
                Attempt::Conflict(reason) if retries < self.max_retries => {
                    retries += 1;
                    tracing::debug!(op, retries, %reason, "version conflict, retrying");
                }
                Attempt::Conflict(reason) => {
                    tracing::warn!(op, retries, %reason, "giving up after repeated conflicts");
                    return Err(OrderError::Internal(format!(
                        "{op} did not settle after {} attempts: {reason}",
                        retries + 1
                    )));
                }
            }
        }
    }

    async fn commit(&self, uow: UnitOfWork) -> Result<Option<String>, OrderError> {
        match self.store.commit(uow).await {
            Ok(()) => Ok(None),
            Err(StoreError::Conflict(reason)) => Ok(Some(reason)),
            Err(e) => Err(e.into()),
        }
    }

    async fn try_create(
        &self,
        purchaser: &Principal,
        cart: &[OrderLine],
    ) -> Result<Attempt<OrderView>, OrderError> {
        // Lines repeating a product act on the same in-memory document.
        let mut touched: Vec<Versioned<Product>> = Vec::new();
        let mut index: HashMap<ProductId, usize> = HashMap::new();

        for line in cart {
            let slot = match index.get(&line.product_id) {
                Some(&slot) => slot,
                None => {
                    let product = self
                        .store
                        .load::<Product>(&line.product_id.to_string())
                        .await?
                        .ok_or(OrderError::ProductNotFound(line.product_id))?;
                    touched.push(product);
                    index.insert(line.product_id, touched.len() - 1);
                    touched.len() - 1
                }
            };
            let product = &mut touched[slot].document;
            match product.reserve(&line.size, line.quantity) {
                Ok(()) => {}
                Err(LedgerError::SizeNotFound { .. } | LedgerError::InsufficientStock { .. }) => {
                    return Err(OrderError::InsufficientStock {
                        product_id: product.id(),
                        product_name: product.name().to_string(),
                        size: line.size.clone(),
                    });
                }
                Err(other) => return Err(OrderError::Internal(other.to_string())),
            }
        }

        let profile = match self.profiles.profile(&purchaser.uid).await {
            Ok(profile) => profile.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(uid = %purchaser.uid, error = %err, "profile lookup failed");
                Default::default()
            }
        };
        let snapshot = PurchaserSnapshot {
            uid: purchaser.uid.clone(),
            email: purchaser.email.clone(),
            display_name: purchaser.display_name.clone(),
            company_name: profile.company_name,
            mobile_number: profile.mobile_number,
        };
        let order = Order::place(OrderId::new(), snapshot, cart.to_vec(), Utc::now())?;

        let mut uow = UnitOfWork::new();
        for product in &touched {
            uow.put(&product.document, product.expected())?;
        }
        uow.insert(&order)?;
        if let Some(reason) = self.commit(uow).await? {
            return Ok(Attempt::Conflict(reason));
        }

        let products = touched
            .into_iter()
            .map(|v| (v.document.id(), v.document))
            .collect();
        Ok(Attempt::Done(OrderView::resolve(order, &products)))
    }

    async fn try_approve(&self, order_id: OrderId) -> Result<Attempt<Order>, OrderError> {
        let mut current = self
            .store
            .load::<Order>(&order_id.to_string())
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;
        current.document.approve()?;

        let mut uow = UnitOfWork::new();
        uow.put(&current.document, current.expected())?;
        Ok(match self.commit(uow).await? {
            Some(reason) => Attempt::Conflict(reason),
            None => Attempt::Done(current.document),
        })
    }

    async fn try_reject(&self, order_id: OrderId) -> Result<Attempt<OrderView>, OrderError> {
        let current = self
            .store
            .load::<Order>(&order_id.to_string())
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;
        current.document.ensure_rejectable()?;

        let mut touched: Vec<Versioned<Product>> = Vec::new();
        let mut index: HashMap<ProductId, usize> = HashMap::new();

        for line in current.document.items() {
            let slot = match index.get(&line.product_id) {
                Some(&slot) => slot,
                None => {
                    let product = self
                        .store
                        .load::<Product>(&line.product_id.to_string())
                        .await?
                        .ok_or(OrderError::DanglingProduct {
                            order_id,
                            product_id: line.product_id,
                        })?;
                    touched.push(product);
                    index.insert(line.product_id, touched.len() - 1);
                    touched.len() - 1
                }
            };
            let product = &mut touched[slot].document;
            match product.release(&line.size, line.quantity) {
                Ok(()) => {}
                Err(LedgerError::SizeNotFound { size }) => {
                    return Err(OrderError::SizeNotFound {
                        product_id: line.product_id,
                        size,
                    });
                }
                Err(other) => return Err(OrderError::Internal(other.to_string())),
            }
        }

        let mut uow = UnitOfWork::new();
        for product in &touched {
            uow.put(&product.document, product.expected())?;
        }
        uow.delete::<Order>(order_id.to_string(), current.expected());
        if let Some(reason) = self.commit(uow).await? {
            return Ok(Attempt::Conflict(reason));
        }

        let products = touched
            .into_iter()
            .map(|v| (v.document.id(), v.document))
            .collect();
        Ok(Attempt::Done(OrderView::resolve(current.document, &products)))
    }

    async fn resolve(&self, order: Order) -> Result<OrderView, OrderError> {
        let mut products = HashMap::new();
        for line in order.items() {
            if products.contains_key(&line.product_id) {
                continue;
            }
            if let Some(p) = self
                .store
                .load::<Product>(&line.product_id.to_string())
                .await?
            {
                products.insert(line.product_id, p.document);
            }
        }
        Ok(OrderView::resolve(order, &products))
    }

    async fn product_index(&self) -> Result<HashMap<ProductId, Product>, OrderError> {
        Ok(self
            .store
            .load_all::<Product>()
            .await?
            .into_iter()
            .map(|v| (v.document.id(), v.document))
            .collect())
    }
}
