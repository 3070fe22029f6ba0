use thiserror::Error;

use atelier_core::{DomainError, OrderId, ProductId};
use atelier_sales::OrderStateError;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("Suit {0} not found")]
    ProductNotFound(ProductId),

    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    /// The size is missing or holds fewer units than requested.
    #[error("Insufficient stock for {product_name} size {size}")]
    InsufficientStock {
        product_id: ProductId,
        product_name: String,
        size: String,
    },

    /// Rejection found a line whose product has since been deleted.
    #[error("order {order_id} references missing product {product_id}")]
    DanglingProduct {
        order_id: OrderId,
        product_id: ProductId,
    },

    /// Rejection found a line whose size bucket has since been removed.
    #[error("product {product_id} no longer stocks size {size}")]
    SizeNotFound { product_id: ProductId, size: String },

    #[error(transparent)]
    InvalidState(#[from] OrderStateError),

    #[error("conflicting concurrent update: {0}")]
    ConflictRetryable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for OrderError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict(msg) => OrderError::ConflictRetryable(msg),
            other => OrderError::Internal(other.to_string()),
        }
    }
}

impl From<DomainError> for OrderError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => {
                OrderError::Validation(msg)
            }
            other => OrderError::Internal(other.to_string()),
        }
    }
}
