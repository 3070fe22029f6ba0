use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use atelier_core::error::require_non_empty;
use atelier_core::{Document, DomainError, DomainResult, OrderId, ProductId, UserId};

/// Order status lifecycle.
///
/// Only `Pending -> Confirmed` is reachable today; `Shipped` and `Cancelled`
/// are accepted on load for fulfilment tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order line: product reference, size label and quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub size: String,
    pub quantity: u32,
}

impl OrderLine {
    pub fn new(product_id: ProductId, size: impl Into<String>, quantity: u32) -> DomainResult<Self> {
        let size = size.into();
        require_non_empty("size", &size)?;
        if quantity == 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        Ok(Self {
            product_id,
            size,
            quantity,
        })
    }
}

/// Purchaser details copied onto the order at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaserSnapshot {
    pub uid: UserId,
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub mobile_number: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderStateError {
    #[error("cannot {action} order {order_id}: status is {status}")]
    InvalidState {
        order_id: OrderId,
        status: OrderStatus,
        action: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    id: OrderId,
    #[serde(rename = "user")]
    purchaser: PurchaserSnapshot,
    items: Vec<OrderLine>,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

impl Order {
    /// Create a new pending order. Stock must already be reserved by the caller.
    pub fn place(
        id: OrderId,
        purchaser: PurchaserSnapshot,
        items: Vec<OrderLine>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if items.is_empty() {
            return Err(DomainError::validation("order must contain at least one item"));
        }
        if items.iter().any(|l| l.quantity == 0) {
            return Err(DomainError::validation("quantity must be positive"));
        }
        Ok(Self {
            id,
            purchaser,
            items,
            status: OrderStatus::Pending,
            created_at,
        })
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn purchaser(&self) -> &PurchaserSnapshot {
        &self.purchaser
    }

    pub fn items(&self) -> &[OrderLine] {
        &self.items
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn total_units(&self) -> u64 {
        self.items.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Transition `Pending -> Confirmed`.
    pub fn approve(&mut self) -> Result<(), OrderStateError> {
        self.ensure_pending("approve")?;
        self.status = OrderStatus::Confirmed;
        Ok(())
    }

    /// Rejection deletes the order; only pending orders qualify.
    pub fn ensure_rejectable(&self) -> Result<(), OrderStateError> {
        self.ensure_pending("reject")
    }

    fn ensure_pending(&self, action: &'static str) -> Result<(), OrderStateError> {
        if self.status != OrderStatus::Pending {
            return Err(OrderStateError::InvalidState {
                order_id: self.id,
                status: self.status,
                action,
            });
        }
        Ok(())
    }
}

impl Document for Order {
    const COLLECTION: &'static str = "orders";

    fn document_id(&self) -> String {
        self.id.to_string()
    }
}
