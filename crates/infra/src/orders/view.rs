use std::collections::HashMap;

use atelier_core::{Money, ProductId};
use atelier_products::Product;
use atelier_sales::{Order, OrderLine};

/// An order line with its product resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLine {
    pub line: OrderLine,
    /// `None` when the product has since been deleted.
    pub product: Option<Product>,
}

impl ResolvedLine {
    /// Unit price times quantity; unpriced or missing products count as zero.
    pub fn subtotal(&self) -> Money {
        self.product
            .as_ref()
            .and_then(Product::price)
            .and_then(|p| p.checked_mul(self.line.quantity))
            .unwrap_or(Money::ZERO)
    }
}

/// An order with line items resolved to product detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderView {
    pub order: Order,
    pub lines: Vec<ResolvedLine>,
}

impl OrderView {
    pub fn resolve(order: Order, products: &HashMap<ProductId, Product>) -> Self {
        let lines = order
            .items()
            .iter()
            .map(|line| ResolvedLine {
                line: line.clone(),
                product: products.get(&line.product_id).cloned(),
            })
            .collect();
        Self { order, lines }
    }

    pub fn total(&self) -> Money {
        self.lines
            .iter()
            .map(ResolvedLine::subtotal)
            .fold(Money::ZERO, |acc, m| acc.checked_add(m).unwrap_or(acc))
    }
}
