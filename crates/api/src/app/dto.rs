use core::str::FromStr;

use axum::Json;
use axum::extract::Query;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::response::Response;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use atelier_core::{DomainError, Money, OrderId, ProductId};
use atelier_infra::OrderView;
use atelier_inventory::SizeBucket;
use atelier_parties::NewEnquiry;
use atelier_products::{CatalogQuery, NewProduct, Page, Product, SortOrder, Style};
use atelier_sales::{OrderLine, OrderStatus, PurchaserSnapshot};

use crate::app::errors;

// -------------------------
// Extraction helpers
// -------------------------

/// Unwrap a JSON body, turning serde failures into the standard 400 body.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| errors::bad_request(rejection.body_text()))
}

pub fn query_params<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, Response> {
    params
        .map(|Query(p)| p)
        .map_err(|rejection| errors::bad_request(rejection.body_text()))
}

pub fn parse_id<T>(raw: &str) -> Result<T, Response>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse().map_err(|e: DomainError| errors::bad_request(e.to_string()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogParams {
    pub fabric: Option<String>,
    pub style: Option<String>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl CatalogParams {
    pub fn into_query(self) -> Result<CatalogQuery, DomainError> {
        let mut query = CatalogQuery::default().paginate(self.page, self.limit);
        query.fabric = non_blank(self.fabric);
        query.style = non_blank(self.style)
            .map(|s| s.parse::<Style>())
            .transpose()?;
        query.sort = non_blank(self.sort)
            .map(|s| s.parse::<SortOrder>())
            .transpose()?;
        query.min_price = self.min_price.map(Money::from_minor);
        query.max_price = self.max_price.map(Money::from_minor);
        Ok(query)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub sku: String,
    pub name: String,
    pub fabric: String,
    pub style: String,
    #[serde(default)]
    pub fit: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub images: Vec<String>,
    /// Minor currency units; omit for "coming soon".
    #[serde(default)]
    pub price: Option<u64>,
    #[serde(default)]
    pub size_inventory: Vec<SizeBucket>,
}

impl CreateProductRequest {
    pub fn into_new_product(self) -> Result<NewProduct, DomainError> {
        Ok(NewProduct {
            sku: self.sku,
            name: self.name,
            fabric: self.fabric,
            style: self.style.parse()?,
            fit: non_blank(self.fit),
            description: self.description,
            image: self.image,
            images: self.images,
            price: self.price.map(Money::from_minor),
            sizes: self.size_inventory,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub suit_id: String,
    pub size: String,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
}

impl CreateOrderRequest {
    pub fn into_lines(self) -> Result<Vec<OrderLine>, DomainError> {
        self.items
            .into_iter()
            .map(|item| OrderLine::new(item.suit_id.parse()?, item.size, item.quantity))
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAccountRequest {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub mobile_number: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnquiryRequest {
    #[serde(default)]
    pub suit_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl EnquiryRequest {
    pub fn into_new_enquiry(self) -> Result<NewEnquiry, DomainError> {
        if self.suit_id.trim().is_empty() {
            return Err(DomainError::validation("suitId is required"));
        }
        Ok(NewEnquiry {
            product_id: self.suit_id.trim().parse()?,
            name: self.name,
            email: self.email,
            phone: non_blank(self.phone),
            message: self.message,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCampaignRequest {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub content: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPageResponse {
    pub suits: Vec<Product>,
    pub total: usize,
    pub total_pages: u32,
    pub current_page: u32,
}

impl From<&Page<Product>> for CatalogPageResponse {
    fn from(page: &Page<Product>) -> Self {
        Self {
            suits: page.items.clone(),
            total: page.total,
            total_pages: page.total_pages,
            current_page: page.current_page,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub suit_id: ProductId,
    /// Full product detail; `null` once the product has been deleted.
    pub suit: Option<Product>,
    pub size: String,
    pub quantity: u32,
    pub subtotal: Money,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: OrderId,
    pub user: PurchaserSnapshot,
    pub items: Vec<OrderItemResponse>,
    pub status: OrderStatus,
    pub total: Money,
    pub created_at: DateTime<Utc>,
}

impl From<OrderView> for OrderResponse {
    fn from(view: OrderView) -> Self {
        let total = view.total();
        let items = view
            .lines
            .into_iter()
            .map(|l| {
                let subtotal = l.subtotal();
                OrderItemResponse {
                    suit_id: l.line.product_id,
                    suit: l.product,
                    size: l.line.size,
                    quantity: l.line.quantity,
                    subtotal,
                }
            })
            .collect();
        let order = view.order;
        Self {
            id: order.id(),
            user: order.purchaser().clone(),
            items,
            status: order.status(),
            total,
            created_at: order.created_at(),
        }
    }
}
