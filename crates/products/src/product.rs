use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use atelier_core::error::require_non_empty;
use atelier_core::{Document, DomainError, DomainResult, Money, ProductId};
use atelier_inventory::{LedgerError, SizeBucket, SizeInventory};

/// Garment style. Closed set; unknown styles are rejected on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Tuxedo,
    Overcoat,
    Business,
    Casual,
    Blazer,
    Trenchcoat,
}

impl Style {
    pub fn as_str(self) -> &'static str {
        match self {
            Style::Tuxedo => "tuxedo",
            Style::Overcoat => "overcoat",
            Style::Business => "business",
            Style::Casual => "casual",
            Style::Blazer => "blazer",
            Style::Trenchcoat => "trenchcoat",
        }
    }
}

impl FromStr for Style {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tuxedo" => Ok(Style::Tuxedo),
            "overcoat" => Ok(Style::Overcoat),
            "business" => Ok(Style::Business),
            "casual" => Ok(Style::Casual),
            "blazer" => Ok(Style::Blazer),
            "trenchcoat" => Ok(Style::Trenchcoat),
            other => Err(DomainError::validation(format!("unknown style: {other}"))),
        }
    }
}

/// Input for creating a catalog product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub fabric: String,
    pub style: Style,
    pub fit: Option<String>,
    pub description: String,
    pub image: String,
    pub images: Vec<String>,
    /// `None` marks the product as "coming soon".
    pub price: Option<Money>,
    pub sizes: Vec<SizeBucket>,
}

/// A catalog product with its embedded size inventory.
///
/// Persisted as a flat JSON document carrying both the buckets and the cached
/// `stock` total; loading a document whose total disagrees with its buckets fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProductRecord", into = "ProductRecord")]
pub struct Product {
    id: ProductId,
    sku: String,
    name: String,
    fabric: String,
    style: Style,
    fit: Option<String>,
    description: String,
    image: String,
    images: Vec<String>,
    price: Option<Money>,
    inventory: SizeInventory,
    created_at: DateTime<Utc>,
}

impl Product {
    pub fn create(
        id: ProductId,
        input: NewProduct,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        require_non_empty("sku", &input.sku)?;
        require_non_empty("name", &input.name)?;
        require_non_empty("fabric", &input.fabric)?;
        let inventory = SizeInventory::new(input.sizes)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        Ok(Self {
            id,
            sku: input.sku.trim().to_string(),
            name: input.name.trim().to_string(),
            fabric: input.fabric,
            style: input.style,
            fit: input.fit,
            description: input.description,
            image: input.image,
            images: input.images,
            price: input.price,
            inventory,
            created_at,
        })
    }

    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fabric(&self) -> &str {
        &self.fabric
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn fit(&self) -> Option<&str> {
        self.fit.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn price(&self) -> Option<Money> {
        self.price
    }

    pub fn inventory(&self) -> &SizeInventory {
        &self.inventory
    }

    pub fn stock(&self) -> u64 {
        self.inventory.stock()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_coming_soon(&self) -> bool {
        self.price.is_none()
    }

    pub fn reserve(&mut self, size: &str, quantity: u32) -> Result<(), LedgerError> {
        self.inventory.reserve(size, quantity)
    }

    pub fn release(&mut self, size: &str, quantity: u32) -> Result<(), LedgerError> {
        self.inventory.release(size, quantity)
    }
}

impl Document for Product {
    const COLLECTION: &'static str = "products";

    fn document_id(&self) -> String {
        self.id.to_string()
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.sku.to_ascii_uppercase())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductRecord {
    id: ProductId,
    sku: String,
    name: String,
    fabric: String,
    style: Style,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fit: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    images: Vec<String>,
    price: Option<Money>,
    size_inventory: Vec<SizeBucket>,
    stock: u64,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRecord> for Product {
    type Error = LedgerError;

    fn try_from(r: ProductRecord) -> Result<Self, Self::Error> {
        let inventory = SizeInventory::restore(r.size_inventory, r.stock)?;
        Ok(Self {
            id: r.id,
            sku: r.sku,
            name: r.name,
            fabric: r.fabric,
            style: r.style,
            fit: r.fit,
            description: r.description,
            image: r.image,
            images: r.images,
            price: r.price,
            inventory,
            created_at: r.created_at,
        })
    }
}

impl From<Product> for ProductRecord {
    fn from(p: Product) -> Self {
        let stock = p.inventory.stock();
        Self {
            id: p.id,
            sku: p.sku,
            name: p.name,
            fabric: p.fabric,
            style: p.style,
            fit: p.fit,
            description: p.description,
            image: p.image,
            images: p.images,
            price: p.price,
            size_inventory: p.inventory.buckets().to_vec(),
            stock,
            created_at: p.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn navy_suit() -> NewProduct {
        NewProduct {
            sku: "SUIT-NAVY-01".into(),
            name: "Navy Two-Piece".into(),
            fabric: "Wool".into(),
            style: Style::Business,
            fit: Some("slim".into()),
            description: "Half-canvas navy suit".into(),
            image: "navy.jpg".into(),
            images: vec![],
            price: Some(Money::from_minor(89_900)),
            sizes: vec![SizeBucket::new("M", 2), SizeBucket::new("L", 1)],
        }
    }

    #[test]
    fn create_derives_stock_from_sizes() {
        let p = Product::create(ProductId::new(), navy_suit(), Utc::now()).unwrap();
        assert_eq!(p.stock(), 3);
        assert!(!p.is_coming_soon());
        assert_eq!(p.unique_key().as_deref(), Some("SUIT-NAVY-01"));
    }

    #[test]
    fn create_rejects_blank_name_and_duplicate_sizes() {
        let mut input = navy_suit();
        input.name = " ".into();
        assert!(matches!(
            Product::create(ProductId::new(), input, Utc::now()),
            Err(DomainError::Validation(_))
        ));

        let mut input = navy_suit();
        input.sizes = vec![SizeBucket::new("M", 1), SizeBucket::new("M", 1)];
        assert!(matches!(
            Product::create(ProductId::new(), input, Utc::now()),
            Err(DomainError::Validation(msg)) if msg.contains("duplicate size")
        ));
    }

    #[test]
    fn persisted_form_carries_buckets_and_stock() {
        let mut p = Product::create(ProductId::new(), navy_suit(), Utc::now()).unwrap();
        p.reserve("M", 1).unwrap();
        let value = serde_json::to_value(&p).unwrap();
        assert_eq!(value["stock"], json!(2));
        assert_eq!(value["sizeInventory"][0], json!({"size": "M", "quantity": 1}));
        assert_eq!(value["style"], json!("business"));

        let back: Product = serde_json::from_value(value).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn loading_inconsistent_stock_fails() {
        let p = Product::create(ProductId::new(), navy_suit(), Utc::now()).unwrap();
        let mut value = serde_json::to_value(&p).unwrap();
        value["stock"] = json!(99);
        let err = serde_json::from_value::<Product>(value).unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn style_parses_known_values_only() {
        assert_eq!("tuxedo".parse::<Style>().unwrap(), Style::Tuxedo);
        assert!("kilt".parse::<Style>().is_err());
    }
}
