//! Catalog seeding from a JSON file.
//!
//! The file holds an array of products in the same shape the admin API accepts:
//!
//! ```json
//! [{ "sku": "TUX-01", "name": "Midnight Tuxedo", "fabric": "Wool", "style": "tuxedo",
//!    "price": 129900, "sizeInventory": [{ "size": "40R", "quantity": 3 }] }]
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use serde::Deserialize;

use atelier_core::Money;
use atelier_infra::store::PostgresDocumentStore;
use atelier_infra::{CatalogCache, CatalogError, CatalogService};
use atelier_inventory::SizeBucket;
use atelier_products::{NewProduct, Style};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedProduct {
    sku: String,
    name: String,
    fabric: String,
    style: String,
    #[serde(default)]
    fit: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    price: Option<u64>,
    #[serde(default)]
    size_inventory: Vec<SizeBucket>,
}

fn parse_seed(content: &str) -> anyhow::Result<Vec<NewProduct>> {
    let raw: Vec<SeedProduct> = serde_json::from_str(content).context("invalid seed file")?;
    raw.into_iter()
        .enumerate()
        .map(|(i, p)| {
            let style = p
                .style
                .parse::<Style>()
                .with_context(|| format!("product #{i} ({})", p.sku))?;
            Ok(NewProduct {
                sku: p.sku,
                name: p.name,
                fabric: p.fabric,
                style,
                fit: p.fit,
                description: p.description,
                image: p.image,
                images: p.images,
                price: p.price.map(Money::from_minor),
                sizes: p.size_inventory,
            })
        })
        .collect()
}

pub async fn run(store: PostgresDocumentStore, file_path: &str) -> anyhow::Result<()> {
    let path = Path::new(file_path);
    if !path.exists() {
        bail!("File not found: {file_path}");
    }

    tracing::info!(path = %file_path, "Loading products from file");
    let content = tokio::fs::read_to_string(path).await?;
    let products = parse_seed(&content)?;

    let catalog = CatalogService::new(
        Arc::new(store),
        CatalogCache::new(1, Duration::from_secs(1)),
    );

    let (mut inserted, mut skipped) = (0usize, 0usize);
    for product in products {
        let sku = product.sku.clone();
        match catalog.create(product).await {
            Ok(p) => {
                inserted += 1;
                tracing::info!(sku = %sku, id = %p.id(), "Inserted product");
            }
            Err(CatalogError::DuplicateSku(_)) => {
                skipped += 1;
                tracing::warn!(sku = %sku, "SKU already present; skipping");
            }
            Err(e) => return Err(e).with_context(|| format!("failed to insert {sku}")),
        }
    }

    tracing::info!(inserted, skipped, "Seeding complete");
    Ok(())
}
