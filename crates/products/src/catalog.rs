//! Catalog browsing: filter, sort and paginate over products.

use core::cmp::Ordering;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use atelier_core::{DomainError, Money};

use crate::product::{Product, Style};

pub const DEFAULT_PAGE_SIZE: u32 = 9;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOrder {
    #[serde(rename = "price-asc")]
    PriceAsc,
    #[serde(rename = "price-desc")]
    PriceDesc,
    #[serde(rename = "name-asc")]
    NameAsc,
}

impl FromStr for SortOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price-asc" => Ok(SortOrder::PriceAsc),
            "price-desc" => Ok(SortOrder::PriceDesc),
            "name-asc" => Ok(SortOrder::NameAsc),
            other => Err(DomainError::validation(format!("unknown sort: {other}"))),
        }
    }
}

/// Normalised catalog query. Doubles as the catalog cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatalogQuery {
    /// Case-insensitive substring match on fabric.
    pub fabric: Option<String>,
    pub style: Option<Style>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    pub sort: Option<SortOrder>,
    page: u32,
    limit: u32,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            fabric: None,
            style: None,
            min_price: None,
            max_price: None,
            sort: None,
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub total_pages: u32,
    pub current_page: u32,
}

impl CatalogQuery {
    /// Set pagination; page is 1-based and clamped to at least 1, limit to 1..=100.
    pub fn paginate(mut self, page: Option<u32>, limit: Option<u32>) -> Self {
        self.page = page.unwrap_or(1).max(1);
        self.limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn matches(&self, product: &Product) -> bool {
        if let Some(fabric) = &self.fabric {
            if !product
                .fabric()
                .to_lowercase()
                .contains(&fabric.to_lowercase())
            {
                return false;
            }
        }
        if let Some(style) = self.style {
            if product.style() != style {
                return false;
            }
        }
        if self.min_price.is_some() || self.max_price.is_some() {
            // Coming-soon products have no price to compare.
            let Some(price) = product.price() else {
                return false;
            };
            if self.min_price.is_some_and(|min| price < min) {
                return false;
            }
            if self.max_price.is_some_and(|max| price > max) {
                return false;
            }
        }
        true
    }

    /// Run the query over a full product listing.
    pub fn run(&self, products: &[Product]) -> Page<Product> {
        let mut hits: Vec<&Product> = products.iter().filter(|p| self.matches(p)).collect();
        hits.sort_by(|a, b| self.compare(a, b));

        let total = hits.len();
        let limit = self.limit as usize;
        let total_pages = total.div_ceil(limit) as u32;
        let offset = (self.page as usize - 1).saturating_mul(limit);

        Page {
            items: hits.into_iter().skip(offset).take(limit).cloned().collect(),
            total,
            total_pages,
            current_page: self.page,
        }
    }

    fn compare(&self, a: &Product, b: &Product) -> Ordering {
        let creation = || {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(&b.id()))
        };
        match self.sort {
            None => creation(),
            Some(SortOrder::NameAsc) => a.name().cmp(b.name()).then_with(creation),
            Some(SortOrder::PriceAsc) => {
                cmp_price(a.price(), b.price(), false).then_with(creation)
            }
            Some(SortOrder::PriceDesc) => {
                cmp_price(a.price(), b.price(), true).then_with(creation)
            }
        }
    }
}

// Unpriced products sort last in both directions.
fn cmp_price(a: Option<Money>, b: Option<Money>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) if descending => y.cmp(&x),
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::NewProduct;
    use atelier_core::ProductId;
    use atelier_inventory::SizeBucket;
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;

    fn product(n: i64, name: &str, fabric: &str, style: Style, price: Option<u64>) -> Product {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(n);
        Product::create(
            ProductId::new(),
            NewProduct {
                sku: format!("SKU-{n}"),
                name: name.into(),
                fabric: fabric.into(),
                style,
                fit: None,
                description: String::new(),
                image: String::new(),
                images: vec![],
                price: price.map(Money::from_minor),
                sizes: vec![SizeBucket::new("M", 1)],
            },
            created,
        )
        .unwrap()
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(0, "Charcoal Tux", "Wool", Style::Tuxedo, Some(120_000)),
            product(1, "Linen Casual", "Linen", Style::Casual, Some(45_000)),
            product(2, "Camel Overcoat", "Cashmere wool", Style::Overcoat, None),
            product(3, "Blue Blazer", "wool blend", Style::Blazer, Some(60_000)),
        ]
    }

    fn names(page: &Page<Product>) -> Vec<&str> {
        page.items.iter().map(|p| p.name()).collect()
    }

    #[test]
    fn default_query_lists_in_creation_order() {
        let page = CatalogQuery::default().run(&catalog());
        assert_eq!(
            names(&page),
            ["Charcoal Tux", "Linen Casual", "Camel Overcoat", "Blue Blazer"]
        );
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.current_page, 1);
    }

    #[test]
    fn fabric_filter_is_case_insensitive_substring() {
        let q = CatalogQuery {
            fabric: Some("WOOL".into()),
            ..Default::default()
        };
        assert_eq!(
            names(&q.run(&catalog())),
            ["Charcoal Tux", "Camel Overcoat", "Blue Blazer"]
        );
    }

    #[test]
    fn price_bounds_are_inclusive_and_skip_coming_soon() {
        let q = CatalogQuery {
            min_price: Some(Money::from_minor(45_000)),
            max_price: Some(Money::from_minor(60_000)),
            ..Default::default()
        };
        assert_eq!(names(&q.run(&catalog())), ["Linen Casual", "Blue Blazer"]);
    }

    #[test]
    fn price_desc_puts_unpriced_last() {
        let q = CatalogQuery {
            sort: Some(SortOrder::PriceDesc),
            ..Default::default()
        };
        assert_eq!(
            names(&q.run(&catalog())),
            ["Charcoal Tux", "Blue Blazer", "Linen Casual", "Camel Overcoat"]
        );
    }

    #[test]
    fn style_and_name_sort() {
        let q = CatalogQuery {
            style: Some(Style::Blazer),
            ..Default::default()
        };
        assert_eq!(names(&q.run(&catalog())), ["Blue Blazer"]);

        let q = CatalogQuery {
            sort: Some(SortOrder::NameAsc),
            ..Default::default()
        };
        assert_eq!(names(&q.run(&catalog()))[0], "Blue Blazer");
    }

    #[test]
    fn pagination_clamps_inputs() {
        let q = CatalogQuery::default().paginate(Some(0), Some(1_000));
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), MAX_PAGE_SIZE);

        let page = CatalogQuery::default()
            .paginate(Some(2), Some(3))
            .run(&catalog());
        assert_eq!(names(&page), ["Blue Blazer"]);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.total, 4);
    }

    #[test]
    fn sort_names_parse() {
        assert_eq!("price-asc".parse::<SortOrder>().unwrap(), SortOrder::PriceAsc);
        assert!("newest".parse::<SortOrder>().is_err());
    }

    proptest! {
        /// Property: concatenating every page yields each hit exactly once.
        #[test]
        fn pages_partition_results(count in 0usize..30, limit in 1u32..12) {
            let products: Vec<Product> = (0..count)
                .map(|i| product(i as i64, &format!("Suit {i}"), "Wool", Style::Business, Some(1000)))
                .collect();
            let first = CatalogQuery::default().paginate(Some(1), Some(limit)).run(&products);
            let mut seen = Vec::new();
            for page in 1..=first.total_pages.max(1) {
                let p = CatalogQuery::default().paginate(Some(page), Some(limit)).run(&products);
                seen.extend(p.items.into_iter().map(|p| p.id()));
            }
            prop_assert_eq!(seen.len(), count);
            prop_assert_eq!(first.total_pages as usize, count.div_ceil(limit as usize));
        }
    }
}
