//! Products domain module.
//!
//! Catalog documents (suits with per-size inventory) and the pure
//! filter/sort/paginate rules behind catalog browsing.

pub mod catalog;
pub mod product;

pub use catalog::{CatalogQuery, Page, SortOrder};
pub use product::{NewProduct, Product, Style};
