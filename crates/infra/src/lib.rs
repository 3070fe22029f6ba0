//! Infrastructure layer: document storage, the order coordinator, catalog
//! caching, the account directory and outbound notifications.

pub mod catalog;
pub mod directory;
pub mod enquiries;
pub mod export;
pub mod newsletter;
pub mod notify;
pub mod orders;
pub mod store;


pub use catalog::{CatalogCache, CatalogError, CatalogService};
pub use directory::{AccessPolicy, DirectoryError, ProfileFields, ProfileLookup, UserDirectory};
pub use enquiries::EnquiryService;
pub use newsletter::{NewsletterError, NewsletterService};
pub use orders::{OrderCoordinator, OrderError, OrderView, ResolvedLine};
