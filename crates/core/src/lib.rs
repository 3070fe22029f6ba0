//! `atelier-core`: storefront domain building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the domain error model, money, and the document/version
//! contract every persisted record follows.

pub mod document;
pub mod error;
pub mod id;
pub mod value_object;

pub use document::{Document, ExpectedVersion, Versioned};
pub use error::{DomainError, DomainResult};
pub use id::{CampaignId, EnquiryId, OrderId, ProductId, UserId};
pub use value_object::{Money, ValueObject};
