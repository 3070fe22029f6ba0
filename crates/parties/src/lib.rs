//! Parties domain module.
//!
//! Storefront customers and the records they leave behind: user accounts
//! (with the approval workflow), product enquiries, and newsletter
//! subscribers/campaigns.

pub mod account;
pub mod contact;
pub mod enquiry;
pub mod newsletter;

pub use account::{AccountStateError, AccountStatus, UserAccount};
pub use contact::normalize_email;
pub use enquiry::{Enquiry, NewEnquiry};
pub use newsletter::{Campaign, CampaignStatus, Subscriber};
