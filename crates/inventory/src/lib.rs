//! Inventory domain module.
//!
//! Per-product size buckets and the reservation/release rules that keep the
//! aggregate stock figure consistent. Pure domain logic (no IO, no storage).

pub mod ledger;

pub use ledger::{LedgerError, SizeBucket, SizeInventory};
