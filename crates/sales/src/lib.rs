//! Sales domain module.
//!
//! Customer orders: purchaser snapshot, line items and the status rules that
//! gate approval and rejection. Stock movements live with the coordinator in
//! `atelier-infra`.

pub mod order;

pub use order::{Order, OrderLine, OrderStateError, OrderStatus, PurchaserSnapshot};
