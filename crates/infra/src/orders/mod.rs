//! Order placement, approval and rejection.

pub mod coordinator;
pub mod error;
pub mod view;

pub use coordinator::OrderCoordinator;
pub use error::OrderError;
pub use view::{OrderView, ResolvedLine};
