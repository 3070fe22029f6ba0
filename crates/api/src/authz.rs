//! API-side authorization guard.
//!
//! Handlers call [`require`] before touching any service, keeping the
//! services themselves auth-agnostic.

use axum::http::StatusCode;
use axum::response::Response;

use atelier_auth::{Permission, authorize};

use crate::app::errors::json_error;
use crate::context::PrincipalContext;

/// Check that the request principal holds `required`; 403 otherwise.
pub fn require(principal: &PrincipalContext, required: &Permission) -> Result<(), Response> {
    authorize(principal.roles(), required).map_err(|e| {
        tracing::debug!(uid = %principal.principal().uid, error = %e, "request denied");
        json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string())
    })
}
