use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use atelier_auth::{Role, TokenVerifier};
use atelier_infra::AccessPolicy;

use crate::app::errors::json_error;
use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct AuthState {
    pub verifier: Arc<dyn TokenVerifier>,
    pub access: Arc<dyn AccessPolicy>,
}

/// Verify the bearer token and attach a [`PrincipalContext`].
///
/// The admin role is granted only when the account directory says the caller
/// is privileged; everybody else with a valid token is a customer.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers()).ok_or_else(|| {
        json_error(
            StatusCode::UNAUTHORIZED,
            "unauthenticated",
            "missing bearer token",
        )
    })?;

    let principal = state.verifier.verify(token, Utc::now()).map_err(|e| {
        tracing::debug!(error = %e, "rejected bearer token");
        json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "invalid token")
    })?;

    let privileged = state.access.is_privileged(&principal.uid).await.map_err(|e| {
        tracing::error!(uid = %principal.uid, error = %e, "privilege lookup failed");
        json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "could not resolve caller privileges",
        )
    })?;
    let roles = if privileged {
        vec![Role::ADMIN]
    } else {
        vec![Role::CUSTOMER]
    };

    req.extensions_mut()
        .insert(PrincipalContext::new(principal, roles));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let token = header.to_str().ok()?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_is_extracted() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer(&headers), None);

        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_bearer(&headers), None);

        headers.insert("authorization", HeaderValue::from_static("Bearer   "));
        assert_eq!(extract_bearer(&headers), None);

        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_bearer(&headers), Some("abc.def"));
    }
}
