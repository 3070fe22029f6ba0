use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use atelier_auth::Permission;
use atelier_core::UserId;

use crate::app::dto::{self, RegisterAccountRequest};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

fn parse_uid(raw: String) -> Result<UserId, Response> {
    UserId::new(raw).map_err(|e| errors::bad_request(e.to_string()))
}

/// The caller asks for an account; it stays pending until an admin approves it.
pub async fn register_pending(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<RegisterAccountRequest>, JsonRejection>,
) -> Response {
    if let Err(resp) = crate::authz::require(&principal, &Permission::ACCOUNTS_REGISTER) {
        return resp;
    }
    let body = match dto::json_body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    match services
        .directory
        .register(
            principal.principal(),
            body.display_name,
            body.company_name,
            body.mobile_number,
        )
        .await
    {
        Ok(account) => (StatusCode::CREATED, Json(account)).into_response(),
        Err(e) => errors::directory_error_to_response(e),
    }
}

pub async fn list_pending(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(resp) = crate::authz::require(&principal, &Permission::ACCOUNTS_MANAGE) {
        return resp;
    }

    match services.directory.pending().await {
        Ok(accounts) => Json(accounts).into_response(),
        Err(e) => errors::directory_error_to_response(e),
    }
}

pub async fn approve_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(uid): Path<String>,
) -> Response {
    if let Err(resp) = crate::authz::require(&principal, &Permission::ACCOUNTS_MANAGE) {
        return resp;
    }
    let uid = match parse_uid(uid) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.directory.approve(&uid).await {
        Ok(account) => Json(json!({ "message": "User approved", "user": account })).into_response(),
        Err(e) => errors::directory_error_to_response(e),
    }
}

pub async fn reject_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(uid): Path<String>,
) -> Response {
    if let Err(resp) = crate::authz::require(&principal, &Permission::ACCOUNTS_MANAGE) {
        return resp;
    }
    let uid = match parse_uid(uid) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.directory.reject(&uid).await {
        Ok(()) => Json(json!({ "message": "User rejected" })).into_response(),
        Err(e) => errors::directory_error_to_response(e),
    }
}
