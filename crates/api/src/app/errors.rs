//! Consistent error responses: every failure is `{"error": <code>, "message": <text>}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use atelier_core::DomainError;
use atelier_infra::store::StoreError;
use atelier_infra::{CatalogError, DirectoryError, NewsletterError, OrderError};

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn bad_request(message: impl Into<String>) -> Response {
    json_error(StatusCode::BAD_REQUEST, "validation_error", message)
}

fn internal(err: &dyn std::fmt::Display) -> Response {
    tracing::error!(error = %err, "request failed");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        err.to_string(),
    )
}

fn domain_error_to_response(err: DomainError) -> Response {
    match err {
        DomainError::Validation(msg) | DomainError::InvalidId(msg) => bad_request(msg),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
    }
}

fn store_error_to_response(err: StoreError) -> Response {
    match err {
        StoreError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        StoreError::Duplicate(msg) => json_error(StatusCode::CONFLICT, "duplicate", msg),
        other => internal(&other),
    }
}

pub fn order_error_to_response(err: OrderError) -> Response {
    let message = err.to_string();
    match err {
        OrderError::Validation(_) => bad_request(message),
        OrderError::ProductNotFound(_) => {
            json_error(StatusCode::NOT_FOUND, "product_not_found", message)
        }
        OrderError::OrderNotFound(_) => json_error(StatusCode::NOT_FOUND, "order_not_found", message),
        OrderError::InsufficientStock { .. } => {
            json_error(StatusCode::CONFLICT, "insufficient_stock", message)
        }
        OrderError::InvalidState(_) => json_error(StatusCode::CONFLICT, "invalid_state", message),
        OrderError::ConflictRetryable(_) => json_error(StatusCode::CONFLICT, "conflict", message),
        OrderError::DanglingProduct { .. } | OrderError::SizeNotFound { .. } => {
            tracing::error!(error = %message, "order references stale catalog data");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "inconsistent_order", message)
        }
        OrderError::Internal(_) => internal(&message),
    }
}

pub fn catalog_error_to_response(err: CatalogError) -> Response {
    match err {
        CatalogError::Domain(e) => domain_error_to_response(e),
        CatalogError::DuplicateSku(_) => {
            json_error(StatusCode::CONFLICT, "duplicate_sku", err.to_string())
        }
        CatalogError::Store(e) => store_error_to_response(e),
    }
}

pub fn directory_error_to_response(err: DirectoryError) -> Response {
    match err {
        DirectoryError::NotFound(_) => {
            json_error(StatusCode::NOT_FOUND, "account_not_found", err.to_string())
        }
        DirectoryError::AlreadyRegistered(_) | DirectoryError::State(_) => {
            json_error(StatusCode::CONFLICT, "invalid_state", err.to_string())
        }
        DirectoryError::Domain(e) => domain_error_to_response(e),
        DirectoryError::Store(e) => store_error_to_response(e),
    }
}

pub fn newsletter_error_to_response(err: NewsletterError) -> Response {
    match err {
        NewsletterError::CampaignNotFound(_) => {
            json_error(StatusCode::NOT_FOUND, "campaign_not_found", err.to_string())
        }
        NewsletterError::Domain(e) => domain_error_to_response(e),
        NewsletterError::Store(e) => store_error_to_response(e),
    }
}
