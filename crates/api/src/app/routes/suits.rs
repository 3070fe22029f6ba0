use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Extension, Path, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};

use atelier_auth::Permission;
use atelier_core::ProductId;

use crate::app::dto::{self, CatalogPageResponse, CatalogParams, CreateProductRequest};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub async fn list_suits(
    Extension(services): Extension<Arc<AppServices>>,
    params: Result<Query<CatalogParams>, QueryRejection>,
) -> Response {
    let params = match dto::query_params(params) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let query = match params.into_query() {
        Ok(q) => q,
        Err(e) => return errors::bad_request(e.to_string()),
    };

    match services.catalog.list(&query).await {
        Ok(page) => Json(CatalogPageResponse::from(page.as_ref())).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn get_suit(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id: ProductId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.catalog.get(id).await {
        Ok(Some(product)) => Json(product).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "product_not_found", "Suit not found"),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn create_suit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Response {
    if let Err(resp) = crate::authz::require(&principal, &Permission::CATALOG_MANAGE) {
        return resp;
    }
    let body = match dto::json_body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let input = match body.into_new_product() {
        Ok(v) => v,
        Err(e) => return errors::bad_request(e.to_string()),
    };

    match services.catalog.create(input).await {
        Ok(product) => (StatusCode::CREATED, Json(product)).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}
