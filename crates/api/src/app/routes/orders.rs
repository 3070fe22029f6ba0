use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use atelier_auth::Permission;
use atelier_core::OrderId;
use atelier_infra::export::render_picking_list;

use crate::app::dto::{self, CreateOrderRequest, OrderResponse};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Response {
    if let Err(resp) = crate::authz::require(&principal, &Permission::ORDERS_PLACE) {
        return resp;
    }
    let body = match dto::json_body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let lines = match body.into_lines() {
        Ok(lines) => lines,
        Err(e) => return errors::bad_request(e.to_string()),
    };

    match services.orders.create(principal.principal(), lines).await {
        Ok(view) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Order created successfully",
                "order": OrderResponse::from(view),
            })),
        )
            .into_response(),
        Err(e) => errors::order_error_to_response(e),
    }
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(resp) = crate::authz::require(&principal, &Permission::ORDERS_MANAGE) {
        return resp;
    }

    match services.orders.list().await {
        Ok(views) => Json(
            views
                .into_iter()
                .map(OrderResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => errors::order_error_to_response(e),
    }
}

pub async fn approve_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = crate::authz::require(&principal, &Permission::ORDERS_MANAGE) {
        return resp;
    }
    let id: OrderId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.orders.approve(id).await {
        Ok(view) => Json(json!({
            "message": "Order approved",
            "order": OrderResponse::from(view),
        }))
        .into_response(),
        Err(e) => errors::order_error_to_response(e),
    }
}

pub async fn reject_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = crate::authz::require(&principal, &Permission::ORDERS_MANAGE) {
        return resp;
    }
    let id: OrderId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.orders.reject(id).await {
        Ok(view) => Json(json!({
            "message": "Order rejected and stock restored",
            "order": OrderResponse::from(view),
        }))
        .into_response(),
        Err(e) => errors::order_error_to_response(e),
    }
}

pub async fn picking_list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = crate::authz::require(&principal, &Permission::ORDERS_MANAGE) {
        return resp;
    }
    let id: OrderId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.orders.get(id).await {
        Ok(view) => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            render_picking_list(&view),
        )
            .into_response(),
        Err(e) => errors::order_error_to_response(e),
    }
}
