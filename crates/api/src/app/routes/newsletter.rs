use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use atelier_auth::Permission;
use atelier_core::CampaignId;

use crate::app::dto::{self, CreateCampaignRequest, SubscribeRequest};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub async fn subscribe(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<SubscribeRequest>, JsonRejection>,
) -> Response {
    let body = match dto::json_body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    match services.newsletter.subscribe(&body.email).await {
        Ok(subscriber) => Json(json!({
            "message": "Subscribed successfully",
            "email": subscriber.email,
        }))
        .into_response(),
        Err(e) => errors::newsletter_error_to_response(e),
    }
}

pub async fn list_campaigns(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(resp) = crate::authz::require(&principal, &Permission::NEWSLETTER_MANAGE) {
        return resp;
    }

    match services.newsletter.campaigns().await {
        Ok(campaigns) => Json(campaigns).into_response(),
        Err(e) => errors::newsletter_error_to_response(e),
    }
}

pub async fn create_campaign(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<CreateCampaignRequest>, JsonRejection>,
) -> Response {
    if let Err(resp) = crate::authz::require(&principal, &Permission::NEWSLETTER_MANAGE) {
        return resp;
    }
    let body = match dto::json_body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    match services
        .newsletter
        .create_campaign(body.subject, body.content)
        .await
    {
        Ok(campaign) => (StatusCode::CREATED, Json(campaign)).into_response(),
        Err(e) => errors::newsletter_error_to_response(e),
    }
}

pub async fn send_campaign(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = crate::authz::require(&principal, &Permission::NEWSLETTER_MANAGE) {
        return resp;
    }
    let id: CampaignId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.newsletter.send_campaign(id).await {
        Ok(campaign) => Json(campaign).into_response(),
        Err(e) => errors::newsletter_error_to_response(e),
    }
}
