use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::app::dto::{self, EnquiryRequest};
use crate::app::errors;
use crate::app::services::AppServices;

pub async fn submit_enquiry(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<EnquiryRequest>, JsonRejection>,
) -> Response {
    let body = match dto::json_body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let input = match body.into_new_enquiry() {
        Ok(v) => v,
        Err(e) => return errors::bad_request(e.to_string()),
    };

    match services.enquiries.submit(input).await {
        Ok(_) => (
            StatusCode::CREATED,
            Json(json!({ "message": "Enquiry submitted successfully" })),
        )
            .into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}
