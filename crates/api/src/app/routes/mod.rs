use axum::{
    Router,
    routing::{delete, get, post},
};

pub mod enquiries;
pub mod newsletter;
pub mod orders;
pub mod suits;
pub mod system;
pub mod users;

/// Endpoints open to anonymous visitors.
pub fn public_router() -> Router {
    Router::new()
        .route("/api/suits", get(suits::list_suits))
        .route("/api/suits/:id", get(suits::get_suit))
        .route("/api/enquiries", post(enquiries::submit_enquiry))
        .route("/api/newsletter/subscribe", post(newsletter::subscribe))
}

/// Endpoints that need a verified caller. Admin-only handlers additionally
/// check the caller's permissions.
pub fn protected_router() -> Router {
    Router::new()
        .route("/api/suits", post(suits::create_suit))
        .route(
            "/api/orders",
            post(orders::create_order).get(orders::list_orders),
        )
        .route("/api/orders/:id/approve", post(orders::approve_order))
        .route("/api/orders/:id/reject", post(orders::reject_order))
        .route("/api/orders/:id/picking-list", get(orders::picking_list))
        .route(
            "/api/users/pending",
            post(users::register_pending).get(users::list_pending),
        )
        .route("/api/users/approve/:uid", post(users::approve_user))
        .route("/api/users/reject/:uid", delete(users::reject_user))
        .route(
            "/api/newsletter/campaigns",
            get(newsletter::list_campaigns).post(newsletter::create_campaign),
        )
        .route(
            "/api/newsletter/campaigns/:id/send",
            post(newsletter::send_campaign),
        )
}
