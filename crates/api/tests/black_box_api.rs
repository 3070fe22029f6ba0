use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{Value, json};

use atelier_api::app::services::AppServices;
use atelier_api::config::AppConfig;
use atelier_auth::JwtClaims;
use atelier_core::UserId;
use atelier_infra::notify::RecordingNotifier;
use atelier_infra::store::InMemoryDocumentStore;

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    services: Arc<AppServices>,
    notifier: Arc<RecordingNotifier>,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod over in-memory storage, bound to an ephemeral port.
        let config = AppConfig::local(JWT_SECRET);
        let notifier = Arc::new(RecordingNotifier::new());
        let services = Arc::new(AppServices::new(
            Arc::new(InMemoryDocumentStore::new()),
            notifier.clone(),
            &config,
        ));
        let app = atelier_api::app::build_router(&config, services.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            services,
            notifier,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn admin_token(&self, uid: &str) -> String {
        self.services
            .directory
            .grant_admin(&UserId::new(uid).unwrap(), &format!("{uid}@example.com"), "Admin")
            .await
            .unwrap();
        mint_jwt(uid)
    }

    async fn create_suit(&self, token: &str, body: Value) -> Value {
        let res = self
            .client
            .post(self.url("/api/suits"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        res.json().await.unwrap()
    }

    async fn get_suit(&self, id: &str) -> Value {
        let res = self
            .client
            .get(self.url(&format!("/api/suits/{id}")))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        res.json().await.unwrap()
    }

    async fn place_order(&self, token: &str, suit_id: &str, size: &str, qty: u32) -> reqwest::Response {
        self.client
            .post(self.url("/api/orders"))
            .bearer_auth(token)
            .json(&json!({ "items": [{ "suitId": suit_id, "size": size, "quantity": qty }] }))
            .send()
            .await
            .unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(uid: &str) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: uid.to_string(),
        email: format!("{uid}@example.com"),
        name: Some(format!("User {uid}")),
        issued_at: now - ChronoDuration::seconds(5),
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn navy_suit() -> Value {
    json!({
        "sku": "SUIT-NAVY-01",
        "name": "Navy",
        "fabric": "Wool",
        "style": "business",
        "price": 89900,
        "sizeInventory": [{ "size": "M", "quantity": 2 }, { "size": "L", "quantity": 1 }]
    })
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "OK");
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;

    let res = srv
        .client
        .post(srv.url("/api/orders"))
        .json(&json!({ "items": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unauthenticated");

    let res = srv
        .client
        .get(srv.url("/api/orders"))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn customers_cannot_use_admin_routes() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt("customer-1");

    for path in ["/api/orders", "/api/users/pending", "/api/newsletter/campaigns"] {
        let res = srv
            .client
            .get(srv.url(path))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN, "{path}");
    }

    let res = srv
        .client
        .post(srv.url("/api/suits"))
        .bearer_auth(&token)
        .json(&navy_suit())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn order_reserves_stock_and_reject_restores_it() {
    let srv = TestServer::spawn().await;
    let admin = srv.admin_token("admin-1").await;
    let customer = mint_jwt("customer-1");

    let suit = srv.create_suit(&admin, navy_suit()).await;
    let suit_id = suit["id"].as_str().unwrap().to_string();
    assert_eq!(suit["stock"], 3);

    let res = srv.place_order(&customer, &suit_id, "M", 2).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Order created successfully");
    let order = &body["order"];
    assert_eq!(order["status"], "pending");
    assert_eq!(order["user"]["email"], "customer-1@example.com");
    assert_eq!(order["items"][0]["suit"]["name"], "Navy");
    assert_eq!(order["total"], 179800);
    let order_id = order["id"].as_str().unwrap().to_string();

    let after = srv.get_suit(&suit_id).await;
    assert_eq!(after["stock"], 1);
    assert_eq!(after["sizeInventory"][0], json!({ "size": "M", "quantity": 0 }));

    let res = srv.place_order(&customer, &suit_id, "M", 1).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "insufficient_stock");
    assert_eq!(body["message"], "Insufficient stock for Navy size M");

    let res = srv
        .client
        .post(srv.url(&format!("/api/orders/{order_id}/reject")))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let restored = srv.get_suit(&suit_id).await;
    assert_eq!(restored["stock"], 3);
    assert_eq!(restored["sizeInventory"][0]["quantity"], 2);

    let res = srv
        .client
        .get(srv.url("/api/orders"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let orders: Vec<Value> = res.json().await.unwrap();
    assert!(orders.is_empty());
}

#[tokio::test]
async fn unknown_product_is_not_found() {
    let srv = TestServer::spawn().await;
    let customer = mint_jwt("customer-1");
    let missing = atelier_core::ProductId::new().to_string();

    let res = srv.place_order(&customer, &missing, "M", 1).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], format!("Suit {missing} not found"));

    let res = srv
        .client
        .post(srv.url("/api/orders"))
        .bearer_auth(&customer)
        .json(&json!({ "items": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn approve_confirms_once_and_exports_picking_list() {
    let srv = TestServer::spawn().await;
    let admin = srv.admin_token("admin-1").await;
    let customer = mint_jwt("customer-1");

    let suit = srv.create_suit(&admin, navy_suit()).await;
    let suit_id = suit["id"].as_str().unwrap();
    let res = srv.place_order(&customer, suit_id, "L", 1).await;
    let body: Value = res.json().await.unwrap();
    let order_id = body["order"]["id"].as_str().unwrap().to_string();

    let approve = |id: String| {
        srv.client
            .post(srv.url(&format!("/api/orders/{id}/approve")))
            .bearer_auth(&admin)
            .send()
    };

    let res = approve(order_id.clone()).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["order"]["status"], "confirmed");

    let res = approve(order_id.clone()).await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_state");

    let res = srv
        .client
        .get(srv.url(&format!("/api/orders/{order_id}/picking-list")))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let text = res.text().await.unwrap();
    assert!(text.contains("SUIT-NAVY-01"));
    assert!(text.contains(&order_id));

    for _ in 0..50 {
        if !srv.notifier.sent().is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    let sent = srv.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "customer-1@example.com");
}

#[tokio::test]
async fn catalog_filters_sorts_and_paginates() {
    let srv = TestServer::spawn().await;
    let admin = srv.admin_token("admin-1").await;

    for (sku, name, style, price) in [
        ("A-1", "Zephyr", "business", Some(50_000)),
        ("A-2", "Aurora", "business", Some(90_000)),
        ("A-3", "Midnight", "tuxedo", Some(120_000)),
        ("A-4", "Preview", "business", None),
    ] {
        srv.create_suit(
            &admin,
            json!({
                "sku": sku,
                "name": name,
                "fabric": "Italian Wool",
                "style": style,
                "price": price,
                "sizeInventory": [{ "size": "M", "quantity": 1 }]
            }),
        )
        .await;
    }

    let res = srv
        .client
        .get(srv.url("/api/suits?style=business&sort=price-asc&limit=2"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let page: Value = res.json().await.unwrap();
    assert_eq!(page["totalPages"], 2);
    assert_eq!(page["currentPage"], 1);
    let names: Vec<&str> = page["suits"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Zephyr", "Aurora"]);

    let res = srv
        .client
        .get(srv.url("/api/suits?fabric=italian&minPrice=60000"))
        .send()
        .await
        .unwrap();
    let page: Value = res.json().await.unwrap();
    assert_eq!(page["suits"].as_array().unwrap().len(), 2);

    let res = srv
        .client
        .get(srv.url("/api/suits?style=kilt"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = srv
        .client
        .post(srv.url("/api/suits"))
        .bearer_auth(&admin)
        .json(&json!({ "sku": "a-1", "name": "Dup", "fabric": "Wool", "style": "casual" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn account_approval_workflow() {
    let srv = TestServer::spawn().await;
    let admin = srv.admin_token("admin-1").await;
    let customer = mint_jwt("customer-7");

    let res = srv
        .client
        .post(srv.url("/api/users/pending"))
        .bearer_auth(&customer)
        .json(&json!({ "companyName": "Acme", "mobileNumber": "+1 555 0100" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = srv
        .client
        .get(srv.url("/api/users/pending"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let pending: Vec<Value> = res.json().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["uid"], "customer-7");

    let res = srv
        .client
        .post(srv.url("/api/users/approve/customer-7"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["user"]["status"], "approved");

    let res = srv
        .client
        .post(srv.url("/api/users/approve/customer-7"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = srv
        .client
        .delete(srv.url("/api/users/reject/nobody"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn enquiries_validate_required_fields() {
    let srv = TestServer::spawn().await;
    let suit_id = atelier_core::ProductId::new().to_string();

    let res = srv
        .client
        .post(srv.url("/api/enquiries"))
        .json(&json!({
            "suitId": suit_id,
            "name": "Ada",
            "email": "ada@example.com",
            "message": "Is the navy available in 42R?"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Enquiry submitted successfully");

    let res = srv
        .client
        .post(srv.url("/api/enquiries"))
        .json(&json!({ "suitId": suit_id, "name": "Ada" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn newsletter_campaign_is_sent_to_subscribers() {
    let srv = TestServer::spawn().await;
    let admin = srv.admin_token("admin-1").await;

    for _ in 0..2 {
        let res = srv
            .client
            .post(srv.url("/api/newsletter/subscribe"))
            .json(&json!({ "email": "Reader@Example.com" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = srv
        .client
        .post(srv.url("/api/newsletter/campaigns"))
        .bearer_auth(&admin)
        .json(&json!({ "subject": "Autumn cloth", "content": "New flannels are in." }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let campaign: Value = res.json().await.unwrap();
    assert_eq!(campaign["status"], "draft");
    let id = campaign["id"].as_str().unwrap();

    let res = srv
        .client
        .post(srv.url(&format!("/api/newsletter/campaigns/{id}/send")))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let sent: Value = res.json().await.unwrap();
    assert_eq!(sent["status"], "sent");
    assert_eq!(sent["recipientCount"], 1);

    let delivered = srv.notifier.sent();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].to, "reader@example.com");
}
