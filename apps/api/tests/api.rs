//! End-to-end tests: real router, real extractors, in-memory SQLite.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use chrono::Utc;
use sweetshop_api::auth::JwtManager;
use sweetshop_api::{build_router, ApiConfig, AppState};
use sweetshop_core::{Account, AccountKind};
use sweetshop_db::{Database, DbConfig};
use tower::ServiceExt;

struct TestApp {
    router: Router,
}

impl TestApp {
    async fn new() -> Self {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let config = ApiConfig {
            jwt_secret: "integration-test-secret".to_string(),
            ..ApiConfig::default()
        };

        TestApp {
            router: build_router(AppState::new(&config, db)),
        }
    }

    async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, json)
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, token, None).await
    }

    async fn admin_token(&self) -> String {
        let (status, body) = self
            .post(
                "/api/auth/admin/setup",
                None,
                json!({ "email": "boss@candy.shop", "password": "lollipop", "name": "Boss" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    async fn user_token(&self) -> String {
        let (status, body) = self
            .post(
                "/api/auth/user/register",
                None,
                json!({ "email": "kid@candy.shop", "password": "gumdrop", "name": "Kid" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    async fn create_sweet(&self, admin: &str, body: Value) -> Value {
        let (status, body) = self.post("/api/sweets", Some(admin), body).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["sweet"].clone()
    }
}

fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap().to_string()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "database": "connected" }));
}

// =============================================================================
// Purchases
// =============================================================================

#[tokio::test]
async fn test_purchase_until_insufficient_stock() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let user = app.user_token().await;

    let sweet = app
        .create_sweet(&admin, json!({ "name": "Gummy Bears", "price": 2.00, "quantity": 5 }))
        .await;
    let uri = format!("/api/sweets/{}/purchase", id_of(&sweet));

    let (status, body) = app.post(&uri, Some(&user), json!({ "quantity": 3 })).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["message"], "Purchase successful");
    assert_eq!(body["purchase"]["quantity"], 3);
    assert_eq!(body["purchase"]["total_price"].as_f64(), Some(6.0));
    assert_eq!(body["purchase"]["sweet"]["quantity"], 2);

    let (status, body) = app.post(&uri, Some(&user), json!({ "quantity": 3 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Insufficient stock");
    assert_eq!(body["available"], 2);

    let (_, body) = app.get(&format!("/api/sweets/{}", id_of(&sweet)), None).await;
    assert_eq!(body["sweet"]["quantity"], 2);

    let (status, body) = app.get("/api/purchases", Some(&user)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["purchases"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_restock_then_sell_out() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let user = app.user_token().await;

    let fudge = app
        .create_sweet(&admin, json!({ "name": "Fudge", "price": 3.50, "quantity": 0 }))
        .await;
    let id = id_of(&fudge);

    let (status, body) = app
        .post(&format!("/api/sweets/{id}/restock"), Some(&admin), json!({ "quantity": 10 }))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Restock successful");
    assert_eq!(body["sweet"]["quantity"], 10);

    let purchase_uri = format!("/api/sweets/{id}/purchase");
    let (status, body) = app
        .post(&purchase_uri, Some(&user), json!({ "quantity": 10 }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["purchase"]["total_price"].as_f64(), Some(35.0));
    assert_eq!(body["purchase"]["sweet"]["quantity"], 0);

    let (status, _) = app.post(&purchase_uri, Some(&user), json!({ "quantity": 1 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_purchase_defaults_and_validation() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let user = app.user_token().await;

    let sweet = app
        .create_sweet(&admin, json!({ "name": "Lollipop", "price": 0.99, "quantity": 3 }))
        .await;
    let uri = format!("/api/sweets/{}/purchase", id_of(&sweet));

    // No body at all buys one
    let (status, body) = app.request(Method::POST, &uri, Some(&user), None).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["purchase"]["quantity"], 1);

    for quantity in [json!(0), json!(-2), json!(1000), json!("two")] {
        let (status, _) = app.post(&uri, Some(&user), json!({ "quantity": quantity })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "quantity {quantity}");
    }

    let (status, body) = app
        .post("/api/sweets/no-such-sweet/purchase", Some(&user), json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Sweet not found");
}

// =============================================================================
// Authorization
// =============================================================================

#[tokio::test]
async fn test_role_enforcement() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let user = app.user_token().await;

    let sweet = app
        .create_sweet(&admin, json!({ "name": "Toffee", "price": 1.25, "quantity": 4 }))
        .await;
    let id = id_of(&sweet);

    let (status, category) = app
        .post("/api/categories", Some(&admin), json!({ "name": "Chewy" }))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{category}");
    let category_id = id_of(&category["category"]);

    // Customer on admin routes
    let (status, body) = app
        .post("/api/sweets", Some(&user), json!({ "name": "X", "price": 1, "quantity": 1 }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Admin access required");

    let (status, _) = app
        .post(&format!("/api/sweets/{id}/restock"), Some(&user), json!({ "quantity": 1 }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.delete(&format!("/api/sweets/{id}"), Some(&user)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .post("/api/categories", Some(&user), json!({ "name": "Nope" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .put(&format!("/api/sweets/{id}"), Some(&user), json!({ "price": 0.01 }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Admin access required");

    let (status, body) = app
        .put(&format!("/api/categories/{category_id}"), Some(&user), json!({ "name": "Mine" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Admin access required");

    let (status, body) = app
        .delete(&format!("/api/categories/{category_id}"), Some(&user))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Admin access required");

    // Admin on customer routes
    let (status, body) = app
        .post(&format!("/api/sweets/{id}/purchase"), Some(&admin), json!({ "quantity": 1 }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "User access required");

    let (status, _) = app.get("/api/purchases", Some(&admin)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .post(
            "/api/auth/user/update-password",
            Some(&admin),
            json!({ "password": "whatever1" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "User access required");

    // Missing or bogus tokens
    let (status, body) = app.get("/api/purchases", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let (status, _) = app.get("/api/purchases", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.delete(&format!("/api/sweets/{id}"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Nothing changed
    let (_, body) = app.get(&format!("/api/sweets/{id}"), None).await;
    assert_eq!(body["sweet"]["quantity"], 4);
    assert_eq!(body["sweet"]["price"], 1.25);

    let (_, body) = app.get("/api/categories", None).await;
    assert_eq!(body["categories"][0]["name"], "Chewy");
}

#[tokio::test]
async fn test_token_for_deleted_account_is_unauthorized() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let sweet = app
        .create_sweet(&admin, json!({ "name": "Toffee", "price": 1.25, "quantity": 4 }))
        .await;
    let id = id_of(&sweet);

    // Validly signed, but no users row behind it
    let ghost = Account {
        id: "ghost-user".to_string(),
        email: "ghost@candy.shop".to_string(),
        name: "Ghost".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    let token = JwtManager::new("integration-test-secret", 3600)
        .generate_token(&ghost, AccountKind::User)
        .unwrap();

    let (status, body) = app
        .post(&format!("/api/sweets/{id}/purchase"), Some(&token), json!({ "quantity": 2 }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Account no longer exists");

    let (status, _) = app
        .post(
            "/api/auth/user/update-password",
            Some(&token),
            json!({ "password": "whatever1" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, body) = app.get(&format!("/api/sweets/{id}"), None).await;
    assert_eq!(body["sweet"]["quantity"], 4);
}

// =============================================================================
// Accounts
// =============================================================================

#[tokio::test]
async fn test_register_login_and_update_password() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/auth/user/register",
            None,
            json!({ "email": " Kid@Candy.Shop ", "password": "gumdrop", "name": "Kid" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["type"], "user");
    assert_eq!(body["user"]["email"], "kid@candy.shop");
    assert!(body["user"].get("password_hash").is_none());

    let (status, body) = app
        .post(
            "/api/auth/user/register",
            None,
            json!({ "email": "kid@candy.shop", "password": "another", "name": "Kid 2" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "User already exists");

    let (status, body) = app
        .post(
            "/api/auth/user/login",
            None,
            json!({ "email": "kid@candy.shop", "password": "wrong-one" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    let (status, body) = app
        .post(
            "/api/auth/user/login",
            None,
            json!({ "email": "kid@candy.shop", "password": "gumdrop" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = app
        .post(
            "/api/auth/user/update-password",
            Some(&token),
            json!({ "password": "sherbet" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["token"].as_str().is_some());

    let (status, _) = app
        .post(
            "/api/auth/user/login",
            None,
            json!({ "email": "kid@candy.shop", "password": "sherbet" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .post("/api/auth/user/update-password", None, json!({ "password": "x" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signup_validation() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post("/api/auth/user/register", None, json!({ "email": "a@b.co" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email, password, and name are required");

    let (status, _) = app
        .post(
            "/api/auth/user/register",
            None,
            json!({ "email": "not-an-email", "password": "gumdrop", "name": "X" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/auth/admin/setup",
            None,
            json!({ "email": "a@b.co", "password": "short", "name": "X" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post("/api/auth/admin/login", None, json!({ "email": "a@b.co" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email and password are required");

    let (status, _) = app
        .post(
            "/api/auth/admin/login",
            None,
            json!({ "email": "nobody@candy.shop", "password": "whatever" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_catalog_crud_and_search() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let user = app.user_token().await;

    let (status, body) = app
        .post("/api/categories", Some(&admin), json!({ "name": "Chocolate" }))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let chocolate = id_of(&body["category"]);

    let (status, body) = app
        .post("/api/sweets", Some(&admin), json!({ "name": "No Price", "quantity": 1 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Name, price, and quantity are required");

    let (status, _) = app
        .post(
            "/api/sweets",
            Some(&admin),
            json!({ "name": "Orphan", "price": 1, "quantity": 1, "category_id": "missing" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let dark = app
        .create_sweet(
            &admin,
            json!({
                "name": "Dark Chocolate Bar",
                "price": 2.99,
                "quantity": 40,
                "category_id": chocolate,
                "description": "70% cocoa"
            }),
        )
        .await;
    assert_eq!(dark["category"]["name"], "Chocolate");
    app.create_sweet(&admin, json!({ "name": "Sour Worms", "price": 2.00, "quantity": 75 }))
        .await;

    // Newest first
    let (_, body) = app.get("/api/sweets", None).await;
    let names: Vec<_> = body["sweets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Sour Worms", "Dark Chocolate Bar"]);

    let (_, body) = app
        .get(&format!("/api/sweets?category_id={chocolate}"), None)
        .await;
    assert_eq!(body["sweets"].as_array().unwrap().len(), 1);

    let (_, body) = app.get("/api/sweets/search?name=CHOC", None).await;
    assert_eq!(body["sweets"].as_array().unwrap().len(), 1);

    let (_, body) = app
        .get("/api/sweets/search?min_price=2&max_price=2.5", None)
        .await;
    assert_eq!(body["sweets"][0]["name"], "Sour Worms");
    assert_eq!(body["sweets"].as_array().unwrap().len(), 1);

    let (status, body) = app.get("/api/sweets/search?min_price=cheap", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid min_price");

    // Partial update; null clears
    let id = id_of(&dark);
    let (status, body) = app
        .put(
            &format!("/api/sweets/{id}"),
            Some(&admin),
            json!({ "price": 3.25, "description": null }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["sweet"]["price"].as_f64(), Some(3.25));
    assert_eq!(body["sweet"]["description"], Value::Null);
    assert_eq!(body["sweet"]["quantity"], 40);
    assert_eq!(body["sweet"]["name"], "Dark Chocolate Bar");

    let (status, _) = app
        .put("/api/sweets/missing", Some(&admin), json!({ "quantity": 1 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .put(&format!("/api/sweets/{id}"), Some(&admin), json!({ "quantity": -1 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Purchase, then delete: history survives with a null sweet
    let (status, _) = app
        .post(&format!("/api/sweets/{id}/purchase"), Some(&user), json!({ "quantity": 2 }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.delete(&format!("/api/sweets/{id}"), Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Sweet deleted successfully");

    let (status, _) = app.get(&format!("/api/sweets/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.delete(&format!("/api/sweets/{id}"), Some(&admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.get("/api/purchases", Some(&user)).await;
    let purchase = &body["purchases"][0];
    assert_eq!(purchase["sweet_id"], id.as_str());
    assert_eq!(purchase["sweet"], Value::Null);
    assert_eq!(purchase["total_price"].as_f64(), Some(6.5));
}

#[tokio::test]
async fn test_category_management() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let (_, body) = app
        .post(
            "/api/categories",
            Some(&admin),
            json!({ "name": "Gummies", "description": "Chewy" }),
        )
        .await;
    let gummies = id_of(&body["category"]);

    let (status, body) = app
        .post("/api/categories", Some(&admin), json!({ "name": "Gummies" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    let (status, body) = app
        .post("/api/categories", Some(&admin), json!({ "description": "nameless" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Name is required");

    let bears = app
        .create_sweet(
            &admin,
            json!({ "name": "Gummy Bears", "price": 2.5, "quantity": 10, "category_id": gummies }),
        )
        .await;

    let (status, body) = app
        .put(
            &format!("/api/categories/{gummies}"),
            Some(&admin),
            json!({ "name": "Gummy Sweets", "description": null }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["category"]["name"], "Gummy Sweets");
    assert_eq!(body["category"]["description"], Value::Null);

    let (_, body) = app.get("/api/categories", None).await;
    assert_eq!(body["categories"].as_array().unwrap().len(), 1);

    let (status, body) = app
        .delete(&format!("/api/categories/{gummies}"), Some(&admin))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Category deleted successfully");

    let (_, body) = app.get(&format!("/api/sweets/{}", id_of(&bears)), None).await;
    assert_eq!(body["sweet"]["category_id"], Value::Null);
    assert_eq!(body["sweet"]["category"], Value::Null);

    let (status, _) = app
        .delete(&format!("/api/categories/{gummies}"), Some(&admin))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
