//! HTTP routes.
//!
//! ## Route Map (mounted under `/api`)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Public                                                                 │
//! │    GET    /health                                                       │
//! │    GET    /categories                                                   │
//! │    GET    /sweets              ?category_id                             │
//! │    GET    /sweets/search       ?name&category_id&min_price&max_price    │
//! │    GET    /sweets/{id}                                                  │
//! │    POST   /auth/user/register | /auth/user/login                        │
//! │    POST   /auth/admin/setup   | /auth/admin/login                       │
//! │                                                                         │
//! │  Customer token (RequireUser)                                          │
//! │    POST   /sweets/{id}/purchase                                         │
//! │    GET    /purchases                                                    │
//! │    POST   /auth/user/update-password                                    │
//! │                                                                         │
//! │  Admin token (RequireAdmin)                                            │
//! │    POST   /sweets            PUT/DELETE /sweets/{id}                    │
//! │    POST   /sweets/{id}/restock                                          │
//! │    POST   /categories        PUT/DELETE /categories/{id}                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod categories;
pub mod health;
pub mod purchases;
pub mod sweets;

use axum::routing::{get, post, put};
use axum::Router;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::state::AppState;

/// All API routes, relative to the `/api` prefix.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        // Catalog
        .route("/sweets", get(sweets::list).post(sweets::create))
        .route("/sweets/search", get(sweets::search))
        .route(
            "/sweets/{id}",
            get(sweets::get).put(sweets::update).delete(sweets::delete),
        )
        .route("/sweets/{id}/restock", post(sweets::restock))
        .route("/sweets/{id}/purchase", post(purchases::purchase))
        .route("/categories", get(categories::list).post(categories::create))
        .route(
            "/categories/{id}",
            put(categories::update).delete(categories::delete),
        )
        // Purchases
        .route("/purchases", get(purchases::list))
        // Auth
        .route("/auth/user/register", post(auth::register))
        .route("/auth/user/login", post(auth::user_login))
        .route("/auth/user/update-password", post(auth::update_password))
        .route("/auth/admin/setup", post(auth::admin_setup))
        .route("/auth/admin/login", post(auth::admin_login))
}

// =============================================================================
// Shared request/response helpers
// =============================================================================

/// `{ "message": ... }`
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`) in partial-update bodies.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Integer view of a JSON number, accepting floats with no fractional part
/// (`3.0`) the way the browser UI sometimes sends them.
pub(crate) fn whole_number(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }

    value
        .as_f64()
        .filter(|n| n.fract() == 0.0 && n.abs() <= i64::MAX as f64)
        .map(|n| n as i64)
}

/// Treats blank strings as missing.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
