//! Purchase routes (customer token required).
//!
//! ```text
//! POST /api/sweets/{id}/purchase   body optional, { "quantity": n } (default 1)
//!      │
//!      ▼
//! RequireUser ──► quantity from body ──► PurchaseRepository::create (one tx)
//!      │
//!      ▼
//! 201 { purchase, message: "Purchase successful" }
//! ```

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use sweetshop_core::Purchase;
use tracing::{debug, info};

use super::whole_number;
use crate::error::{ApiError, ApiResult};
use crate::extract::RequireUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PurchaseResponse {
    pub purchase: Purchase,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PurchasesResponse {
    pub purchases: Vec<Purchase>,
}

/// `POST /api/sweets/{id}/purchase`
///
/// The user id comes from the verified token, never from the body.
pub async fn purchase(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(sweet_id): Path<String>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<PurchaseResponse>)> {
    let quantity = requested_quantity(&body)?;

    debug!(user_id = %user.sub, sweet_id = %sweet_id, quantity, "Purchase requested");

    let purchase = state
        .db()
        .purchases()
        .create(&user.sub, &sweet_id, quantity)
        .await?;

    info!(
        user_id = %user.sub,
        purchase_id = %purchase.id,
        total = %purchase.total_price,
        "Purchase completed"
    );

    Ok((
        StatusCode::CREATED,
        Json(PurchaseResponse {
            purchase,
            message: "Purchase successful",
        }),
    ))
}

/// `GET /api/purchases` - the caller's own history, newest first.
pub async fn list(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
) -> ApiResult<Json<PurchasesResponse>> {
    let purchases = state.db().purchases().list_for_user(&user.sub).await?;

    Ok(Json(PurchasesResponse { purchases }))
}

/// Reads `quantity` from an optional JSON body. An empty body, an empty
/// object, or `"quantity": null` all mean one unit.
fn requested_quantity(body: &[u8]) -> ApiResult<i64> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(1);
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|_| ApiError::validation("Request body must be valid JSON"))?;

    match value.get("quantity") {
        None | Some(Value::Null) => Ok(1),
        Some(quantity) => {
            whole_number(quantity).ok_or_else(|| ApiError::validation("Valid quantity is required"))
        }
    }
}
