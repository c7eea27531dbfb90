//! Catalog routes: browse, search, and the admin inventory operations.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use sweetshop_core::validation::{validate_restock_quantity, validate_search_query};
use sweetshop_core::{money, Money, NewSweet, Sweet, SweetFilter, SweetUpdate};
use tracing::{debug, info};

use super::{double_option, non_blank, whole_number, MessageResponse};
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery, RequireAdmin};
use crate::state::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category_id: Option<String>,
}

/// Raw search parameters. Prices stay strings until parsed so that a bad
/// bound becomes a readable 400 rather than a generic query rejection.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub name: Option<String>,
    pub category_id: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSweetRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<String>,
    #[serde(default, deserialize_with = "money::decimal::option::deserialize")]
    pub price: Option<Money>,
    pub quantity: Option<i64>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSweetRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "money::decimal::option::deserialize")]
    pub price: Option<Money>,
    pub quantity: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub image_url: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    pub quantity: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct SweetsResponse {
    pub sweets: Vec<Sweet>,
}

#[derive(Debug, Serialize)]
pub struct SweetResponse {
    pub sweet: Sweet,
}

#[derive(Debug, Serialize)]
pub struct SweetMessageResponse {
    pub sweet: Sweet,
    pub message: &'static str,
}

// =============================================================================
// Public Handlers
// =============================================================================

/// `GET /api/sweets` - whole catalog, newest first.
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Json<SweetsResponse>> {
    let category_id = non_blank(query.category_id);
    let sweets = state.db().sweets().list(category_id.as_deref()).await?;

    Ok(Json(SweetsResponse { sweets }))
}

/// `GET /api/sweets/search`
pub async fn search(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<Json<SweetsResponse>> {
    let filter = SweetFilter {
        name: match query.name {
            Some(name) => validate_search_query(&name)?,
            None => None,
        },
        category_id: non_blank(query.category_id),
        min_price: parse_price_bound("min_price", query.min_price)?,
        max_price: parse_price_bound("max_price", query.max_price)?,
    };

    let sweets = state.db().sweets().search(&filter).await?;

    Ok(Json(SweetsResponse { sweets }))
}

/// `GET /api/sweets/{id}`
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SweetResponse>> {
    let sweet = state.db().sweets().require(&id).await?;

    Ok(Json(SweetResponse { sweet }))
}

fn parse_price_bound(field: &str, raw: Option<String>) -> ApiResult<Option<Money>> {
    match non_blank(raw) {
        None => Ok(None),
        Some(raw) => Money::parse_decimal(&raw)
            .filter(|price| !price.is_negative())
            .map(Some)
            .ok_or_else(|| ApiError::validation(format!("Invalid {field}"))),
    }
}

// =============================================================================
// Admin Handlers
// =============================================================================

/// `POST /api/sweets`
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateSweetRequest>,
) -> ApiResult<(StatusCode, Json<SweetResponse>)> {
    let (Some(name), Some(price), Some(quantity)) = (non_blank(body.name), body.price, body.quantity)
    else {
        return Err(ApiError::validation("Name, price, and quantity are required"));
    };

    debug!(admin_id = %admin.sub, name = %name, "Creating sweet");

    let sweet = state
        .db()
        .sweets()
        .insert(&NewSweet {
            name,
            description: body.description,
            category_id: body.category_id,
            price,
            quantity,
            image_url: body.image_url,
        })
        .await?;

    info!(admin_id = %admin.sub, sweet_id = %sweet.id, "Sweet created");

    Ok((StatusCode::CREATED, Json(SweetResponse { sweet })))
}

/// `PUT /api/sweets/{id}` - partial update.
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateSweetRequest>,
) -> ApiResult<Json<SweetResponse>> {
    debug!(admin_id = %admin.sub, sweet_id = %id, "Updating sweet");

    let update = SweetUpdate {
        name: body.name,
        description: body.description,
        category_id: body.category_id,
        price: body.price,
        quantity: body.quantity,
        image_url: body.image_url,
    };

    let sweet = state.db().sweets().update(&id, &update).await?;

    info!(admin_id = %admin.sub, sweet_id = %id, "Sweet updated");

    Ok(Json(SweetResponse { sweet }))
}

/// `DELETE /api/sweets/{id}`
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.db().sweets().delete(&id).await?;

    info!(admin_id = %admin.sub, sweet_id = %id, "Sweet deleted");

    Ok(Json(MessageResponse {
        message: "Sweet deleted successfully",
    }))
}

/// `POST /api/sweets/{id}/restock`
pub async fn restock(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<RestockRequest>,
) -> ApiResult<Json<SweetMessageResponse>> {
    let quantity = body
        .quantity
        .as_ref()
        .and_then(whole_number)
        .filter(|qty| *qty > 0)
        .ok_or_else(|| ApiError::validation("Valid quantity is required"))?;
    validate_restock_quantity(quantity)?;

    let sweet = state.db().sweets().restock(&id, quantity).await?;

    info!(
        admin_id = %admin.sub,
        sweet_id = %id,
        added = quantity,
        stock = sweet.quantity,
        "Sweet restocked"
    );

    Ok(Json(SweetMessageResponse {
        sweet,
        message: "Restock successful",
    }))
}
