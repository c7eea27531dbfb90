//! Category routes. Listing is public; changes need an admin token.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use sweetshop_core::{Category, CategoryUpdate, NewCategory};
use tracing::info;

use super::{double_option, non_blank, MessageResponse};
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, RequireAdmin};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub image_url: Option<Option<String>>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub category: Category,
}

/// `GET /api/categories` - ordered by name.
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<CategoriesResponse>> {
    let categories = state.db().categories().list().await?;

    Ok(Json(CategoriesResponse { categories }))
}

/// `POST /api/categories`
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<CategoryResponse>)> {
    let name = non_blank(body.name).ok_or_else(|| ApiError::validation("Name is required"))?;

    let category = state
        .db()
        .categories()
        .insert(&NewCategory {
            name,
            description: body.description,
            image_url: body.image_url,
        })
        .await?;

    info!(admin_id = %admin.sub, category_id = %category.id, "Category created");

    Ok((StatusCode::CREATED, Json(CategoryResponse { category })))
}

/// `PUT /api/categories/{id}` - partial update.
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateCategoryRequest>,
) -> ApiResult<Json<CategoryResponse>> {
    let update = CategoryUpdate {
        name: body.name,
        description: body.description,
        image_url: body.image_url,
    };

    let category = state.db().categories().update(&id, &update).await?;

    info!(admin_id = %admin.sub, category_id = %id, "Category updated");

    Ok(Json(CategoryResponse { category }))
}

/// `DELETE /api/categories/{id}` - sweets in it become uncategorised.
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.db().categories().delete(&id).await?;

    info!(admin_id = %admin.sub, category_id = %id, "Category deleted");

    Ok(Json(MessageResponse {
        message: "Category deleted successfully",
    }))
}
