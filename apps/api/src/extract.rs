//! Request extractors.
//!
//! Authentication is an extractor, not a middleware: a handler that takes
//! [`RequireUser`] or [`RequireAdmin`] cannot run without a verified token of
//! the right kind.
//!
//! | Request                              | Result |
//! |--------------------------------------|--------|
//! | no `Authorization` header            | 401    |
//! | header is not `Bearer <token>`       | 401    |
//! | bad signature / expired token        | 401    |
//! | valid token, wrong account kind      | 403    |
//!
//! # Example
//!
//! ```rust,ignore
//! async fn restock(
//!     RequireAdmin(admin): RequireAdmin,
//!     State(state): State<AppState>,
//! ) -> ApiResult<Json<SweetMessage>> {
//!     ...
//! }
//! ```

use axum::extract::{FromRequest, FromRequestParts, Query};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::Json;
use sweetshop_core::AccountKind;

use crate::auth::{extract_bearer_token, Claims};
use crate::error::ApiError;
use crate::state::AppState;

/// Extractor that requires a customer token.
#[derive(Debug, Clone)]
pub struct RequireUser(pub Claims);

/// Extractor that requires an admin token.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub Claims);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authorize(parts, state, AccountKind::User).map(Self)
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authorize(parts, state, AccountKind::Admin).map(Self)
    }
}

fn authorize(parts: &Parts, state: &AppState, required: AccountKind) -> Result<Claims, ApiError> {
    let token = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(extract_bearer_token)
        .ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

    let claims = state.jwt().validate_token(token)?;

    if claims.kind != required {
        return Err(ApiError::forbidden(format!(
            "{} access required",
            required.label()
        )));
    }

    Ok(claims)
}

/// `Json` whose rejection is an [`ApiError`] (`{ "error": ... }` body).
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `Query` whose rejection is an [`ApiError`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
