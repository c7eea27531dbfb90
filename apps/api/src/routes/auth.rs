//! Account routes: customer registration/login, admin setup/login, and
//! customer password change.
//!
//! Every success returns the same envelope, keyed by account kind:
//!
//! ```text
//! { "user":  { id, email, name, ... }, "token": "<jwt>", "type": "user"  }
//! { "admin": { id, email, name, ... }, "token": "<jwt>", "type": "admin" }
//! ```

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use sweetshop_core::validation::{normalize_email, validate_name, validate_password};
use sweetshop_core::{Account, AccountKind};
use sweetshop_db::DbError;
use tracing::{debug, info, warn};

use super::non_blank;
use crate::auth::{hash_password, verify_password};
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, RequireUser};
use crate::state::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    pub password: Option<String>,
}

/// The account under its kind's key (`user` or `admin`).
#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountEntry {
    User(Account),
    Admin(Account),
}

impl AccountEntry {
    fn new(kind: AccountKind, account: Account) -> Self {
        match kind {
            AccountKind::User => AccountEntry::User(account),
            AccountKind::Admin => AccountEntry::Admin(account),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub account: AccountEntry,
    pub token: String,
    #[serde(rename = "type")]
    pub kind: AccountKind,
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /api/auth/user/register`
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SignupRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    signup(&state, AccountKind::User, body).await
}

/// `POST /api/auth/admin/setup`
pub async fn admin_setup(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SignupRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    signup(&state, AccountKind::Admin, body).await
}

/// `POST /api/auth/user/login`
pub async fn user_login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    login(&state, AccountKind::User, body).await
}

/// `POST /api/auth/admin/login`
pub async fn admin_login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    login(&state, AccountKind::Admin, body).await
}

/// `POST /api/auth/user/update-password`
///
/// Changes the password of the account named by the bearer token and returns
/// a fresh token.
pub async fn update_password(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UpdatePasswordRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let password = body
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::validation("Password is required"))?;
    validate_password(&password)?;

    let password_hash = hash_password(&password)?;
    let account = state
        .db()
        .accounts(AccountKind::User)
        .update_password(&user.sub, &password_hash)
        .await?;

    info!(user_id = %account.id, "Password updated");

    respond(&state, AccountKind::User, account).map(Json)
}

// =============================================================================
// Shared Flows
// =============================================================================

async fn signup(
    state: &AppState,
    kind: AccountKind,
    body: SignupRequest,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let (Some(email), Some(password), Some(name)) = (
        non_blank(body.email),
        body.password.filter(|p| !p.is_empty()),
        non_blank(body.name),
    ) else {
        return Err(ApiError::validation("Email, password, and name are required"));
    };

    let email = normalize_email(&email)?;
    validate_password(&password)?;
    validate_name(&name)?;

    let accounts = state.db().accounts(kind);
    let already_exists = || ApiError::Conflict(format!("{} already exists", kind.label()));

    if accounts.find_by_email(&email).await?.is_some() {
        debug!(kind = %kind, "Signup rejected: email taken");
        return Err(already_exists());
    }

    let password_hash = hash_password(&password)?;
    let account = accounts
        .create(&email, &name, &password_hash)
        .await
        .map_err(|e| match e {
            DbError::UniqueViolation { .. } => already_exists(),
            other => other.into(),
        })?;

    info!(kind = %kind, account_id = %account.id, "Account created");

    let response = respond(state, kind, account)?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn login(state: &AppState, kind: AccountKind, body: LoginRequest) -> ApiResult<Json<AuthResponse>> {
    let (Some(email), Some(password)) = (
        non_blank(body.email),
        body.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::validation("Email and password are required"));
    };

    let invalid = || ApiError::unauthorized("Invalid credentials");

    // A malformed address cannot match a stored one
    let email = normalize_email(&email).map_err(|_| invalid())?;

    let Some(record) = state.db().accounts(kind).find_by_email(&email).await? else {
        warn!(kind = %kind, "Login failed: unknown email");
        return Err(invalid());
    };

    if !verify_password(&password, &record.password_hash) {
        warn!(kind = %kind, account_id = %record.account.id, "Login failed: wrong password");
        return Err(invalid());
    }

    info!(kind = %kind, account_id = %record.account.id, "Login succeeded");

    respond(state, kind, record.account).map(Json)
}

fn respond(state: &AppState, kind: AccountKind, account: Account) -> ApiResult<AuthResponse> {
    let token = state.jwt().generate_token(&account, kind)?;

    Ok(AuthResponse {
        account: AccountEntry::new(kind, account),
        token,
        kind,
    })
}
