//! # Sweet Shop API
//!
//! JSON HTTP server for the storefront and the inventory console.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          API Layers                                     │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  Middleware    │  │  Extractors    │  │  Routes                    ││
//! │  │                │  │                │  │                            ││
//! │  │ • TraceLayer   │─►│ • RequireUser  │─►│ • sweets / categories      ││
//! │  │ • CorsLayer    │  │ • RequireAdmin │  │ • purchases                ││
//! │  │                │  │ • ApiJson      │  │ • auth / health            ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                  │                      │
//! │  ┌───────────────────────────────────────────────▼──────────────────┐  │
//! │  │                      Infrastructure                               │  │
//! │  │                                                                   │  │
//! │  │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────────────┐│  │
//! │  │  │ sweetshop-db │  │ sweetshop-   │  │    JWT + argon2          ││  │
//! │  │  │              │  │ core         │  │                          ││  │
//! │  │  │ SQLite, WAL  │  │ Money, rules │  │ Bearer tokens, hashes    ││  │
//! │  │  └──────────────┘  └──────────────┘  └──────────────────────────┘│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `HTTP_PORT` - Listen port (default: 3000)
//! - `BIND_ADDR` - Listen address (default: 0.0.0.0)
//! - `DATABASE_PATH` - SQLite file (default: ./sweetshop.db)
//! - `DB_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `JWT_SECRET` - Secret for JWT signing
//! - `JWT_LIFETIME_SECS` - Token lifetime (default: 604800)

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// Re-exports
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use state::AppState;

/// Builds the full application: every route under `/api`, request tracing,
/// and permissive CORS for the browser UI.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
