//! Application state shared across handlers.

use std::sync::Arc;

use sweetshop_db::Database;

use crate::auth::JwtManager;
use crate::config::ApiConfig;

/// Application state shared across all handlers.
///
/// Cloned per request by axum; everything behind it is reference-counted.
#[derive(Debug, Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

#[derive(Debug)]
struct AppStateInner {
    db: Database,
    jwt: JwtManager,
}

impl AppState {
    /// Builds the state; the config is only needed for token signing.
    pub fn new(config: &ApiConfig, db: Database) -> Self {
        let jwt = JwtManager::new(&config.jwt_secret, config.jwt_lifetime_secs);

        Self {
            inner: Arc::new(AppStateInner { db, jwt }),
        }
    }

    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    pub fn jwt(&self) -> &JwtManager {
        &self.inner.jwt
    }
}
