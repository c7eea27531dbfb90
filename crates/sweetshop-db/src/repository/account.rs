//! # Account Repository
//!
//! Customers (`users`) and admins (`admins`) live in separate tables with the
//! same shape. One repository type serves both, selected by [`AccountKind`].
//!
//! Password hashes are opaque strings here; hashing and verification belong
//! to the API layer.

use chrono::Utc;
use sqlx::SqlitePool;
use sweetshop_core::{Account, AccountKind};
use tracing::debug;

use super::generate_id;
use crate::error::{DbError, DbResult};

/// An account together with its stored password hash.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountRecord {
    #[sqlx(flatten)]
    pub account: Account,
    pub password_hash: String,
}

/// Repository for one kind of account.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
    kind: AccountKind,
}

impl AccountRepository {
    /// Creates a new AccountRepository for `kind`.
    pub fn new(pool: SqlitePool, kind: AccountKind) -> Self {
        AccountRepository { pool, kind }
    }

    fn table(&self) -> &'static str {
        match self.kind {
            AccountKind::User => "users",
            AccountKind::Admin => "admins",
        }
    }

    /// Looks up an account (and its hash) by normalized email.
    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<AccountRecord>> {
        let sql = format!(
            "SELECT id, email, name, created_at, updated_at, password_hash FROM {} WHERE email = ?1",
            self.table()
        );

        let record = sqlx::query_as::<_, AccountRecord>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    /// Gets an account by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Account>> {
        let sql = format!(
            "SELECT id, email, name, created_at, updated_at FROM {} WHERE id = ?1",
            self.table()
        );

        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }

    /// Creates an account.
    ///
    /// ## Arguments
    /// * `email` - Already normalized (trimmed, lower-cased)
    /// * `name` - Display name
    /// * `password_hash` - PHC string produced by the API layer
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Email already registered for this kind
    pub async fn create(&self, email: &str, name: &str, password_hash: &str) -> DbResult<Account> {
        let id = generate_id();
        let now = Utc::now();

        debug!(kind = %self.kind, id = %id, "Creating account");

        let sql = format!(
            "INSERT INTO {} (id, email, name, password_hash, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            self.table()
        );

        sqlx::query(&sql)
            .bind(&id)
            .bind(email)
            .bind(name.trim())
            .bind(password_hash)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::UniqueViolation { .. } => DbError::duplicate("email", email),
                other => other,
            })?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| DbError::not_found(self.kind.label(), &id))
    }

    /// Replaces the stored password hash.
    pub async fn update_password(&self, id: &str, password_hash: &str) -> DbResult<Account> {
        debug!(kind = %self.kind, id = %id, "Updating password");

        let sql = format!(
            "UPDATE {} SET password_hash = ?2, updated_at = ?3 WHERE id = ?1",
            self.table()
        );

        let result = sqlx::query(&sql)
            .bind(id)
            .bind(password_hash)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::UnknownAccount { id: id.to_string() });
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found(self.kind.label(), id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
