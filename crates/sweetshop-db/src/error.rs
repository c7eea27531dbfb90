//! Errors raised by the repositories.
//!
//! SQLite reports every constraint failure as a generic database error with a
//! message. `From<sqlx::Error>` reads that message so callers can tell a taken
//! email (409) from a dangling category (400) from a real outage (500):
//!
//! ```text
//! "UNIQUE constraint failed: users.email"  ──► UniqueViolation { field: "users.email" }
//! "FOREIGN KEY constraint failed"          ──► ForeignKeyViolation
//!   (on purchases.user_id, purchase.rs)    ──► UnknownAccount
//! "CHECK constraint failed: quantity >= 0" ──► CheckViolation
//! CoreError (stock, quantity rules)        ──► Domain
//! anything else                            ──► Query / Internal
//! ```

use sweetshop_core::{CoreError, ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// No row with that id, including UPDATE/DELETE that matched nothing.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Taken email within one account table, or a repeated category name.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// `category_id` naming a category that does not exist.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A token outlived its account row: a purchase or password change
    /// addressed a user or admin id that is gone.
    #[error("Account no longer exists: {id}")]
    UnknownAccount { id: String },

    /// Negative price, stock or total reached the table.
    #[error("Check constraint violated: {message}")]
    CheckViolation { message: String },

    #[error(transparent)]
    Domain(#[from] CoreError),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Every pooled connection stayed busy past the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    fn from_sqlite_message(message: &str) -> Self {
        if let Some(column) = message.strip_prefix("UNIQUE constraint failed: ") {
            return DbError::duplicate(column, "?");
        }

        let message = message.to_string();
        if message.contains("FOREIGN KEY constraint failed") {
            DbError::ForeignKeyViolation { message }
        } else if message.contains("CHECK constraint failed") {
            DbError::CheckViolation { message }
        } else {
            DbError::Query(message)
        }
    }
}

impl From<ValidationError> for DbError {
    fn from(err: ValidationError) -> Self {
        DbError::Domain(err.into())
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Row", "?"),
            sqlx::Error::Database(db_err) => DbError::from_sqlite_message(db_err.message()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
