//! Domain errors.
//!
//! `ValidationError` rejects bad input before anything touches storage;
//! `CoreError` adds the rules that need state (stock, totals). Both pass
//! upward unchanged:
//!
//! ```text
//! ValidationError ──► CoreError ──► DbError::Domain ──► ApiError (400)
//! ```

use thiserror::Error;

/// Purchase-time rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The shelf holds fewer units than requested. Nothing was written.
    #[error("Insufficient stock for {sweet_id}: available {available}, requested {requested}")]
    InsufficientStock {
        sweet_id: String,
        available: i64,
        requested: i64,
    },

    /// Line total does not fit in the money representation.
    #[error("Total for {quantity} units overflows")]
    TotalOverflow { quantity: i64 },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// A field of a request body or query failed a rule.
///
/// The `Display` text goes to the client verbatim as `{ "error": ... }`, so it
/// names the field the way the UI sends it (`price`, `quantity`, `email`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    /// Passwords below the minimum length.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Names, passwords and URLs above their limits.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Purchase and restock quantities outside their accepted window.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Price or stock below zero.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Malformed email, image URL, or an inverted price range.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Shorthand for [`ValidationError::InvalidFormat`].
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
