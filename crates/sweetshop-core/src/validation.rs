//! # Validation Module
//!
//! Input validation utilities for the Sweet Shop.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Storefront / admin UI                                        │
//! │  ├── Basic format checks (empty, password length)                      │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler (Rust)                                          │
//! │  ├── Type validation (JSON deserialization)                            │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (price_cents >= 0), CHECK (quantity >= 0)                   │
//! │  ├── UNIQUE email / category name                                      │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use sweetshop_core::validation::{normalize_email, validate_purchase_quantity};
//!
//! assert_eq!(normalize_email("  Ann@Example.COM ").unwrap(), "ann@example.com");
//! assert!(validate_purchase_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{
    MAX_NAME_LENGTH, MAX_PASSWORD_LENGTH, MAX_PURCHASE_QUANTITY, MAX_RESTOCK_QUANTITY,
    MIN_PASSWORD_LENGTH,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a sweet, category or account display name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required("name"));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Trims, lower-cases and sanity-checks an email address.
///
/// ## Rules
/// - Exactly one `@`
/// - Non-empty local part and domain, domain contains a `.`
/// - No whitespace
///
/// ## Returns
/// The normalized address used for storage and lookups.
///
/// ## Example
/// ```rust
/// use sweetshop_core::validation::normalize_email;
///
/// assert!(normalize_email("kid@candy.shop").is_ok());
/// assert!(normalize_email("kid@candy").is_err());
/// assert!(normalize_email("").is_err());
/// ```
pub fn normalize_email(email: &str) -> ValidationResult<String> {
    let email = email.trim().to_lowercase();

    if email.is_empty() {
        return Err(ValidationError::required("email"));
    }

    let invalid = || ValidationError::invalid_format("email", "must be a valid email address");

    if email.len() > 254 || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return Err(invalid()),
    };

    if local.is_empty()
        || domain.is_empty()
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(invalid());
    }

    Ok(email)
}

/// Validates a password before hashing.
///
/// ## Rules
/// - At least 6 characters
/// - At most 128 characters
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::required("password"));
    }

    let length = password.chars().count();

    if length < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LENGTH,
        });
    }

    if length > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong {
            field: "password".to_string(),
            max: MAX_PASSWORD_LENGTH,
        });
    }

    Ok(())
}

/// Validates an image URL. Only the URL is persisted; uploads happen elsewhere.
///
/// ## Rules
/// - Empty strings are rejected (send `null` to clear)
/// - Must be an `http(s)://` URL or a site-relative path starting with `/`
pub fn validate_image_url(url: &str) -> ValidationResult<()> {
    let url = url.trim();

    if url.is_empty() {
        return Err(ValidationError::required("image_url"));
    }

    if url.len() > 2048 {
        return Err(ValidationError::TooLong {
            field: "image_url".to_string(),
            max: 2048,
        });
    }

    if !(url.starts_with("http://") || url.starts_with("https://") || url.starts_with('/')) {
        return Err(ValidationError::invalid_format(
            "image_url",
            "must be an http(s) URL or an absolute path",
        ));
    }

    Ok(())
}

/// Validates a free-text name search.
///
/// ## Returns
/// The trimmed query, or `None` if it is blank.
pub fn validate_search_query(query: &str) -> ValidationResult<Option<String>> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 100,
        });
    }

    if query.is_empty() {
        Ok(None)
    } else {
        Ok(Some(query.to_string()))
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates the quantity of a single purchase.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_PURCHASE_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Storefront: Buy                                                       │
/// │                                                                         │
/// │  Customer enters quantity: 3                                           │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_purchase_quantity(3) ← THIS FUNCTION                         │
/// │       │                                                                 │
/// │       ├── qty <= 0?  → 400 "quantity must be positive"                 │
/// │       ├── qty > 999? → 400 "quantity must be between 1 and 999"        │
/// │       └── OK → conditional stock decrement                             │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_purchase_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_PURCHASE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_PURCHASE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a restock increment.
///
/// ## Rules
/// - Must be positive (> 0); restock never decreases stock
/// - At most MAX_RESTOCK_QUANTITY per call
pub fn validate_restock_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_RESTOCK_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_RESTOCK_QUANTITY,
        });
    }

    Ok(())
}

/// Validates an absolute stock level (create/update).
pub fn validate_stock_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a unit price. Zero is allowed (free samples).
///
/// ## Example
/// ```rust
/// use sweetshop_core::money::Money;
/// use sweetshop_core::validation::validate_price;
///
/// assert!(validate_price(Money::from_cents(199)).is_ok());
/// assert!(validate_price(Money::from_cents(0)).is_ok());
/// assert!(validate_price(Money::from_cents(-1)).is_err());
/// ```
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Chocolate Truffle").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"A".repeat(201)).is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email(" Sugar@Plum.Fairy ").unwrap(),
            "sugar@plum.fairy"
        );
        assert!(normalize_email("no-at-sign.com").is_err());
        assert!(normalize_email("two@@signs.com").is_err());
        assert!(normalize_email("@candy.shop").is_err());
        assert!(normalize_email("kid@.shop").is_err());
        assert!(normalize_email("kid @candy.shop").is_err());
        assert_eq!(
            normalize_email("   ").unwrap_err(),
            ValidationError::required("email")
        );
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("12345").is_err());
        assert!(validate_password("").is_err());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_validate_image_url() {
        assert!(validate_image_url("https://cdn.example.com/fudge.png").is_ok());
        assert!(validate_image_url("/images/fudge.png").is_ok());
        assert!(validate_image_url("javascript:alert(1)").is_err());
        assert!(validate_image_url("").is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  choc ").unwrap().as_deref(), Some("choc"));
        assert_eq!(validate_search_query("   ").unwrap(), None);
        assert!(validate_search_query(&"q".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_purchase_quantity() {
        assert!(validate_purchase_quantity(1).is_ok());
        assert!(validate_purchase_quantity(999).is_ok());

        assert!(validate_purchase_quantity(0).is_err());
        assert!(validate_purchase_quantity(-1).is_err());
        assert!(validate_purchase_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_restock_quantity() {
        assert!(validate_restock_quantity(10).is_ok());
        assert!(validate_restock_quantity(0).is_err());
        assert!(validate_restock_quantity(-5).is_err());
        assert!(validate_restock_quantity(MAX_RESTOCK_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_stock_quantity() {
        assert!(validate_stock_quantity(0).is_ok());
        assert!(validate_stock_quantity(-1).is_err());
    }
}
