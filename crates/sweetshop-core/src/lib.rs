//! # sweetshop-core: Pure Business Logic for the Sweet Shop
//!
//! This crate holds the domain types and rules of the storefront as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sweet Shop Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Storefront UI  /  Admin inventory UI               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP + JSON (Bearer token)            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/api (axum handlers)                     │   │
//! │  │    list_sweets, purchase_sweet, restock_sweet, login, etc.      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ sweetshop-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ purchase  │  │ validation│  │   │
//! │  │   │  Sweet    │  │   Money   │  │  Quote    │  │   rules   │  │   │
//! │  │   │ Category  │  │  decimal  │  │  stock    │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 sweetshop-db (Database Layer)                   │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Sweet, Category, Purchase, Account)
//! - [`money`] - Money type with integer arithmetic and decimal wire format
//! - [`purchase`] - Stock check and frozen line total for a purchase
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use sweetshop_core::money::Money;
//! use sweetshop_core::purchase::PurchaseQuote;
//!
//! let unit_price = Money::from_cents(200); // $2.00
//! let quote = PurchaseQuote::new("fudge", unit_price, 3, 5).unwrap();
//!
//! assert_eq!(quote.total.cents(), 600);
//! assert_eq!(quote.remaining_stock, 2);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod purchase;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use purchase::PurchaseQuote;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single sweet in one purchase.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_PURCHASE_QUANTITY: i64 = 999;

/// Largest stock increment accepted by a single restock.
pub const MAX_RESTOCK_QUANTITY: i64 = 1_000_000;

/// Minimum password length for customer and admin accounts.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Upper bound on password length (argon2 input stays bounded).
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length of sweet and category names.
pub const MAX_NAME_LENGTH: usize = 200;
