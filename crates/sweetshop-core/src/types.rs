//! # Domain Types
//!
//! Core domain types used throughout the Sweet Shop.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Category     │   │      Sweet      │   │    Purchase     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  category_id?   │◄──│  sweet_id       │       │
//! │  │  name           │   │  name           │   │  user_id        │       │
//! │  │  description?   │   │  price (Money)  │   │  quantity       │       │
//! │  │  image_url?     │   │  quantity ≥ 0   │   │  total_price    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │    Account      │   │   AccountKind   │  Customers and admins live  │
//! │  │  ─────────────  │   │  ─────────────  │  in separate tables and     │
//! │  │  id, email      │   │  User           │  receive separate tokens    │
//! │  │  name           │   │  Admin          │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## JSON Shape
//! These types serialize exactly as the storefront UI reads them: snake_case
//! fields, decimal `price`/`total_price`, embedded `category`/`sweet` objects
//! (or `null`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::{self, Money};
use crate::validation::{
    validate_image_url, validate_name, validate_price, validate_stock_quantity, ValidationResult,
};

// =============================================================================
// Accounts
// =============================================================================

/// The two disjoint principal kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// A customer of the storefront.
    User,
    /// A member of staff using the inventory console.
    Admin,
}

impl AccountKind {
    /// Wire name (`"user"` / `"admin"`), used in tokens and auth responses.
    pub const fn as_str(&self) -> &'static str {
        match self {
            AccountKind::User => "user",
            AccountKind::Admin => "admin",
        }
    }

    /// Capitalised name for user-facing messages ("User already exists").
    pub const fn label(&self) -> &'static str {
        match self {
            AccountKind::User => "User",
            AccountKind::Admin => "Admin",
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer or admin account, without its credential hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Account {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Login email, stored trimmed and lower-cased.
    pub email: String,

    /// Display name.
    pub name: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Category
// =============================================================================

/// A grouping of sweets ("Chocolate", "Gummies", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, unique across categories.
    pub name: String,

    pub description: Option<String>,

    pub image_url: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Fields for creating a category.
#[derive(Debug, Clone, Default)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl NewCategory {
    /// Checks name and image URL rules.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_name(&self.name)?;
        if let Some(url) = &self.image_url {
            validate_image_url(url)?;
        }
        Ok(())
    }
}

/// Partial category update. `None` leaves a column untouched;
/// `Some(None)` clears a nullable column.
#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub image_url: Option<Option<String>>,
}

impl CategoryUpdate {
    /// Returns true if no column would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.image_url.is_none()
    }

    /// Validates only the fields that are present.
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(Some(url)) = &self.image_url {
            validate_image_url(url)?;
        }
        Ok(())
    }
}

// =============================================================================
// Sweet
// =============================================================================

/// A product for sale.
///
/// ## Invariants
/// - `price` is never negative
/// - `quantity` is never negative (enforced here and by a CHECK constraint)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sweet {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub name: String,

    pub description: Option<String>,

    pub category_id: Option<String>,

    /// Unit price, serialized as a decimal number.
    #[serde(with = "money::decimal")]
    #[ts(type = "number")]
    pub price: Money,

    /// Units in stock.
    pub quantity: i64,

    pub image_url: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    /// The referenced category, embedded for listing screens.
    pub category: Option<Category>,
}

/// Fields for creating a sweet.
#[derive(Debug, Clone)]
pub struct NewSweet {
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub price: Money,
    pub quantity: i64,
    pub image_url: Option<String>,
}

impl NewSweet {
    /// Checks name, price, stock and image URL rules.
    ///
    /// ## Example
    /// ```rust
    /// use sweetshop_core::{Money, NewSweet};
    ///
    /// let sweet = NewSweet {
    ///     name: "Fudge".to_string(),
    ///     description: None,
    ///     category_id: None,
    ///     price: Money::from_cents(350),
    ///     quantity: 0,
    ///     image_url: None,
    /// };
    /// assert!(sweet.validate().is_ok());
    /// ```
    pub fn validate(&self) -> ValidationResult<()> {
        validate_name(&self.name)?;
        validate_price(self.price)?;
        validate_stock_quantity(self.quantity)?;
        if let Some(url) = &self.image_url {
            validate_image_url(url)?;
        }
        Ok(())
    }
}

/// Partial sweet update.
///
/// Only fields that are `Some` are written, so an edit in the admin console
/// never overwrites a stock change that happened concurrently unless the
/// admin explicitly sent `quantity`.
#[derive(Debug, Clone, Default)]
pub struct SweetUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub category_id: Option<Option<String>>,
    pub price: Option<Money>,
    pub quantity: Option<i64>,
    pub image_url: Option<Option<String>>,
}

impl SweetUpdate {
    /// Returns true if no column would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.category_id.is_none()
            && self.price.is_none()
            && self.quantity.is_none()
            && self.image_url.is_none()
    }

    /// Validates only the fields that are present.
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        if let Some(quantity) = self.quantity {
            validate_stock_quantity(quantity)?;
        }
        if let Some(Some(url)) = &self.image_url {
            validate_image_url(url)?;
        }
        Ok(())
    }
}

/// Catalog search filters. Every filter is optional and they combine with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweetFilter {
    /// Case-insensitive substring of the sweet name.
    pub name: Option<String>,
    pub category_id: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<Money>,
    /// Inclusive upper price bound.
    pub max_price: Option<Money>,
}

impl SweetFilter {
    /// Rejects an inverted price range.
    pub fn validate(&self) -> ValidationResult<()> {
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err(ValidationError::invalid_format(
                    "min_price",
                    "must not exceed max_price",
                ));
            }
        }
        Ok(())
    }

    /// Whether `name` passes the name filter. Case folding is full Unicode
    /// (`"CRÈME"` finds `"Crème Brûlée"`); a missing or blank filter passes
    /// everything.
    pub fn matches_name(&self, name: &str) -> bool {
        match self.name.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(needle) => name.to_lowercase().contains(&needle.to_lowercase()),
        }
    }
}

// =============================================================================
// Purchase
// =============================================================================

/// A completed purchase. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Purchase {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// The customer who bought.
    pub user_id: String,

    /// The sweet bought. Kept even if the sweet is later deleted.
    pub sweet_id: String,

    pub quantity: i64,

    /// Unit price × quantity, captured at purchase time.
    #[serde(with = "money::decimal")]
    #[ts(type = "number")]
    pub total_price: Money,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// The sweet as it currently stands, or `null` if it was deleted.
    pub sweet: Option<Sweet>,
}

// =============================================================================
// Unit Tests
// =============================================================================
