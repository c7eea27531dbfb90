//! # Purchase Module
//!
//! The pure half of the purchase flow: is there enough stock, and what does
//! the customer pay. The database layer performs the atomic decrement and
//! calls into this module to freeze the total.
//!
//! ## Purchase Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /api/sweets/{id}/purchase  { quantity: 3 }                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_purchase_quantity(3)                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                 │
//! │  UPDATE sweets SET quantity = quantity - 3                             │
//! │   WHERE id = ? AND quantity >= 3                                       │
//! │   RETURNING price_cents, quantity                                      │
//! │       │                                                                 │
//! │       ├── no row → InsufficientStock / NotFound, ROLLBACK              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PurchaseQuote::new(...) ← THIS MODULE (unit price × qty)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT INTO purchases (..., total_price_cents)                        │
//! │  COMMIT                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::validation::validate_purchase_quantity;

/// The priced outcome of buying `quantity` units of one sweet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseQuote {
    /// Price per unit at the moment of purchase.
    pub unit_price: Money,

    pub quantity: i64,

    /// `unit_price × quantity`. This is what gets stored on the purchase.
    pub total: Money,

    /// Stock left after the purchase.
    pub remaining_stock: i64,
}

impl PurchaseQuote {
    /// Prices a purchase against a known stock level.
    ///
    /// ## Errors
    /// - `Validation` if `quantity` is not within 1..=999
    /// - `InsufficientStock` if `available < quantity` (no partial fills)
    /// - `TotalOverflow` if the total cannot be represented
    ///
    /// ## Example
    /// ```rust
    /// use sweetshop_core::{CoreError, Money, PurchaseQuote};
    ///
    /// let quote = PurchaseQuote::new("fudge", Money::from_cents(200), 3, 5).unwrap();
    /// assert_eq!(quote.total.cents(), 600);
    /// assert_eq!(quote.remaining_stock, 2);
    ///
    /// let err = PurchaseQuote::new("fudge", Money::from_cents(200), 3, 2).unwrap_err();
    /// assert!(matches!(err, CoreError::InsufficientStock { available: 2, .. }));
    /// ```
    pub fn new(
        sweet_id: &str,
        unit_price: Money,
        quantity: i64,
        available: i64,
    ) -> CoreResult<Self> {
        validate_purchase_quantity(quantity)?;
        check_stock(sweet_id, available, quantity)?;

        let total = unit_price
            .checked_multiply_quantity(quantity)
            .ok_or(CoreError::TotalOverflow { quantity })?;

        Ok(PurchaseQuote {
            unit_price,
            quantity,
            total,
            remaining_stock: available - quantity,
        })
    }
}

/// Fails with `InsufficientStock` unless `available >= requested`.
pub fn check_stock(sweet_id: &str, available: i64, requested: i64) -> CoreResult<()> {
    if available < requested {
        return Err(CoreError::InsufficientStock {
            sweet_id: sweet_id.to_string(),
            available,
            requested,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
