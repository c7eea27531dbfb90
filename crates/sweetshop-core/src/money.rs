//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Prices are stored as cents (price_cents INTEGER)                     │
//! │    Totals are computed as cents × quantity                              │
//! │                                                                         │
//! │  The storefront UI still speaks decimal numbers ("price": 3.5), so     │
//! │  the conversion happens exactly once, at the JSON boundary:            │
//! │                                                                         │
//! │    JSON 3.5 ──► Money::from_decimal ──► 350 cents ──► SQLite           │
//! │    SQLite 350 ──► Money ──► Money::to_decimal ──► JSON 3.5             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use sweetshop_core::money::Money;
//!
//! let price = Money::from_cents(350); // $3.50
//! let total = price.checked_multiply_quantity(3).unwrap(); // $10.50
//! assert_eq!(total.cents(), 1050);
//!
//! let parsed = Money::from_decimal(3.5).unwrap();
//! assert_eq!(parsed, price);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// Largest cent amount that survives a round trip through an `f64`.
const MAX_DECIMAL_CENTS: f64 = 9_007_199_254_740_992.0;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Arithmetic stays closed under subtraction; validation
///   rejects negative prices before they reach the database
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serde**: Serializes as the raw cent count. Fields that face the UI
///   opt into the decimal format with `#[serde(with = "money::decimal")]`
///
/// ## Where Money is Used
/// ```text
/// Sweet.price ──► PurchaseQuote.unit_price ──► PurchaseQuote.total
///                                                     │
///                                                     ▼
///                                          Purchase.total_price (frozen)
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(transparent))]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use sweetshop_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a decimal amount (as sent by the UI) into cents.
    ///
    /// Rounds to the nearest cent. Returns `None` for NaN, infinities and
    /// amounts too large to represent exactly.
    ///
    /// ## Example
    /// ```rust
    /// use sweetshop_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal(2.0).unwrap().cents(), 200);
    /// assert_eq!(Money::from_decimal(0.1 + 0.2).unwrap().cents(), 30);
    /// assert!(Money::from_decimal(f64::NAN).is_none());
    /// ```
    pub fn from_decimal(amount: f64) -> Option<Self> {
        if !amount.is_finite() {
            return None;
        }

        let cents = (amount * 100.0).round();
        if cents.abs() > MAX_DECIMAL_CENTS {
            return None;
        }

        Some(Money(cents as i64))
    }

    /// Parses a decimal amount from text (query strings such as `min_price=2.5`).
    ///
    /// ## Example
    /// ```rust
    /// use sweetshop_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal(" 2.5 ").unwrap().cents(), 250);
    /// assert!(Money::parse_decimal("cheap").is_none());
    /// ```
    pub fn parse_decimal(text: &str) -> Option<Self> {
        text.trim().parse::<f64>().ok().and_then(Money::from_decimal)
    }

    /// Returns the amount as a decimal number of major units (for JSON output).
    #[inline]
    pub fn to_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity, returning `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use sweetshop_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299); // $2.99
    /// assert_eq!(unit_price.checked_multiply_quantity(3).unwrap().cents(), 897);
    /// assert!(Money::from_cents(i64::MAX).checked_multiply_quantity(2).is_none());
    /// ```
    #[inline]
    pub fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        self.0.checked_mul(qty).map(Money)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs. The UI formats prices itself.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

// =============================================================================
// Decimal Wire Format
// =============================================================================

/// Serde adapter that writes `Money` as a decimal number (`3.5`) and reads
/// decimal numbers back into cents.
///
/// ## Usage
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use sweetshop_core::money::{self, Money};
///
/// #[derive(Serialize, Deserialize)]
/// struct Line {
///     #[serde(with = "money::decimal")]
///     price: Money,
/// }
///
/// let line: Line = serde_json::from_str(r#"{"price": 3.5}"#).unwrap();
/// assert_eq!(line.price.cents(), 350);
/// assert_eq!(serde_json::to_string(&line).unwrap(), r#"{"price":3.5}"#);
/// ```
pub mod decimal {
    use super::Money;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(money: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(money.to_decimal())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        Money::from_decimal(amount).ok_or_else(|| D::Error::custom("amount is not a valid number"))
    }

    /// Same as [`decimal`](self) for optional amounts.
    pub mod option {
        use super::Money;
        use serde::de::Error as _;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            money: &Option<Money>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match money {
                Some(money) => serializer.serialize_some(&money.to_decimal()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Money>, D::Error> {
            match Option::<f64>::deserialize(deserializer)? {
                Some(amount) => Money::from_decimal(amount)
                    .map(Some)
                    .ok_or_else(|| D::Error::custom("amount is not a valid number")),
                None => Ok(None),
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
