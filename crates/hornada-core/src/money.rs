//! # Money Module
//!
//! Provides the `Money` type for prices, shipping fees and discounts.
//!
//! ## Integer Cents Only
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Where Money flows in the storefront                                    │
//! │                                                                         │
//! │  CartLine.unit_price ──► × quantity ──► CartLedger.subtotal             │
//! │                                               │                         │
//! │  Coupon ─────────────────► discount ──────────┤                         │
//! │                                               │                         │
//! │  DeliveryZone.price ─────► shipping ──────────┴──► CheckoutSummary.total│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use hornada_core::money::Money;
//!
//! let croissant = Money::from_cents(350);
//! let line = croissant.multiply_quantity(4);
//! assert_eq!(line.cents(), 1400);
//! assert_eq!(line.to_string(), "$14.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

/// A monetary value in the smallest currency unit (cents).
///
/// Serialized as a bare integer so stored cart snapshots stay compact.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (whole currency) portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a quantity, saturating at the `i64` bounds.
    ///
    /// ```rust
    /// use hornada_core::money::Money;
    ///
    /// let baguette = Money::from_cents(275);
    /// assert_eq!(baguette.multiply_quantity(3).cents(), 825);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Returns `bps` basis points of this amount, rounded half up.
    ///
    /// ```rust
    /// use hornada_core::money::Money;
    ///
    /// // 15% of $12.99 = $1.9485 → $1.95
    /// assert_eq!(Money::from_cents(1299).percentage(1500).cents(), 195);
    /// ```
    pub fn percentage(&self, bps: u32) -> Money {
        // i128 keeps large carts from overflowing during the multiply
        let part = (self.0 as i128 * bps as i128 + 5000) / 10000;
        Money(part.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }

    /// Applies a percentage discount given in basis points.
    ///
    /// ```rust
    /// use hornada_core::money::Money;
    ///
    /// // 10% off $45.00
    /// assert_eq!(Money::from_cents(4500).apply_percentage_discount(1000).cents(), 4050);
    /// ```
    pub fn apply_percentage_discount(&self, bps: u32) -> Money {
        *self - self.percentage(bps)
    }

    /// Subtracts `other`, flooring the result at zero.
    #[inline]
    pub fn saturating_sub_to_zero(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0).max(0))
    }
}

// Arithmetic saturates at the i64 bounds; it never panics or wraps.

/// Debug-grade formatting. The storefront formats for display itself.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
