//! # Checkout
//!
//! Turns a cart, a fulfillment choice and an optional coupon into the amounts
//! the customer pays.
//!
//! ## Composition
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  subtotal  = Σ unit_price × quantity            (CartLedger)            │
//! │  discount  = coupon.discount_for(subtotal)      (≤ subtotal)            │
//! │  shipping  = zone.price                         (Delivery)              │
//! │            = 0                                  (Pickup)                │
//! │            = 0   if subtotal - discount ≥ free-shipping threshold       │
//! │  ─────────────────────────────────────────────────────────              │
//! │  total     = subtotal - discount + shipping                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Checkout never looks up zones or coupons itself. The caller resolves the
//! zone with [`locate`](crate::zone::locate) and loads the coupon, then hands
//! both in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::ledger::{CartLedger, CartLine};
use crate::money::Money;
use crate::payment::PaymentStatus;
use crate::zone::ZoneMatch;

// =============================================================================
// Fulfillment
// =============================================================================

/// How the order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Fulfillment {
    /// Shipped to an address inside a delivery zone.
    Delivery,
    /// Collected at the shop.
    Pickup,
}

impl Fulfillment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Fulfillment::Delivery => "delivery",
            Fulfillment::Pickup => "pickup",
        }
    }

    /// Parses the stored form. Unknown values are `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "delivery" => Some(Fulfillment::Delivery),
            "pickup" => Some(Fulfillment::Pickup),
            _ => None,
        }
    }
}

// =============================================================================
// Coupons
// =============================================================================

/// What a coupon takes off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CouponKind {
    /// Basis points of the subtotal (1000 = 10%).
    Percentage(u32),
    /// Flat amount.
    Fixed(Money),
}

/// A discount code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    /// Normalized (upper-case) code.
    pub code: String,
    pub kind: CouponKind,
    /// Subtotal required before the coupon applies.
    #[serde(default)]
    pub min_subtotal: Money,
    pub active: bool,
    #[ts(type = "string | null")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Why a coupon was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponRejection {
    #[error("coupon is not active")]
    Inactive,

    #[error("coupon has expired")]
    Expired,

    #[error("subtotal must be at least {min_subtotal}")]
    BelowMinimum { min_subtotal: Money },
}

impl Coupon {
    /// Discount this coupon gives on `subtotal` at time `now`.
    ///
    /// The result never exceeds `subtotal`.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::Utc;
    /// use hornada_core::checkout::{Coupon, CouponKind};
    /// use hornada_core::money::Money;
    ///
    /// let coupon = Coupon {
    ///     code: "PAN10".into(),
    ///     kind: CouponKind::Percentage(1000),
    ///     min_subtotal: Money::zero(),
    ///     active: true,
    ///     expires_at: None,
    /// };
    /// let off = coupon.discount_for(Money::from_cents(5000), Utc::now()).unwrap();
    /// assert_eq!(off.cents(), 500);
    /// ```
    pub fn discount_for(
        &self,
        subtotal: Money,
        now: DateTime<Utc>,
    ) -> Result<Money, CouponRejection> {
        if !self.active {
            return Err(CouponRejection::Inactive);
        }

        if self.expires_at.is_some_and(|expiry| now >= expiry) {
            return Err(CouponRejection::Expired);
        }

        if subtotal < self.min_subtotal {
            return Err(CouponRejection::BelowMinimum {
                min_subtotal: self.min_subtotal,
            });
        }

        let raw = match self.kind {
            CouponKind::Percentage(bps) => subtotal.percentage(bps),
            CouponKind::Fixed(amount) => amount,
        };

        Ok(raw.max(Money::zero()).min(subtotal))
    }
}

// =============================================================================
// Store Policy
// =============================================================================

/// Store-wide checkout rules, taken from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPolicy {
    pub pickup_allowed: bool,
    /// Discounted subtotal at or above which delivery is free.
    pub free_shipping_threshold: Option<Money>,
}

impl Default for CheckoutPolicy {
    fn default() -> Self {
        CheckoutPolicy {
            pickup_allowed: true,
            free_shipping_threshold: None,
        }
    }
}

// =============================================================================
// Summary
// =============================================================================

/// Final amounts for a checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSummary {
    pub fulfillment: Fulfillment,
    pub zone: Option<ZoneMatch>,
    pub coupon_code: Option<String>,
    pub item_count: i64,
    pub subtotal: Money,
    pub discount: Money,
    pub shipping: Money,
    pub total: Money,
}

impl CheckoutSummary {
    /// Computes the checkout amounts.
    ///
    /// ## Errors
    /// - `EmptyCart` when the ledger has no lines
    /// - `PickupUnavailable` for pickup when the store disallows it
    /// - `OutsideServiceArea` for delivery with no zone
    /// - `CouponRejected` when the coupon does not apply
    pub fn compose(
        ledger: &CartLedger,
        fulfillment: Fulfillment,
        zone: Option<&ZoneMatch>,
        coupon: Option<&Coupon>,
        policy: &CheckoutPolicy,
        now: DateTime<Utc>,
    ) -> CoreResult<Self> {
        if ledger.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let zone = match fulfillment {
            Fulfillment::Pickup if !policy.pickup_allowed => {
                return Err(CoreError::PickupUnavailable)
            }
            Fulfillment::Pickup => None,
            Fulfillment::Delivery => Some(zone.ok_or(CoreError::OutsideServiceArea)?),
        };

        let subtotal = ledger.subtotal();

        let discount = match coupon {
            Some(coupon) => {
                coupon
                    .discount_for(subtotal, now)
                    .map_err(|rejection| CoreError::CouponRejected {
                        code: coupon.code.clone(),
                        reason: rejection.to_string(),
                    })?
            }
            None => Money::zero(),
        };

        let discounted = subtotal.saturating_sub_to_zero(discount);

        let free_shipping = policy
            .free_shipping_threshold
            .is_some_and(|threshold| discounted >= threshold);

        let shipping = match zone {
            Some(zone) if !free_shipping => zone.price,
            _ => Money::zero(),
        };

        Ok(CheckoutSummary {
            fulfillment,
            zone: zone.cloned(),
            coupon_code: coupon.map(|c| c.code.clone()),
            item_count: ledger.total_item_count(),
            subtotal,
            discount,
            shipping,
            total: discounted + shipping,
        })
    }
}

// =============================================================================
// Order
// =============================================================================

/// A placed order: the cart as it was at checkout plus the amounts charged.
///
/// Lines are a copy, so later catalogue or cart changes never alter history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub cart_id: String,
    pub lines: Vec<CartLine>,
    pub fulfillment: Fulfillment,
    pub zone_id: Option<String>,
    pub coupon_code: Option<String>,
    pub subtotal: Money,
    pub discount: Money,
    pub shipping: Money,
    pub total: Money,
    pub payment_status: PaymentStatus,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Builds a pending order from a checkout summary.
    pub fn place(
        id: impl Into<String>,
        cart_id: impl Into<String>,
        ledger: &CartLedger,
        summary: &CheckoutSummary,
        now: DateTime<Utc>,
    ) -> Self {
        Order {
            id: id.into(),
            cart_id: cart_id.into(),
            lines: ledger.lines().to_vec(),
            fulfillment: summary.fulfillment,
            zone_id: summary.zone.as_ref().map(|z| z.zone_id.clone()),
            coupon_code: summary.coupon_code.clone(),
            subtotal: summary.subtotal,
            discount: summary.discount,
            shipping: summary.shipping,
            total: summary.total,
            payment_status: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
