//! # hornada-core: Pure Business Logic for the Hornada Storefront
//!
//! Everything the bakery storefront decides without touching a database or
//! the network: which delivery zone serves an address, whether a product
//! still fits in the cart, what checkout costs, and how payment webhooks move
//! an order along.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Hornada Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Storefront (browser)                         │   │
//! │  │    Map picker ──► Product page ──► Cart drawer ──► Checkout     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 storefront-api (axum)                           │   │
//! │  │    /zones/locate, /carts/{id}/lines, /checkout, /webhooks       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ hornada-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │ geo/zone │ │  ledger  │ │ checkout │ │ payment, money,  │  │   │
//! │  │   │ locate() │ │ stock    │ │ coupons  │ │ validation       │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  hornada-db (SQLite layer)                      │   │
//! │  │        zones, cart snapshots, coupons, orders, migrations       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`geo`] - Coordinates and point-in-polygon
//! - [`zone`] - Delivery zones and `locate`
//! - [`ledger`] - Cart lines with stock ceilings and boxes
//! - [`checkout`] - Coupons, fulfillment and totals
//! - [`payment`] - Payment status transitions
//! - [`money`] - Integer-cents money
//! - [`validation`] - Input rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use hornada_core::ledger::{BundleComponent, CartLedger, LineRequest};
//! use hornada_core::money::Money;
//!
//! let mut cart = CartLedger::new();
//! cart.add_line(LineRequest::new("alfajor", 2, Money::from_cents(250)).with_ceiling(6))
//!     .unwrap();
//! cart.add_line(
//!     LineRequest::new("caja-dulce", 1, Money::from_cents(4500))
//!         .with_bundle(vec![BundleComponent::new("alfajor", 4)]),
//! )
//! .unwrap();
//!
//! // 2 loose + 4 in the box
//! assert_eq!(cart.compute_occupancy("alfajor"), 6);
//!
//! let outcome = cart
//!     .add_line(LineRequest::new("alfajor", 1, Money::from_cents(250)).with_ceiling(6))
//!     .unwrap();
//! assert_eq!(outcome.max_additional(), Some(0));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod geo;
pub mod ledger;
pub mod money;
pub mod payment;
pub mod validation;
pub mod zone;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use checkout::{CheckoutPolicy, CheckoutSummary, Coupon, CouponKind, Fulfillment, Order};
pub use error::{CoreError, CoreResult, ValidationError};
pub use geo::GeoPoint;
pub use ledger::{BundleComponent, CartLedger, CartLine, LineRequest, RejectReason, StockOutcome};
pub use money::Money;
pub use payment::{PaymentStatus, Transition};
pub use zone::{locate, DeliveryZone, ZoneMatch};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines in a single cart.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single line.
///
/// ## Business Reason
/// Catches typos like 100 instead of 10 before they hit stock checks.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum unit price in cents ($1,000,000.00).
///
/// With the line and quantity caps this keeps every cart total far inside
/// `i64`.
pub const MAX_UNIT_PRICE_CENTS: i64 = 100_000_000;
