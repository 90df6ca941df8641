//! # Error Types
//!
//! Domain-specific error types for hornada-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  hornada-core errors (this file)                                       │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  hornada-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  storefront-api errors (in app)                                        │
//! │  └── ApiError         - What the storefront sees (serialized)          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Frontend     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What Is NOT An Error
//! A point outside every delivery zone and a stock ceiling rejection are
//! normal outcomes. They are returned as `Option<ZoneMatch>` and
//! [`StockOutcome`](crate::ledger::StockOutcome), never through this module.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A persisted cart snapshot could not be parsed at all.
    ///
    /// ## Recovery
    /// Discard the stored payload and start from an empty ledger.
    /// Never patch partial data back together.
    #[error("Cart snapshot is corrupt: {0}")]
    CorruptSnapshot(String),

    /// Cart could not be serialized.
    #[error("Cart snapshot could not be written: {0}")]
    SnapshotWrite(String),

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Line quantity would exceed the per-line maximum.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Checkout was requested on an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Delivery requested for a point outside every active zone.
    #[error("Address is outside the delivery area")]
    OutsideServiceArea,

    /// Store pickup is disabled in configuration.
    #[error("Store pickup is not available")]
    PickupUnavailable,

    /// Coupon could not be applied.
    #[error("Coupon {code} cannot be applied: {reason}")]
    CouponRejected { code: String, reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, non-finite coordinate).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
