//! # Validation Module
//!
//! Input validation for values arriving from the storefront.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Storefront (TypeScript)                                      │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler (Rust)                                          │
//! │  ├── JSON shape (deserialization)                                      │
//! │  └── THIS MODULE: value rules                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: CartLedger                                                   │
//! │  └── Stock ceilings (outcomes, not errors)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::geo::GeoPoint;
use crate::{MAX_ITEM_QUANTITY, MAX_UNIT_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_PRODUCT_ID_LEN: usize = 64;
const MAX_COUPON_CODE_LEN: usize = 32;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product identifier.
///
/// ## Rules
/// - Must not be empty or whitespace
/// - At most 64 characters
///
/// ```rust
/// use hornada_core::validation::validate_product_id;
///
/// assert!(validate_product_id("medialuna").is_ok());
/// assert!(validate_product_id("  ").is_err());
/// ```
pub fn validate_product_id(id: &str) -> ValidationResult<()> {
    let id = id.trim();

    if id.is_empty() {
        return Err(ValidationError::Required {
            field: "product_id".to_string(),
        });
    }

    if id.len() > MAX_PRODUCT_ID_LEN {
        return Err(ValidationError::TooLong {
            field: "product_id".to_string(),
            max: MAX_PRODUCT_ID_LEN,
        });
    }

    Ok(())
}

/// Validates and normalizes a coupon code.
///
/// ## Returns
/// The trimmed, upper-cased code.
///
/// ```rust
/// use hornada_core::validation::validate_coupon_code;
///
/// assert_eq!(validate_coupon_code(" pan10 ").unwrap(), "PAN10");
/// assert!(validate_coupon_code("no spaces").is_err());
/// ```
pub fn validate_coupon_code(code: &str) -> ValidationResult<String> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "coupon_code".to_string(),
        });
    }

    if code.len() > MAX_COUPON_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "coupon_code".to_string(),
            max: MAX_COUPON_CODE_LEN,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "coupon_code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(code.to_ascii_uppercase())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a requested line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates how many units of a component one box consumes.
pub fn validate_units_per_bundle(units: i64) -> ValidationResult<()> {
    if units <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "units_per_bundle".to_string(),
        });
    }

    if units > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "units_per_bundle".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents. Zero is allowed (free samples).
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_UNIT_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_UNIT_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a coordinate received from the map picker.
///
/// Zone lookup itself tolerates garbage (it simply misses); this check
/// exists so the API can tell the user their pin is invalid.
pub fn validate_coordinates(point: GeoPoint) -> ValidationResult<()> {
    if !point.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "coordinates".to_string(),
            reason: "must be finite numbers".to_string(),
        });
    }

    if !(-90.0..=90.0).contains(&point.lat) {
        return Err(ValidationError::OutOfRange {
            field: "lat".to_string(),
            min: -90,
            max: 90,
        });
    }

    if !(-180.0..=180.0).contains(&point.lng) {
        return Err(ValidationError::OutOfRange {
            field: "lng".to_string(),
            min: -180,
            max: 180,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a cart identifier (UUID issued by the storefront).
///
/// ```rust
/// use hornada_core::validation::validate_cart_id;
///
/// assert!(validate_cart_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_cart_id("not-a-uuid").is_err());
/// ```
pub fn validate_cart_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "cart_id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "cart_id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product_id() {
        assert!(validate_product_id("medialuna").is_ok());
        assert!(validate_product_id("box-12").is_ok());

        assert!(validate_product_id("").is_err());
        assert!(validate_product_id("   ").is_err());
        assert!(validate_product_id(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_units_per_bundle() {
        assert!(validate_units_per_bundle(2).is_ok());
        assert!(validate_units_per_bundle(0).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(1099).is_ok());
        assert!(validate_price_cents(-100).is_err());
        assert!(validate_price_cents(MAX_UNIT_PRICE_CENTS).is_ok());
        assert!(validate_price_cents(MAX_UNIT_PRICE_CENTS + 1).is_err());
        assert!(validate_price_cents(i64::MAX / 2 + 1).is_err());
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(GeoPoint::new(-34.6, -58.4)).is_ok());
        assert!(validate_coordinates(GeoPoint::new(91.0, 0.0)).is_err());
        assert!(validate_coordinates(GeoPoint::new(0.0, -181.0)).is_err());
        assert!(validate_coordinates(GeoPoint::new(f64::NAN, 0.0)).is_err());
    }

    #[test]
    fn test_validate_coupon_code() {
        assert_eq!(validate_coupon_code("bienvenida").unwrap(), "BIENVENIDA");
        assert!(validate_coupon_code("").is_err());
        assert!(validate_coupon_code("50%OFF").is_err());
        assert!(validate_coupon_code(&"A".repeat(33)).is_err());
    }

    #[test]
    fn test_validate_cart_id() {
        assert!(validate_cart_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_cart_id("").is_err());
        assert!(validate_cart_id("123").is_err());
    }
}
