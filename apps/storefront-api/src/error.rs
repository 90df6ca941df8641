//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Storefront API                     │
//! │                                                                         │
//! │  Handler returns Result<Json<T>, ApiError>                              │
//! │         │                                                               │
//! │         ├── DbError ──────────┐                                         │
//! │         ├── CoreError ────────┼──► ApiError { code, message }           │
//! │         └── ValidationError ──┘          │                              │
//! │                                          ▼                              │
//! │                               HTTP status + JSON body                   │
//! │                                                                         │
//! │  fetch('/carts/…/checkout') → 422                                       │
//! │  { "code": "OUTSIDE_SERVICE_AREA", "message": "Address is outside…" }   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock rejections never come through here. They are 200 responses with
//! `outcome.status = "rejected"`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use hornada_core::{CoreError, ValidationError};
use hornada_db::DbError;

/// API error returned from handlers.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Order not found: 6f1c..."
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Cart limits exceeded (422)
    CartError,

    /// Checkout on an empty cart (422)
    EmptyCart,

    /// Delivery address outside every zone (422)
    OutsideServiceArea,

    /// Pickup disabled (422)
    PickupUnavailable,

    /// Coupon unknown, expired, inactive or below minimum (422)
    CouponRejected,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::CartError
            | ErrorCode::EmptyCart
            | ErrorCode::OutsideServiceArea
            | ErrorCode::PickupUnavailable
            | ErrorCode::CouponRejected => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

/// Converts database errors to API errors.
///
/// Internal details are logged, not returned.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => {
                ApiError::validation(format!("{} '{}' already exists", field, value))
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::Core(e) => ApiError::from(e),
            DbError::ConnectionFailed(_) | DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database unavailable")
            }
            other => {
                tracing::error!(error = %other, "Database operation failed");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::Validation(e) => ApiError::from(e),
            CoreError::CartTooLarge { .. } => ApiError::new(ErrorCode::CartError, message),
            CoreError::QuantityTooLarge { .. } => ApiError::validation(message),
            CoreError::EmptyCart => ApiError::new(ErrorCode::EmptyCart, message),
            CoreError::OutsideServiceArea => ApiError::new(ErrorCode::OutsideServiceArea, message),
            CoreError::PickupUnavailable => ApiError::new(ErrorCode::PickupUnavailable, message),
            CoreError::CouponRejected { .. } => ApiError::new(ErrorCode::CouponRejected, message),
            CoreError::CorruptSnapshot(_) | CoreError::SnapshotWrite(_) => {
                tracing::error!(error = %message, "Cart snapshot failure");
                ApiError::internal("Cart could not be stored")
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
