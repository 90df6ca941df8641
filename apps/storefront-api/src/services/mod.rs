//! Storefront services.
//!
//! Each service owns a clone of [`AppState`](crate::state::AppState) and
//! returns [`ApiError`](crate::error::ApiError), so handlers stay thin.

pub mod cart;
pub mod checkout;
pub mod payment;
pub mod zone;

pub use cart::CartService;
pub use checkout::CheckoutService;
pub use payment::PaymentService;
pub use zone::ZoneService;
