//! # HTTP Routes
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET    /health                               health::health            │
//! │  GET    /zones                                zones::list_zones         │
//! │  POST   /zones/locate                         zones::locate_zone        │
//! │  GET    /carts/{cart_id}                      carts::get_cart           │
//! │  DELETE /carts/{cart_id}                      carts::clear_cart         │
//! │  POST   /carts/{cart_id}/lines                carts::add_line           │
//! │  PUT    /carts/{cart_id}/lines/{product_id}   carts::update_line        │
//! │  DELETE /carts/{cart_id}/lines/{product_id}   carts::remove_line        │
//! │  POST   /carts/{cart_id}/checkout             carts::checkout           │
//! │  POST   /webhooks/payments                    webhooks::payment_webhook │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod carts;
pub mod health;
pub mod webhooks;
pub mod zones;

use axum::routing::{get, post, put};
use axum::Router;

use crate::state::AppState;

/// Builds the storefront router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/zones", get(zones::list_zones))
        .route("/zones/locate", post(zones::locate_zone))
        .route(
            "/carts/{cart_id}",
            get(carts::get_cart).delete(carts::clear_cart),
        )
        .route("/carts/{cart_id}/lines", post(carts::add_line))
        .route(
            "/carts/{cart_id}/lines/{product_id}",
            put(carts::update_line).delete(carts::remove_line),
        )
        .route("/carts/{cart_id}/checkout", post(carts::checkout))
        .route("/webhooks/payments", post(webhooks::payment_webhook))
        .with_state(state)
}
