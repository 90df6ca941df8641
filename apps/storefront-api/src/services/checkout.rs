//! # Checkout Service
//!
//! Prices a cart, writes a pending order and empties the cart.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  lock(cart) ──► load cart ──► delivery? locate(zone) ──► load coupon    │
//! │                                                              │          │
//! │                    CheckoutSummary::compose ◄────────────────┘          │
//! │                              │                                          │
//! │                              ▼                                          │
//! │      one transaction: orders.create(pending) + carts.delete             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use hornada_core::validation::{validate_cart_id, validate_coordinates, validate_coupon_code};
use hornada_core::{locate, CheckoutSummary, CoreError, Fulfillment, GeoPoint, Order, ZoneMatch};

use crate::error::ApiError;
use crate::state::AppState;

/// Body of `POST /carts/{id}/checkout`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub fulfillment: Fulfillment,
    /// Required for delivery.
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub coupon_code: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub order_id: String,
    pub summary: CheckoutSummary,
}

pub struct CheckoutService {
    state: AppState,
}

impl CheckoutService {
    pub fn new(state: AppState) -> Self {
        CheckoutService { state }
    }

    pub async fn checkout(
        &self,
        cart_id: &str,
        request: CheckoutRequest,
    ) -> Result<CheckoutResponse, ApiError> {
        validate_cart_id(cart_id)?;
        debug!(
            cart_id = %cart_id,
            fulfillment = request.fulfillment.as_str(),
            coupon = request.coupon_code.as_deref(),
            "checkout"
        );

        let _guard = self.state.cart_locks.lock(cart_id).await;
        let db = &self.state.db;
        let ledger = db.carts().load_or_reset(cart_id).await?;

        let zone = match request.fulfillment {
            Fulfillment::Delivery => self.zone_for(request.location).await?,
            Fulfillment::Pickup => None,
        };

        let coupon = match request.coupon_code.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => {
                let code = validate_coupon_code(raw)?;
                let coupon = db.coupons().get_by_code(&code).await?.ok_or_else(|| {
                    CoreError::CouponRejected {
                        code: code.clone(),
                        reason: "unknown code".to_string(),
                    }
                })?;
                Some(coupon)
            }
            _ => None,
        };

        let now = Utc::now();
        let summary = CheckoutSummary::compose(
            &ledger,
            request.fulfillment,
            zone.as_ref(),
            coupon.as_ref(),
            &self.state.config.checkout_policy(),
            now,
        )?;

        let order = Order::place(Uuid::new_v4().to_string(), cart_id, &ledger, &summary, now);
        db.orders().create_and_clear_cart(&order).await?;

        info!(
            order_id = %order.id,
            cart_id = %cart_id,
            total = %order.total,
            fulfillment = order.fulfillment.as_str(),
            "Order placed"
        );

        Ok(CheckoutResponse {
            order_id: order.id,
            summary,
        })
    }

    /// A delivery without a pin is treated like one outside every zone.
    async fn zone_for(&self, location: Option<GeoPoint>) -> Result<Option<ZoneMatch>, ApiError> {
        let Some(point) = location else {
            return Ok(None);
        };
        validate_coordinates(point)?;

        let zones = self.state.db.zones().list_active_ordered().await?;
        Ok(locate(point, &zones))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::error::ErrorCode;
    use crate::services::cart::{AddLineRequest, CartService};
    use crate::services::test_support::{memory_state, memory_state_with, square_zone, CART};
    use hornada_core::{Coupon, CouponKind, LineRequest, Money, PaymentStatus};

    async fn fill_cart(state: &AppState, cents: i64) {
        CartService::new(state.clone())
            .add_line(
                CART,
                AddLineRequest {
                    line: LineRequest::new("torta", 1, Money::from_cents(cents)),
                    component_ceilings: Default::default(),
                },
            )
            .await
            .unwrap();
    }

    fn delivery_at(lat: f64, lng: f64) -> CheckoutRequest {
        CheckoutRequest {
            fulfillment: Fulfillment::Delivery,
            location: Some(GeoPoint::new(lat, lng)),
            coupon_code: None,
        }
    }

    #[tokio::test]
    async fn test_delivery_checkout_places_order_and_clears_cart() {
        let state = memory_state().await;
        state.db.zones().upsert(&square_zone("centro", 0.0, 10.0, 800, 0)).await.unwrap();
        fill_cart(&state, 5000).await;

        let response = CheckoutService::new(state.clone())
            .checkout(CART, delivery_at(5.0, 5.0))
            .await
            .unwrap();

        assert_eq!(response.summary.shipping, Money::from_cents(800));
        assert_eq!(response.summary.total, Money::from_cents(5800));

        let order = state.db.orders().get_by_id(&response.order_id).await.unwrap().unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.zone_id.as_deref(), Some("centro"));
        assert_eq!(order.lines.len(), 1);

        assert!(state.db.carts().load(CART).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_outside_service_area() {
        let state = memory_state().await;
        state.db.zones().upsert(&square_zone("centro", 0.0, 10.0, 800, 0)).await.unwrap();
        fill_cart(&state, 5000).await;

        let service = CheckoutService::new(state.clone());
        let err = service.checkout(CART, delivery_at(20.0, 20.0)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::OutsideServiceArea);

        let no_pin = CheckoutRequest {
            fulfillment: Fulfillment::Delivery,
            location: None,
            coupon_code: None,
        };
        let err = service.checkout(CART, no_pin).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::OutsideServiceArea);

        // Cart survives a failed checkout
        assert_eq!(state.db.carts().load(CART).await.unwrap().line_count(), 1);
    }

    #[tokio::test]
    async fn test_pickup_with_coupon() {
        let state = memory_state().await;
        state
            .db
            .coupons()
            .upsert(&Coupon {
                code: "PAN10".into(),
                kind: CouponKind::Percentage(1000),
                min_subtotal: Money::zero(),
                active: true,
                expires_at: None,
            })
            .await
            .unwrap();
        fill_cart(&state, 3000).await;

        let response = CheckoutService::new(state)
            .checkout(
                CART,
                CheckoutRequest {
                    fulfillment: Fulfillment::Pickup,
                    location: None,
                    coupon_code: Some(" pan10 ".into()),
                },
            )
            .await
            .unwrap();

        assert_eq!(response.summary.coupon_code.as_deref(), Some("PAN10"));
        assert_eq!(response.summary.discount, Money::from_cents(300));
        assert_eq!(response.summary.shipping, Money::zero());
        assert_eq!(response.summary.total, Money::from_cents(2700));
    }

    #[tokio::test]
    async fn test_unknown_coupon_and_empty_cart() {
        let state = memory_state().await;
        let service = CheckoutService::new(state.clone());

        let pickup = |code: Option<&str>| CheckoutRequest {
            fulfillment: Fulfillment::Pickup,
            location: None,
            coupon_code: code.map(String::from),
        };

        let err = service.checkout(CART, pickup(None)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyCart);

        fill_cart(&state, 1000).await;
        let err = service.checkout(CART, pickup(Some("NOEXISTE"))).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CouponRejected);
    }

    #[tokio::test]
    async fn test_pickup_disabled_by_config() {
        let mut config = ApiConfig::default();
        config.checkout.pickup_allowed = false;
        let state = memory_state_with(config).await;
        fill_cart(&state, 1000).await;

        let err = CheckoutService::new(state)
            .checkout(
                CART,
                CheckoutRequest {
                    fulfillment: Fulfillment::Pickup,
                    location: None,
                    coupon_code: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PickupUnavailable);
    }

    #[tokio::test]
    async fn test_free_shipping_threshold() {
        let mut config = ApiConfig::default();
        config.store.free_shipping_threshold_cents = Some(4000);
        let state = memory_state_with(config).await;
        state.db.zones().upsert(&square_zone("centro", 0.0, 10.0, 800, 0)).await.unwrap();
        fill_cart(&state, 4500).await;

        let response = CheckoutService::new(state)
            .checkout(CART, delivery_at(1.0, 1.0))
            .await
            .unwrap();
        assert_eq!(response.summary.shipping, Money::zero());
        assert_eq!(response.summary.total, Money::from_cents(4500));
    }
}
