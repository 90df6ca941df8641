//! # Cart Service
//!
//! Server-side cart operations. Every mutation runs under the cart's lock.
//!
//! ## Add Line Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /carts/{id}/lines                                                 │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  validate cart id ──► lock(cart) ──► load_or_reset                      │
//! │        │                                                                │
//! │        ├── box?  validate_bundle_addition ──► Rejected ──┐              │
//! │        │                                                 │              │
//! │        ▼                                                 │              │
//! │  ledger.add_line ──► Rejected ───────────────────────────┤              │
//! │        │ Ok                                              │              │
//! │        ▼                                                 ▼              │
//! │  save snapshot                            { outcome, cart } (unchanged) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use hornada_core::ledger::CartTotals;
use hornada_core::validation::validate_cart_id;
use hornada_core::{CartLedger, CartLine, LineRequest, StockOutcome};

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// DTOs
// =============================================================================

/// Body of `POST /carts/{id}/lines`.
///
/// ```json
/// {
///   "productId": "caja-dulce",
///   "quantity": 1,
///   "unitPrice": 4500,
///   "stockCeiling": 8,
///   "bundledComponents": [{ "productId": "alfajor", "unitsPerBundle": 6 }],
///   "componentCeilings": { "alfajor": 20 }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLineRequest {
    #[serde(flatten)]
    pub line: LineRequest,

    /// Known stock of each box component. Components missing here fall back
    /// to the ceiling stored on their own cart line, if any.
    #[serde(default)]
    pub component_ceilings: HashMap<String, i64>,
}

/// Body of `PUT /carts/{id}/lines/{product_id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

/// Cart contents plus totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub cart_id: String,
    pub lines: Vec<CartLine>,
    pub totals: CartTotals,
}

impl CartView {
    fn new(cart_id: &str, ledger: &CartLedger) -> Self {
        CartView {
            cart_id: cart_id.to_string(),
            lines: ledger.lines().to_vec(),
            totals: CartTotals::from(ledger),
        }
    }
}

/// Result of a stock-checked mutation. A rejected outcome carries the
/// unchanged cart.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartMutation {
    pub outcome: StockOutcome,
    pub cart: CartView,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRemoval {
    pub removed: bool,
    pub cart: CartView,
}

// =============================================================================
// Service
// =============================================================================

pub struct CartService {
    state: AppState,
}

impl CartService {
    pub fn new(state: AppState) -> Self {
        CartService { state }
    }

    pub async fn view(&self, cart_id: &str) -> Result<CartView, ApiError> {
        validate_cart_id(cart_id)?;
        let ledger = self.state.db.carts().load_or_reset(cart_id).await?;
        Ok(CartView::new(cart_id, &ledger))
    }

    /// Adds a line, checking box components before the line itself.
    pub async fn add_line(
        &self,
        cart_id: &str,
        request: AddLineRequest,
    ) -> Result<CartMutation, ApiError> {
        validate_cart_id(cart_id)?;
        let AddLineRequest {
            line,
            component_ceilings,
        } = request;

        debug!(
            cart_id = %cart_id,
            product_id = %line.product_id,
            quantity = line.quantity,
            composite = line.bundled_components.is_some(),
            "add_line"
        );

        let _guard = self.state.cart_locks.lock(cart_id).await;
        let carts = self.state.db.carts();
        let mut ledger = carts.load_or_reset(cart_id).await?;

        if let Some(components) = line.bundled_components.as_deref() {
            let outcome = ledger.validate_bundle_addition(components, line.quantity, |id| {
                component_ceilings
                    .get(id)
                    .copied()
                    .or_else(|| ledger.line(id).and_then(|l| l.stock_ceiling))
            });
            if !outcome.is_ok() {
                debug!(cart_id = %cart_id, ?outcome, "Box rejected on component stock");
                return Ok(CartMutation {
                    outcome,
                    cart: CartView::new(cart_id, &ledger),
                });
            }
        }

        let outcome = ledger.add_line(line)?;
        if outcome.is_ok() {
            carts.save(cart_id, &ledger).await?;
        } else {
            debug!(cart_id = %cart_id, ?outcome, "Line rejected on stock");
        }

        Ok(CartMutation {
            outcome,
            cart: CartView::new(cart_id, &ledger),
        })
    }

    /// Sets a line's quantity. Raising a box also re-checks its components
    /// against the ceilings stored on their own lines.
    pub async fn update_quantity(
        &self,
        cart_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> Result<CartMutation, ApiError> {
        validate_cart_id(cart_id)?;
        debug!(cart_id = %cart_id, product_id = %product_id, quantity, "update_quantity");

        let _guard = self.state.cart_locks.lock(cart_id).await;
        let carts = self.state.db.carts();
        let mut ledger = carts.load_or_reset(cart_id).await?;

        let box_delta = ledger
            .line(product_id)
            .filter(|l| l.is_composite())
            .map(|l| {
                (
                    quantity.saturating_sub(l.quantity),
                    l.bundled_components.clone().unwrap_or_default(),
                )
            });

        if let Some((delta, components)) = box_delta {
            if delta > 0 {
                let outcome = ledger.validate_bundle_addition(&components, delta, |id| {
                    ledger.line(id).and_then(|l| l.stock_ceiling)
                });
                if !outcome.is_ok() {
                    return Ok(CartMutation {
                        outcome,
                        cart: CartView::new(cart_id, &ledger),
                    });
                }
            }
        }

        let outcome = ledger.update_quantity(product_id, quantity)?;
        if outcome.is_ok() {
            carts.save(cart_id, &ledger).await?;
        }

        Ok(CartMutation {
            outcome,
            cart: CartView::new(cart_id, &ledger),
        })
    }

    pub async fn remove_line(&self, cart_id: &str, product_id: &str) -> Result<LineRemoval, ApiError> {
        validate_cart_id(cart_id)?;
        debug!(cart_id = %cart_id, product_id = %product_id, "remove_line");

        let _guard = self.state.cart_locks.lock(cart_id).await;
        let carts = self.state.db.carts();
        let mut ledger = carts.load_or_reset(cart_id).await?;

        let removed = ledger.remove_line(product_id);
        if removed {
            carts.save(cart_id, &ledger).await?;
        }

        Ok(LineRemoval {
            removed,
            cart: CartView::new(cart_id, &ledger),
        })
    }

    pub async fn clear(&self, cart_id: &str) -> Result<CartView, ApiError> {
        validate_cart_id(cart_id)?;
        debug!(cart_id = %cart_id, "clear_cart");

        let _guard = self.state.cart_locks.lock(cart_id).await;
        self.state.db.carts().delete(cart_id).await?;

        Ok(CartView::new(cart_id, &CartLedger::new()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{memory_state, CART};
    use hornada_core::{BundleComponent, Money, RejectReason};

    fn add(product_id: &str, quantity: i64, ceiling: i64) -> AddLineRequest {
        AddLineRequest {
            line: LineRequest::new(product_id, quantity, Money::from_cents(300))
                .with_ceiling(ceiling),
            component_ceilings: HashMap::new(),
        }
    }

    fn add_box(quantity: i64, ceilings: &[(&str, i64)]) -> AddLineRequest {
        AddLineRequest {
            line: LineRequest::new("caja", quantity, Money::from_cents(4000)).with_bundle(vec![
                BundleComponent::new("medialuna", 2),
                BundleComponent::new("alfajor", 1),
            ]),
            component_ceilings: ceilings.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    #[tokio::test]
    async fn test_add_persists_and_rejects_at_ceiling() {
        let service = CartService::new(memory_state().await);

        let first = service.add_line(CART, add("medialuna", 5, 5)).await.unwrap();
        assert!(first.outcome.is_ok());
        assert_eq!(first.cart.totals.item_count, 5);

        let second = service.add_line(CART, add("medialuna", 1, 5)).await.unwrap();
        assert_eq!(
            second.outcome,
            StockOutcome::Rejected {
                reason: RejectReason::AtCeiling,
                max_additional: 0
            }
        );

        let view = service.view(CART).await.unwrap();
        assert_eq!(view.totals.item_count, 5);
        assert_eq!(view.totals.subtotal, Money::from_cents(1500));
    }

    #[tokio::test]
    async fn test_box_checks_component_ceilings() {
        let service = CartService::new(memory_state().await);

        // 2 loose medialunas with ceiling 3 leaves room for none in a box
        service.add_line(CART, add("medialuna", 2, 3)).await.unwrap();

        let rejected = service.add_line(CART, add_box(1, &[])).await.unwrap();
        assert_eq!(rejected.outcome.max_additional(), Some(0));
        assert_eq!(rejected.cart.lines.len(), 1);

        // An explicit ceiling in the request wins over the stored one
        let accepted = service
            .add_line(CART, add_box(1, &[("medialuna", 10)]))
            .await
            .unwrap();
        assert!(accepted.outcome.is_ok());
        assert_eq!(accepted.cart.lines.len(), 2);
    }

    #[tokio::test]
    async fn test_box_reports_headroom_in_boxes() {
        let service = CartService::new(memory_state().await);

        let outcome = service
            .add_line(CART, add_box(4, &[("medialuna", 6), ("alfajor", 10)]))
            .await
            .unwrap()
            .outcome;

        // 6 medialunas, 2 per box: 3 boxes fit
        assert_eq!(
            outcome,
            StockOutcome::Rejected {
                reason: RejectReason::PartialHeadroom,
                max_additional: 3
            }
        );
    }

    #[tokio::test]
    async fn test_update_quantity() {
        let service = CartService::new(memory_state().await);
        service.add_line(CART, add("medialuna", 2, 4)).await.unwrap();

        let raised = service.update_quantity(CART, "medialuna", 6).await.unwrap();
        assert_eq!(raised.outcome.max_additional(), Some(2));
        assert_eq!(raised.cart.totals.item_count, 2);

        let ok = service.update_quantity(CART, "medialuna", 4).await.unwrap();
        assert!(ok.outcome.is_ok());
        assert_eq!(service.view(CART).await.unwrap().totals.item_count, 4);

        let gone = service.update_quantity(CART, "medialuna", 0).await.unwrap();
        assert!(gone.cart.lines.is_empty());
    }

    #[tokio::test]
    async fn test_raising_a_box_rechecks_components() {
        let service = CartService::new(memory_state().await);
        service.add_line(CART, add("medialuna", 1, 5)).await.unwrap();
        service.add_line(CART, add_box(1, &[])).await.unwrap();

        // 1 loose + 2 boxed = 3 of 5, a second box needs 2 more
        assert!(service.update_quantity(CART, "caja", 2).await.unwrap().outcome.is_ok());

        let third = service.update_quantity(CART, "caja", 3).await.unwrap();
        assert_eq!(third.outcome.max_additional(), Some(0));
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let service = CartService::new(memory_state().await);
        service.add_line(CART, add("medialuna", 2, 0)).await.unwrap();

        assert!(service.remove_line(CART, "medialuna").await.unwrap().removed);
        assert!(!service.remove_line(CART, "medialuna").await.unwrap().removed);

        service.add_line(CART, add("alfajor", 1, 0)).await.unwrap();
        let cleared = service.clear(CART).await.unwrap();
        assert!(cleared.lines.is_empty());
        assert!(service.view(CART).await.unwrap().lines.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_input_is_an_error() {
        let service = CartService::new(memory_state().await);

        let err = service.add_line("nope", add("medialuna", 1, 0)).await.unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ValidationError);

        let err = service.add_line(CART, add("medialuna", 0, 0)).await.unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_oversized_price_leaves_no_snapshot() {
        let state = memory_state().await;
        let service = CartService::new(state.clone());

        let request = AddLineRequest {
            line: LineRequest::new("lingote", 2, Money::from_cents(i64::MAX / 2 + 1)),
            component_ceilings: HashMap::new(),
        };
        let err = service.add_line(CART, request).await.unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ValidationError);

        // Nothing was written, and the cart is still usable
        assert!(!state.db.carts().delete(CART).await.unwrap());
        let view = service.view(CART).await.unwrap();
        assert!(view.lines.is_empty());
        assert!(service.add_line(CART, add("medialuna", 1, 0)).await.unwrap().outcome.is_ok());
    }

    #[tokio::test]
    async fn test_concurrent_adds_respect_ceiling() {
        let state = memory_state().await;

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let service = CartService::new(state.clone());
                tokio::spawn(async move { service.add_line(CART, add("medialuna", 1, 4)).await })
            })
            .collect();

        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap().outcome.is_ok() {
                accepted += 1;
            }
        }

        assert_eq!(accepted, 4);
        let view = CartService::new(state).view(CART).await.unwrap();
        assert_eq!(view.totals.item_count, 4);
    }
}
