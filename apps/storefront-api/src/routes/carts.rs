//! Cart and checkout handlers.
//!
//! Stock rejections come back as `200` with `outcome.status = "rejected"`;
//! the storefront shows "only N more available" from `maxAdditional`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::ApiError;
use crate::services::cart::{AddLineRequest, CartMutation, CartView, LineRemoval, UpdateQuantityRequest};
use crate::services::checkout::{CheckoutRequest, CheckoutResponse};
use crate::services::{CartService, CheckoutService};
use crate::state::AppState;

pub async fn get_cart(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
) -> Result<Json<CartView>, ApiError> {
    Ok(Json(CartService::new(state).view(&cart_id).await?))
}

pub async fn clear_cart(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
) -> Result<Json<CartView>, ApiError> {
    Ok(Json(CartService::new(state).clear(&cart_id).await?))
}

pub async fn add_line(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
    Json(request): Json<AddLineRequest>,
) -> Result<Json<CartMutation>, ApiError> {
    Ok(Json(CartService::new(state).add_line(&cart_id, request).await?))
}

pub async fn update_line(
    State(state): State<AppState>,
    Path((cart_id, product_id)): Path<(String, String)>,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartMutation>, ApiError> {
    let mutation = CartService::new(state)
        .update_quantity(&cart_id, &product_id, request.quantity)
        .await?;
    Ok(Json(mutation))
}

pub async fn remove_line(
    State(state): State<AppState>,
    Path((cart_id, product_id)): Path<(String, String)>,
) -> Result<Json<LineRemoval>, ApiError> {
    Ok(Json(CartService::new(state).remove_line(&cart_id, &product_id).await?))
}

/// Places the order. `201` with the new order id and the amounts charged.
pub async fn checkout(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>), ApiError> {
    let response = CheckoutService::new(state).checkout(&cart_id, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
