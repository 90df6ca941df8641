use axum::extract::State;
use axum::Json;

use crate::error::ApiError;
use crate::services::payment::{PaymentNotification, PaymentUpdate};
use crate::services::PaymentService;
use crate::state::AppState;

/// Provider callback. Ignored notifications still answer `200` so the
/// provider stops retrying.
pub async fn payment_webhook(
    State(state): State<AppState>,
    Json(notification): Json<PaymentNotification>,
) -> Result<Json<PaymentUpdate>, ApiError> {
    Ok(Json(PaymentService::new(state).apply(notification).await?))
}
