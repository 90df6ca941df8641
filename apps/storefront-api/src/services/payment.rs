//! # Payment Service
//!
//! Applies provider webhook statuses to stored orders.
//!
//! Providers retry and reorder notifications, so every webhook is checked
//! against [`PaymentStatus::transition`] and written with a compare-and-set.
//! A stale or repeated notification is acknowledged and ignored.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use hornada_core::{PaymentStatus, Transition};

use crate::error::ApiError;
use crate::state::AppState;

/// Attempts before giving up on a status that keeps changing underneath.
const MAX_CAS_ATTEMPTS: usize = 3;

/// Body of `POST /webhooks/payments`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentNotification {
    pub order_id: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentUpdate {
    pub order_id: String,
    /// Status stored after the notification.
    pub status: PaymentStatus,
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

pub struct PaymentService {
    state: AppState,
}

impl PaymentService {
    pub fn new(state: AppState) -> Self {
        PaymentService { state }
    }

    pub async fn apply(&self, notification: PaymentNotification) -> Result<PaymentUpdate, ApiError> {
        let PaymentNotification { order_id, status } = notification;

        let incoming = PaymentStatus::parse(&status)
            .ok_or_else(|| ApiError::validation(format!("Unknown payment status: {}", status)))?;

        debug!(order_id = %order_id, status = incoming.as_str(), "Payment notification");

        let orders = self.state.db.orders();

        for _ in 0..MAX_CAS_ATTEMPTS {
            let order = orders
                .get_by_id(&order_id)
                .await?
                .ok_or_else(|| ApiError::not_found("Order", &order_id))?;
            let current = order.payment_status;

            match current.transition(incoming) {
                Transition::Ignore { reason } => {
                    info!(
                        order_id = %order_id,
                        current = current.as_str(),
                        incoming = incoming.as_str(),
                        reason,
                        "Payment notification ignored"
                    );
                    return Ok(PaymentUpdate {
                        order_id,
                        status: current,
                        applied: false,
                        reason: Some(reason.to_string()),
                    });
                }
                Transition::Apply(next) => {
                    if orders.update_payment_status(&order_id, current, next).await? {
                        info!(
                            order_id = %order_id,
                            from = current.as_str(),
                            to = next.as_str(),
                            "Payment status updated"
                        );
                        return Ok(PaymentUpdate {
                            order_id,
                            status: next,
                            applied: true,
                            reason: None,
                        });
                    }
                    debug!(order_id = %order_id, "Payment status changed concurrently, retrying");
                }
            }
        }

        warn!(order_id = %order_id, "Payment status kept changing, giving up");
        Err(ApiError::internal("Payment status could not be updated"))
    }
}
