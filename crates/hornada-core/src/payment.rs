//! # Payment Status
//!
//! Order payment state as reported by the payment provider's webhooks.
//!
//! ## State Machine
//! ```text
//!                ┌──────────────┐
//!                │   Pending    │◄──┐
//!                └──────┬───────┘   │
//!                       │           │
//!                ┌──────▼───────┐   │
//!                │  InProcess   │───┘
//!                └──────┬───────┘
//!          ┌────────────┼─────────────┬─────────────┐
//!          ▼            ▼             ▼             ▼
//!    ┌──────────┐ ┌──────────┐ ┌───────────┐
//!    │ Approved │ │ Rejected │ │ Cancelled │   (terminal)
//!    └────┬─────┘ └──────────┘ └───────────┘
//!         │
//!    ┌────┴──────────────┐
//!    ▼                   ▼
//! ┌──────────┐    ┌─────────────┐
//! │ Refunded │    │ ChargedBack │   (terminal)
//! └──────────┘    └─────────────┘
//! ```
//!
//! Providers retry webhooks and deliver them out of order. A transition that
//! the table does not allow is ignored, never an error.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Payment state of an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    InProcess,
    Approved,
    Rejected,
    Cancelled,
    Refunded,
    ChargedBack,
}

/// What to do with an incoming status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Apply(PaymentStatus),
    Ignore { reason: &'static str },
}

impl PaymentStatus {
    /// Provider wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::InProcess => "in_process",
            PaymentStatus::Approved => "approved",
            PaymentStatus::Rejected => "rejected",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::ChargedBack => "charged_back",
        }
    }

    /// Parses a provider status. Unknown statuses are `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(PaymentStatus::Pending),
            "in_process" => Some(PaymentStatus::InProcess),
            "approved" => Some(PaymentStatus::Approved),
            "rejected" => Some(PaymentStatus::Rejected),
            "cancelled" => Some(PaymentStatus::Cancelled),
            "refunded" => Some(PaymentStatus::Refunded),
            "charged_back" => Some(PaymentStatus::ChargedBack),
            _ => None,
        }
    }

    /// True once no further webhook can change the status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Rejected
                | PaymentStatus::Cancelled
                | PaymentStatus::Refunded
                | PaymentStatus::ChargedBack
        )
    }

    /// Decides whether `incoming` replaces the current status.
    ///
    /// ```rust
    /// use hornada_core::payment::{PaymentStatus, Transition};
    ///
    /// assert_eq!(
    ///     PaymentStatus::Pending.transition(PaymentStatus::Approved),
    ///     Transition::Apply(PaymentStatus::Approved)
    /// );
    /// assert!(matches!(
    ///     PaymentStatus::Approved.transition(PaymentStatus::Pending),
    ///     Transition::Ignore { .. }
    /// ));
    /// ```
    pub fn transition(self, incoming: PaymentStatus) -> Transition {
        use PaymentStatus::*;

        if self == incoming {
            return Transition::Ignore {
                reason: "status unchanged",
            };
        }

        match (self, incoming) {
            (Pending | InProcess, next) => Transition::Apply(next),
            (Approved, Refunded | ChargedBack) => Transition::Apply(incoming),
            (Approved, _) => Transition::Ignore {
                reason: "approved payments can only be refunded or charged back",
            },
            _ => Transition::Ignore {
                reason: "payment is in a terminal state",
            },
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
