//! Status enums for orders and payments.
//!
//! Statuses are owned by the backend. Unknown values deserialize to
//! `Unknown` so a new backend status never breaks order display.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Whether the storefront offers a cancel action for this status.
    ///
    /// The backend makes the final decision; this only drives display.
    #[must_use]
    pub const fn offers_cancel(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed | Self::Processing)
    }
}

/// Payment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Authorized,
    Paid,
    Failed,
    Refunded,
    PartiallyRefunded,
    #[serde(other)]
    Unknown,
}

/// Payment method chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodKind {
    #[default]
    Card,
    Paypal,
    CashOnDelivery,
}

impl PaymentMethodKind {
    /// Whether card details must accompany this method.
    #[must_use]
    pub const fn requires_card(self) -> bool {
        matches!(self, Self::Card)
    }
}
