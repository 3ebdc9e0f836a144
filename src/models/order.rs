//! Order models (billing and kitchen board)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Order status as shown on the kitchen board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Next step in the kitchen flow, `None` for terminal states
    pub fn next(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::Ready),
            OrderStatus::Ready => Some(OrderStatus::Completed),
            OrderStatus::Completed | OrderStatus::Cancelled => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
}

/// Order line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product: i64,
    #[serde(default)]
    pub product_name: Option<String>,
    pub quantity: u32,
    #[serde(deserialize_with = "super::decimal::deserialize")]
    pub price: f64,
}

/// Order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(deserialize_with = "super::decimal::deserialize")]
    pub total: f64,
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    pub created_at: DateTime<Utc>,
}

/// Checkout line
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CheckoutItem {
    pub product: i64,
    #[validate(range(min = 1))]
    pub quantity: u32,
}

/// Checkout request (billing screen)
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CheckoutRequest {
    #[validate(length(min = 1), nested)]
    pub items: Vec<CheckoutItem>,
    pub payment_method: PaymentMethod,
}

/// Status change request (kitchen board)
#[derive(Debug, Clone, Serialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}
