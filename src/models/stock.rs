//! Stock tracking models

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Stock level of one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    pub id: i64,
    pub product: i64,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(deserialize_with = "super::decimal::deserialize")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "super::decimal::deserialize")]
    pub reorder_level: f64,
}

impl StockItem {
    /// At or below the reorder level
    pub fn is_low(&self) -> bool {
        self.quantity <= self.reorder_level
    }
}

/// Stock update request
#[derive(Debug, Clone, Serialize, Validate)]
pub struct StockUpdate {
    #[validate(range(min = 0.0))]
    pub quantity: f64,
}
