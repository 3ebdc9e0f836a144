//! Product catalog models

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(deserialize_with = "super::decimal::deserialize")]
    pub price: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

/// Create / update product request
#[derive(Debug, Clone, Serialize, Validate)]
pub struct ProductInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub is_available: bool,
}
