//! Sales report models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSales {
    pub product_name: String,
    #[serde(deserialize_with = "super::decimal::deserialize")]
    pub quantity: f64,
    #[serde(deserialize_with = "super::decimal::deserialize")]
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySales {
    pub date: NaiveDate,
    #[serde(deserialize_with = "super::decimal::deserialize")]
    pub total: f64,
    #[serde(default)]
    pub orders: u64,
}

/// Aggregated sales for a date range (computed by the backend)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesReport {
    #[serde(default, deserialize_with = "super::decimal::deserialize")]
    pub total_sales: f64,
    #[serde(default)]
    pub total_orders: u64,
    #[serde(default)]
    pub top_products: Vec<ProductSales>,
    #[serde(default)]
    pub daily_sales: Vec<DailySales>,
}

impl SalesReport {
    pub fn average_order_value(&self) -> f64 {
        if self.total_orders == 0 {
            0.0
        } else {
            self.total_sales / self.total_orders as f64
        }
    }
}

/// Inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportRange {
    /// Returns `None` when `start` is after `end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }
}
