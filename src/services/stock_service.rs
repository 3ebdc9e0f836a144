//! 库存服务

use reqwest::Method;
use std::sync::Arc;
use validator::Validate;

use crate::error::Result;
use crate::gateway::ApiGateway;
use crate::models::stock::{StockItem, StockUpdate};

pub struct StockService {
    gateway: Arc<ApiGateway>,
}

impl StockService {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Vec<StockItem>> {
        self.gateway.get_json("/stock/").await
    }

    /// 低于补货线的库存（客户端过滤）
    pub async fn low_stock(&self) -> Result<Vec<StockItem>> {
        let items = self.list().await?;
        Ok(items.into_iter().filter(StockItem::is_low).collect())
    }

    pub async fn set_quantity(&self, id: i64, quantity: f64) -> Result<StockItem> {
        let update = StockUpdate { quantity };
        update.validate()?;
        self.gateway
            .send_json(Method::PATCH, &format!("/stock/{}/", id), &update)
            .await
    }
}
