//! 商品目录服务

use reqwest::Method;
use std::sync::Arc;
use validator::Validate;

use crate::error::Result;
use crate::gateway::ApiGateway;
use crate::models::product::{Product, ProductInput};

pub struct ProductService {
    gateway: Arc<ApiGateway>,
}

impl ProductService {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Vec<Product>> {
        self.gateway.get_json("/products/").await
    }

    pub async fn get(&self, id: i64) -> Result<Product> {
        self.gateway.get_json(&format!("/products/{}/", id)).await
    }

    pub async fn create(&self, input: &ProductInput) -> Result<Product> {
        input.validate()?;
        let product: Product = self.gateway.send_json(Method::POST, "/products/", input).await?;
        tracing::info!(product_id = product.id, name = %product.name, "Product created");
        Ok(product)
    }

    pub async fn update(&self, id: i64, input: &ProductInput) -> Result<Product> {
        input.validate()?;
        self.gateway
            .send_json(Method::PUT, &format!("/products/{}/", id), input)
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.gateway.delete(&format!("/products/{}/", id)).await?;
        tracing::info!(product_id = id, "Product deleted");
        Ok(())
    }
}
