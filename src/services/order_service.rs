//! 订单服务：收银结账与后厨看板

use reqwest::Method;
use std::sync::Arc;
use validator::Validate;

use crate::error::{ClientError, Result};
use crate::gateway::ApiGateway;
use crate::models::order::{CheckoutRequest, Order, OrderStatus, OrderStatusUpdate};

pub struct OrderService {
    gateway: Arc<ApiGateway>,
}

impl OrderService {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    /// 结账，库存扣减与支付记录由后端完成
    pub async fn checkout(&self, req: &CheckoutRequest) -> Result<Order> {
        req.validate()?;
        let order: Order = self.gateway.send_json(Method::POST, "/orders/", req).await?;
        tracing::info!(order_id = order.id, total = order.total, "Order placed");
        Ok(order)
    }

    pub async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>> {
        let target = match status {
            Some(status) => format!("/orders/?status={}", status.as_str()),
            None => "/orders/".to_string(),
        };
        self.gateway.get_json(&target).await
    }

    /// 后厨看板：待处理、制作中、待取餐
    pub async fn kitchen_board(&self) -> Result<Vec<Order>> {
        let orders = self.list(None).await?;
        Ok(orders
            .into_iter()
            .filter(|o| {
                matches!(
                    o.status,
                    OrderStatus::Pending | OrderStatus::Preparing | OrderStatus::Ready
                )
            })
            .collect())
    }

    pub async fn update_status(&self, id: i64, status: OrderStatus) -> Result<Order> {
        self.gateway
            .send_json(
                Method::PATCH,
                &format!("/orders/{}/", id),
                &OrderStatusUpdate { status },
            )
            .await
    }

    /// 推进到后厨流程的下一步
    pub async fn advance(&self, order: &Order) -> Result<Order> {
        let next = order.status.next().ok_or_else(|| {
            ClientError::Validation(format!(
                "order {} is already {}",
                order.id,
                order.status.as_str()
            ))
        })?;
        self.update_status(order.id, next).await
    }
}
