//! HTTP 传输层
//! 网关与令牌管理器通过该接口发出请求，测试时可替换为脚本化实现

use async_trait::async_trait;
use reqwest::{Client, Request, Response};
use std::time::Duration;

use crate::error::{ClientError, Result};

#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// 发出请求并返回原始响应；只有网络层失败才返回错误
    async fn execute(&self, request: Request) -> Result<Response>;
}

/// 基于 reqwest 的传输实现
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pos-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: Request) -> Result<Response> {
        let method = request.method().clone();
        let path = request.url().path().to_string();

        let response = self.client.execute(request).await.map_err(|e| {
            tracing::warn!(method = %method, path = %path, error = %e, "HTTP request failed");
            ClientError::from(e)
        })?;

        tracing::debug!(
            method = %method,
            path = %path,
            status = response.status().as_u16(),
            "HTTP request completed"
        );
        Ok(response)
    }
}
