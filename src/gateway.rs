//! 认证请求网关
//! 为请求附加 Bearer 令牌，过期前主动刷新，遇到 401 时重新解析令牌并重试一次

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Request, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::auth::TokenManager;
use crate::error::{ClientError, Result};
use crate::events::{EventBus, SessionEvent};
use crate::models::auth::ErrorBody;
use crate::transport::HttpTransport;

/// 单次请求的配置
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    /// 是否需要附加 Bearer 令牌
    pub require_auth: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
            require_auth: true,
        }
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn get() -> Self {
        Self::default()
    }

    /// 以 JSON 为请求体
    pub fn json<B: Serialize + ?Sized>(method: Method, body: &B) -> Result<Self> {
        let mut options = Self::new(method);
        options
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        options.body = Some(serde_json::to_vec(body)?);
        Ok(options)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// 不附加令牌（登录等公开接口）
    pub fn public(mut self) -> Self {
        self.require_auth = false;
        self
    }
}

/// 认证请求网关
pub struct ApiGateway {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<TokenManager>,
    events: EventBus,
}

impl ApiGateway {
    pub fn new(
        base_url: &str,
        transport: Arc<dyn HttpTransport>,
        tokens: Arc<TokenManager>,
        events: EventBus,
    ) -> Result<Self> {
        Url::parse(base_url).map_err(|e| ClientError::InvalidTarget(format!("{}: {}", base_url, e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            tokens,
            events,
        })
    }

    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    pub fn resolve_target(&self, target: &str) -> Result<Url> {
        join_url(&self.base_url, target)
    }

    /// 发出请求
    ///
    /// 返回原始响应（包括非 2xx 状态），不解析响应体。
    /// 需要认证但没有可用令牌时不发出任何请求，发布 `SignInRequired` 并返回 `Unauthenticated`。
    pub async fn send(&self, target: &str, options: RequestOptions) -> Result<Response> {
        let url = self.resolve_target(target)?;

        if !options.require_auth {
            return self.transport.execute(build_request(&url, &options, None)?).await;
        }

        let Some(token) = self.tokens.resolve().await? else {
            warn!(method = %options.method, path = url.path(), "No usable credentials, sign-in required");
            self.events.publish(SessionEvent::SignInRequired);
            return Err(ClientError::Unauthenticated);
        };

        let response = self
            .transport
            .execute(build_request(&url, &options, Some(&token))?)
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(method = %options.method, path = url.path(), "Received 401, re-resolving token");
        match self.tokens.resolve().await? {
            Some(token) => {
                metrics::counter!("pos_gateway_retry_total").increment(1);
                self.transport
                    .execute(build_request(&url, &options, Some(&token))?)
                    .await
            }
            None => Ok(response),
        }
    }

    /// GET 并解析 JSON
    pub async fn get_json<T: DeserializeOwned>(&self, target: &str) -> Result<T> {
        let response = self.send(target, RequestOptions::get()).await?;
        read_json(response).await
    }

    /// 以 JSON 请求体发送并解析 JSON 响应
    pub async fn send_json<B, T>(&self, method: Method, target: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(target, RequestOptions::json(method, body)?).await?;
        read_json(response).await
    }

    /// DELETE，忽略响应体
    pub async fn delete(&self, target: &str) -> Result<()> {
        let response = self.send(target, RequestOptions::new(Method::DELETE)).await?;
        error_for_status(response).await?;
        Ok(())
    }
}

/// 绝对地址原样使用，否则拼接基础地址
pub fn join_url(base_url: &str, target: &str) -> Result<Url> {
    let base = base_url.trim_end_matches('/');
    let full = if target.starts_with("http://") || target.starts_with("https://") {
        target.to_string()
    } else if target.starts_with('/') {
        format!("{}{}", base, target)
    } else {
        format!("{}/{}", base, target)
    };

    Url::parse(&full).map_err(|e| ClientError::InvalidTarget(format!("{}: {}", target, e)))
}

fn build_request(url: &Url, options: &RequestOptions, token: Option<&str>) -> Result<Request> {
    let mut request = Request::new(options.method.clone(), url.clone());
    *request.headers_mut() = options.headers.clone();

    if let Some(token) = token {
        let mut value = HeaderValue::try_from(format!("Bearer {}", token)).map_err(|_| {
            ClientError::Store("stored access token is not a valid header value".to_string())
        })?;
        value.set_sensitive(true);
        request.headers_mut().insert(AUTHORIZATION, value);
    }

    if let Some(body) = &options.body {
        *request.body_mut() = Some(body.clone().into());
    }
    Ok(request)
}

/// 非 2xx 响应转换为 `Upstream` 错误，优先使用后端的 `detail` 字段
pub async fn error_for_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.bytes().await.unwrap_or_default();
    let detail = match serde_json::from_slice::<ErrorBody>(&body) {
        Ok(parsed) => parsed.detail,
        Err(_) if body.is_empty() => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
        Err(_) => String::from_utf8_lossy(&body).chars().take(200).collect(),
    };

    Err(ClientError::Upstream { status, detail })
}

/// 检查状态码并解析 JSON 响应体
pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = error_for_status(response).await?;
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
