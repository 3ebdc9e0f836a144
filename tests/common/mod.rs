//! 测试公共模块
//! 提供脚本化传输层、JWT 构造和测试客户端

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use pos_client::{
    config::{ApiConfig, AppConfig, LoggingConfig, SessionConfig},
    error::{ClientError, Result},
    models::user::UserRecord,
    session::{MemorySessionStore, SessionCredentials},
    transport::HttpTransport,
    PosClient,
};
use reqwest::{Method, Request, Response};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BASE_URL: &str = "http://pos.test/api";

/// 创建测试配置
pub fn create_test_config() -> AppConfig {
    AppConfig {
        api: ApiConfig {
            base_url: BASE_URL.to_string(),
            request_timeout_secs: 5,
        },
        session: SessionConfig {
            store_path: "unused-in-tests.json".to_string(),
            refresh_interval_ms: 300_000,
            background_refresh: true,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "compact".to_string(),
        },
    }
}

#[derive(Serialize)]
struct TestClaims {
    sub: String,
    token_type: String,
    exp: i64,
    jti: u64,
}

static TOKEN_SEQ: AtomicU64 = AtomicU64::new(1);

/// 生成在 `secs` 秒后过期的访问令牌（签名密钥只有"后端"知道）
pub fn jwt_expiring_in(secs: i64) -> String {
    encode(
        &Header::default(),
        &TestClaims {
            sub: "1".to_string(),
            token_type: "access".to_string(),
            exp: Utc::now().timestamp() + secs,
            jti: TOKEN_SEQ.fetch_add(1, Ordering::Relaxed),
        },
        &EncodingKey::from_secret(b"backend-signing-key-not-shared-with-client"),
    )
    .expect("Failed to encode test token")
}

pub fn test_user() -> UserRecord {
    UserRecord {
        id: 1,
        username: "cashier1".to_string(),
        role: "cashier".to_string(),
    }
}

pub fn credentials(access: &str, refresh: &str) -> SessionCredentials {
    SessionCredentials {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
        user: test_user(),
    }
}

/// 带会话的内存存储
pub fn store_with(access: &str, refresh: &str) -> Arc<MemorySessionStore> {
    Arc::new(MemorySessionStore::with_credentials(credentials(access, refresh)))
}

/// 传输层记录下的请求
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    /// 去掉 "/api" 前缀的路径
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub headers: reqwest::header::HeaderMap,
    pub body: Option<serde_json::Value>,
}

impl RecordedRequest {
    fn from_request(request: &Request) -> Self {
        let url = request.url();
        Self {
            method: request.method().clone(),
            path: url.path().trim_start_matches("/api").to_string(),
            query: url.query().map(|q| q.to_string()),
            authorization: request
                .headers()
                .get(reqwest::header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string()),
            headers: request.headers().clone(),
            body: request
                .body()
                .and_then(|b| b.as_bytes())
                .and_then(|b| serde_json::from_slice(b).ok()),
        }
    }

    pub fn bearer(&self) -> Option<&str> {
        self.authorization.as_deref()?.strip_prefix("Bearer ")
    }
}

/// 脚本化响应
pub enum Reply {
    Respond {
        status: u16,
        body: String,
        delay: Option<Duration>,
    },
    TransportError,
}

impl Reply {
    pub fn json(status: u16, value: serde_json::Value) -> Self {
        Reply::Respond {
            status,
            body: value.to_string(),
            delay: None,
        }
    }

    pub fn status(status: u16) -> Self {
        Reply::Respond {
            status,
            body: String::new(),
            delay: None,
        }
    }

    /// 在返回前等待（配合暂停的时钟模拟慢请求）
    pub fn delayed(self, by: Duration) -> Self {
        match self {
            Reply::Respond { status, body, .. } => Reply::Respond {
                status,
                body,
                delay: Some(by),
            },
            other => other,
        }
    }
}

type Handler = Box<dyn Fn(&RecordedRequest) -> Reply + Send + Sync>;

/// 按请求内容返回脚本化响应并记录全部请求
pub struct MockTransport {
    handler: Handler,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new(handler: impl Fn(&RecordedRequest) -> Reply + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .count()
    }

    pub fn total(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: Request) -> Result<Response> {
        let recorded = RecordedRequest::from_request(&request);
        self.requests.lock().unwrap().push(recorded.clone());

        match (self.handler)(&recorded) {
            Reply::Respond {
                status,
                body,
                delay,
            } => {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                let response = http::Response::builder()
                    .status(status)
                    .header("content-type", "application/json")
                    .body(body)
                    .unwrap();
                Ok(response.into())
            }
            Reply::TransportError => Err(ClientError::Transport("connection refused".into())),
        }
    }
}

/// 后端刷新接口：返回新的一小时有效期令牌
pub fn refresh_ok() -> Reply {
    Reply::json(200, serde_json::json!({ "access": jwt_expiring_in(3600) }))
}

/// 使用指定存储和传输层创建客户端
pub fn create_test_client(
    store: Arc<MemorySessionStore>,
    transport: Arc<MockTransport>,
) -> PosClient {
    PosClient::with_parts(create_test_config(), store, transport)
        .expect("Failed to create test client")
}
