//! 统一错误模型
//! 定义客户端所有错误类型

use reqwest::StatusCode;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 客户端错误类型
#[derive(Debug, Error)]
pub enum ClientError {
    /// 没有可用的访问令牌，需要重新登录
    #[error("Not authenticated")]
    Unauthenticated,

    /// 后端拒绝了刷新令牌
    #[error("Token refresh rejected: {0}")]
    RefreshRejected(String),

    #[error("Login failed: {0}")]
    LoginFailed(String),

    /// 网络层错误（DNS、连接拒绝、超时）
    #[error("Transport error: {0}")]
    Transport(#[source] BoxError),

    /// 后端返回非 2xx 状态（仅由类型化接口产生）
    #[error("Upstream error {status}: {detail}")]
    Upstream { status: StatusCode, detail: String },

    #[error("Invalid request target: {0}")]
    InvalidTarget(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Session store error: {0}")]
    Store(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// 对应的 HTTP 状态码（如果有）
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            ClientError::Unauthenticated | ClientError::RefreshRejected(_) => {
                Some(StatusCode::UNAUTHORIZED)
            }
            ClientError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 是否为凭据相关错误（调用方应跳转登录页）
    pub fn is_auth_error(&self) -> bool {
        match self {
            ClientError::Unauthenticated | ClientError::RefreshRejected(_) => true,
            ClientError::Upstream { status, .. } => *status == StatusCode::UNAUTHORIZED,
            _ => false,
        }
    }

    /// 获取用户友好的错误消息（不包含敏感信息）
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Unauthenticated | ClientError::RefreshRejected(_) => {
                "Session expired, please sign in again".to_string()
            }
            ClientError::LoginFailed(detail) => detail.clone(),
            ClientError::Transport(_) => "Unable to reach the server".to_string(),
            ClientError::Upstream { detail, .. } => detail.clone(),
            ClientError::InvalidTarget(_) => "Invalid request".to_string(),
            ClientError::Validation(msg) => msg.clone(),
            ClientError::Store(_) => "Local session storage error".to_string(),
            ClientError::Serialization(_) => "Unexpected response from server".to_string(),
            ClientError::Config(_) => "Configuration error".to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Transport(Box::new(e))
    }
}

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        ClientError::Store(e.to_string())
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(e: validator::ValidationErrors) -> Self {
        ClientError::Validation(e.to_string())
    }
}

/// 从 config::ConfigError 转换
impl From<config::ConfigError> for ClientError {
    fn from(e: config::ConfigError) -> Self {
        ClientError::Config(e.to_string())
    }
}
