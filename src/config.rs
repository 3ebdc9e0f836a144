//! 配置系统
//! 从默认值和环境变量加载客户端配置

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// 后端基础地址，例如 "http://localhost:8000/api"
    pub base_url: String,
    /// 单次请求超时时间（秒）
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// 会话凭据持久化文件
    pub store_path: String,
    /// 后台刷新间隔（毫秒）
    pub refresh_interval_ms: u64,
    /// 是否启动后台刷新
    pub background_refresh: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别: trace, debug, info, warn, error
    pub level: String,
    /// 日志格式: json, pretty, compact
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut settings = Config::builder();

        // 添加默认配置
        settings = settings
            .set_default("api.base_url", "http://localhost:8000/api")?
            .set_default("api.request_timeout_secs", 30)?
            .set_default("session.store_path", ".pos-session.json")?
            .set_default("session.refresh_interval_ms", 300_000)?
            .set_default("session.background_refresh", true)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?;

        // 从环境变量加载配置（前缀为 POS_）
        settings = settings.add_source(
            Environment::with_prefix("POS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = settings.build()?.try_deserialize()?;

        config.validate()?;

        Ok(config)
    }

    /// 验证配置合法性
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.api.base_url).map_err(|e| {
            ConfigError::Message(format!("Invalid api.base_url '{}': {}", self.api.base_url, e))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Message(format!(
                "api.base_url must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.api.request_timeout_secs == 0 || self.api.request_timeout_secs > 300 {
            return Err(ConfigError::Message(
                "request_timeout_secs must be between 1 and 300".to_string(),
            ));
        }

        if self.session.refresh_interval_ms < 1000 {
            return Err(ConfigError::Message(
                "refresh_interval_ms must be at least 1000".to_string(),
            ));
        }

        if self.session.store_path.trim().is_empty() {
            return Err(ConfigError::Message("session.store_path must not be empty".to_string()));
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                )))
            }
        }

        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" | "compact" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log format: {}. Must be one of: json, pretty, compact",
                    self.logging.format
                )))
            }
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.session.refresh_interval_ms)
    }
}
