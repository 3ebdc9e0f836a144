//! POS 客户端入口
//! 组装会话存储、传输层、令牌管理器、网关和各业务服务

use std::sync::Arc;

use crate::auth::{AuthService, BackgroundRefresh, TokenManager};
use crate::config::AppConfig;
use crate::error::Result;
use crate::events::{EventBus, SessionEvent};
use crate::gateway::{join_url, ApiGateway};
use crate::services::{OrderService, ProductService, ReportService, StockService, UserService};
use crate::session::{FileSessionStore, SessionStore};
use crate::transport::{HttpTransport, ReqwestTransport};

/// 客户端（所有界面共享）
#[derive(Clone)]
pub struct PosClient {
    config: AppConfig,
    events: EventBus,
    tokens: Arc<TokenManager>,
    gateway: Arc<ApiGateway>,
    auth: Arc<AuthService>,
}

impl PosClient {
    /// 使用配置中的会话文件和 reqwest 传输层
    pub async fn from_config(config: AppConfig) -> Result<Self> {
        let store = Arc::new(FileSessionStore::open(&config.session.store_path).await?);
        let transport = Arc::new(ReqwestTransport::new(config.request_timeout())?);
        Self::with_parts(config, store, transport)
    }

    /// 注入存储与传输层（测试或嵌入使用）
    pub fn with_parts(
        config: AppConfig,
        store: Arc<dyn SessionStore>,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        let events = EventBus::default();

        let refresh_url = join_url(&config.api.base_url, "/token/refresh/")?;

        let tokens = Arc::new(TokenManager::new(
            store,
            transport.clone(),
            refresh_url,
            events.clone(),
        ));
        let gateway = Arc::new(ApiGateway::new(
            &config.api.base_url,
            transport,
            tokens.clone(),
            events.clone(),
        )?);
        let auth = Arc::new(AuthService::new(gateway.clone(), events.clone()));

        Ok(Self {
            config,
            events,
            tokens,
            gateway,
            auth,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn gateway(&self) -> &Arc<ApiGateway> {
        &self.gateway
    }

    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn products(&self) -> ProductService {
        ProductService::new(self.gateway.clone())
    }

    pub fn stock(&self) -> StockService {
        StockService::new(self.gateway.clone())
    }

    pub fn orders(&self) -> OrderService {
        OrderService::new(self.gateway.clone())
    }

    pub fn reports(&self) -> ReportService {
        ReportService::new(self.gateway.clone())
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.gateway.clone())
    }

    /// 按配置启动后台刷新；未启用时返回 `None`
    pub fn start_background_refresh(&self) -> Result<Option<BackgroundRefresh>> {
        if !self.config.session.background_refresh {
            return Ok(None);
        }
        let task = self
            .tokens
            .spawn_background_refresh(self.config.refresh_interval())?;
        Ok(Some(task))
    }
}
