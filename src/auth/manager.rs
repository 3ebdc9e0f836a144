//! 令牌管理器：令牌解析、单飞刷新、后台定时刷新

use chrono::Utc;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Request, Url};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::auth::token::{self, TokenFreshness};
use crate::error::{ClientError, Result};
use crate::events::{EventBus, SessionEvent, SignOutReason};
use crate::models::auth::{RefreshTokenRequest, RefreshTokenResponse};
use crate::session::SessionStore;
use crate::transport::HttpTransport;

/// 令牌管理器
///
/// 所有刷新都经过同一把刷新锁：等锁的调用方拿到锁后会重新读取存储，
/// 若令牌已被其他调用方刷新则直接复用，不再访问刷新接口。
pub struct TokenManager {
    store: Arc<dyn SessionStore>,
    transport: Arc<dyn HttpTransport>,
    refresh_url: Url,
    events: EventBus,
    refresh_lock: Mutex<()>,
}

impl TokenManager {
    pub fn new(
        store: Arc<dyn SessionStore>,
        transport: Arc<dyn HttpTransport>,
        refresh_url: Url,
        events: EventBus,
    ) -> Self {
        Self {
            store,
            transport,
            refresh_url,
            events,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// 解析一个可用的访问令牌
    ///
    /// `Ok(None)` 表示没有可用凭据（未登录、刷新被拒绝或缺少刷新令牌）；
    /// 刷新请求本身的网络错误以 `Err(Transport)` 返回，凭据保留。
    pub async fn resolve(&self) -> Result<Option<String>> {
        let Some(access) = self.store.access_token().await? else {
            debug!("No access token stored");
            return Ok(None);
        };

        match token::freshness(&access, Utc::now()) {
            TokenFreshness::Fresh => return Ok(Some(access)),
            TokenFreshness::Opaque => {
                debug!("Access token has no readable expiry, using it as-is");
                return Ok(Some(access));
            }
            TokenFreshness::Stale => {}
        }

        let _guard = self.refresh_lock.lock().await;

        // 等锁期间会话可能已被刷新或清除
        let Some(access) = self.store.access_token().await? else {
            return Ok(None);
        };
        if !token::needs_refresh(&access) {
            debug!("Access token was refreshed by a concurrent caller");
            return Ok(Some(access));
        }

        debug!("Access token expires within threshold, refreshing");
        match self.refresh_locked().await {
            Ok(access) => Ok(Some(access)),
            Err(ClientError::RefreshRejected(_)) | Err(ClientError::Unauthenticated) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// 强制刷新访问令牌（不检查有效期）
    pub async fn refresh(&self) -> Result<String> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    /// 调用方必须持有刷新锁
    async fn refresh_locked(&self) -> Result<String> {
        let Some(refresh_token) = self.store.refresh_token().await? else {
            warn!("Refresh needed but no refresh token stored");
            self.sign_out(SignOutReason::MissingRefreshToken).await?;
            return Err(ClientError::Unauthenticated);
        };

        let request = self.refresh_request(&refresh_token)?;
        let response = self.transport.execute(request).await.map_err(|e| {
            metrics::counter!("pos_token_refresh_total", "outcome" => "transport_error")
                .increment(1);
            e
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Refresh token rejected, clearing session");
            metrics::counter!("pos_token_refresh_total", "outcome" => "rejected").increment(1);
            self.sign_out(SignOutReason::RefreshRejected).await?;
            return Err(ClientError::RefreshRejected(format!(
                "refresh endpoint returned {}",
                status
            )));
        }

        let body = response.bytes().await?;
        let access = match serde_json::from_slice::<RefreshTokenResponse>(&body) {
            Ok(parsed) if !parsed.access.is_empty() => parsed.access,
            _ => {
                warn!("Refresh response carried no access token, clearing session");
                metrics::counter!("pos_token_refresh_total", "outcome" => "rejected").increment(1);
                self.sign_out(SignOutReason::RefreshRejected).await?;
                return Err(ClientError::RefreshRejected(
                    "refresh response carried no access token".to_string(),
                ));
            }
        };

        if !self.store.replace_access_token(&access).await? {
            // 刷新过程中用户已登出
            debug!("Session ended while refreshing, discarding new access token");
            return Err(ClientError::Unauthenticated);
        }

        metrics::counter!("pos_token_refresh_total", "outcome" => "success").increment(1);
        info!("Access token refreshed");
        self.events.publish(SessionEvent::TokenRefreshed);
        Ok(access)
    }

    fn refresh_request(&self, refresh_token: &str) -> Result<Request> {
        let body = serde_json::to_vec(&RefreshTokenRequest {
            refresh: refresh_token,
        })?;

        let mut request = Request::new(Method::POST, self.refresh_url.clone());
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        *request.body_mut() = Some(body.into());
        Ok(request)
    }

    async fn sign_out(&self, reason: SignOutReason) -> Result<()> {
        self.store.clear().await?;
        self.events.publish(SessionEvent::SignedOut { reason });
        Ok(())
    }

    /// 启动后台定时刷新
    ///
    /// 每个周期若存在会话则强制刷新一次。返回的句柄被丢弃时循环随之结束。
    /// 周期为零时返回 `Config` 错误。
    pub fn spawn_background_refresh(self: &Arc<Self>, period: Duration) -> Result<BackgroundRefresh> {
        if period.is_zero() {
            return Err(ClientError::Config(
                "background refresh period must be greater than zero".to_string(),
            ));
        }

        let manager = Arc::clone(self);
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            info!(period_ms = period.as_millis() as u64, "Background token refresh started");
            loop {
                tokio::select! {
                    _ = ticker.tick() => manager.background_tick().await,
                    _ = shutdown_rx.changed() => break,
                }
            }
            debug!("Background token refresh stopped");
        });

        Ok(BackgroundRefresh { shutdown, handle })
    }

    async fn background_tick(&self) {
        match self.store.refresh_token().await {
            Ok(Some(_)) => {}
            Ok(None) => {
                debug!("No session, skipping background refresh");
                return;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read session store");
                return;
            }
        }

        match self.refresh().await {
            Ok(_) => debug!("Background refresh succeeded"),
            Err(ClientError::RefreshRejected(reason)) => {
                warn!(reason = %reason, "Background refresh rejected, session cleared")
            }
            Err(e) => warn!(error = %e, "Background refresh failed"),
        }
    }
}

/// 后台刷新任务句柄
pub struct BackgroundRefresh {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl BackgroundRefresh {
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// 停止定时循环；正在进行的刷新会执行完毕
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            warn!(error = %e, "Background refresh task ended abnormally");
        }
    }
}
