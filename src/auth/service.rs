//! 认证服务：登录、登出、当前用户

use reqwest::Method;
use secrecy::{ExposeSecret, Secret};
use std::sync::Arc;
use validator::Validate;

use crate::error::{ClientError, Result};
use crate::events::{EventBus, SessionEvent, SignOutReason};
use crate::gateway::{ApiGateway, RequestOptions};
use crate::models::auth::{ErrorBody, LoginRequest, LoginResponse};
use crate::models::user::UserRecord;
use crate::session::{SessionCredentials, SessionStore};

pub struct AuthService {
    gateway: Arc<ApiGateway>,
    events: EventBus,
}

impl AuthService {
    pub fn new(gateway: Arc<ApiGateway>, events: EventBus) -> Self {
        Self { gateway, events }
    }

    fn store(&self) -> &Arc<dyn SessionStore> {
        self.gateway.tokens().store()
    }

    /// 用户登录，成功后一次性写入访问令牌、刷新令牌和用户信息
    pub async fn login(&self, username: &str, password: &Secret<String>) -> Result<UserRecord> {
        let req = LoginRequest {
            username: username.trim().to_string(),
            password: password.expose_secret().clone(),
        };
        req.validate()?;

        let options = RequestOptions::json(Method::POST, &req)?.public();
        let response = self.gateway.send("/login/", options).await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let detail = serde_json::from_slice::<ErrorBody>(&body)
                .map(|e| e.detail)
                .unwrap_or_else(|_| "Invalid username or password".to_string());
            tracing::info!(username = %req.username, status = status.as_u16(), "Login rejected");
            return Err(ClientError::LoginFailed(detail));
        }

        let login: LoginResponse = serde_json::from_slice(&body)?;
        let user = login.user.clone();

        self.store()
            .save(SessionCredentials {
                access_token: login.access,
                refresh_token: login.refresh,
                user: login.user,
            })
            .await?;

        tracing::info!(user_id = user.id, username = %user.username, role = %user.role, "Signed in");
        self.events.publish(SessionEvent::SignedIn {
            username: user.username.clone(),
        });
        Ok(user)
    }

    /// 用户登出，清除全部凭据
    pub async fn logout(&self) -> Result<()> {
        let user = self.store().user().await?;
        self.store().clear().await?;

        if let Some(user) = user {
            tracing::info!(username = %user.username, "Signed out");
        }
        self.events.publish(SessionEvent::SignedOut {
            reason: SignOutReason::Logout,
        });
        Ok(())
    }

    pub async fn current_user(&self) -> Result<Option<UserRecord>> {
        self.store().user().await
    }

    pub async fn is_authenticated(&self) -> Result<bool> {
        Ok(self.store().access_token().await?.is_some())
    }
}
