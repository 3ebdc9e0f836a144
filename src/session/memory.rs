//! 内存会话存储（测试与嵌入式场景）

use super::{SessionCredentials, SessionStore};
use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: RwLock<Option<SessionCredentials>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以已有会话初始化
    pub fn with_credentials(credentials: SessionCredentials) -> Self {
        Self {
            inner: RwLock::new(Some(credentials)),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<SessionCredentials>> {
        Ok(self.inner.read().await.clone())
    }

    async fn save(&self, credentials: SessionCredentials) -> Result<()> {
        *self.inner.write().await = Some(credentials);
        Ok(())
    }

    async fn replace_access_token(&self, access_token: &str) -> Result<bool> {
        let mut guard = self.inner.write().await;
        match guard.as_mut() {
            Some(credentials) => {
                credentials.access_token = access_token.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn clear(&self) -> Result<()> {
        *self.inner.write().await = None;
        Ok(())
    }
}
