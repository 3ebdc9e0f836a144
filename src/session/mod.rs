//! Session credential storage
//!
//! Every path that touches the access token, refresh token or cached user
//! record goes through [`SessionStore`]. Implementations must keep the two
//! tokens together: either both are present or neither is.

mod file;
mod memory;

pub use file::FileSessionStore;
pub use memory::MemorySessionStore;

use crate::error::Result;
use crate::models::user::UserRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 会话凭据集合（登录时一次性写入）
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCredentials {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserRecord,
}

impl fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredentials")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Full credential set, if a session exists.
    async fn load(&self) -> Result<Option<SessionCredentials>>;

    /// Replace the whole set (login).
    async fn save(&self, credentials: SessionCredentials) -> Result<()>;

    /// Overwrite only the access token. Returns `false` and changes nothing
    /// when no session exists.
    async fn replace_access_token(&self, access_token: &str) -> Result<bool>;

    /// Remove access token, refresh token and user record together.
    async fn clear(&self) -> Result<()>;

    async fn access_token(&self) -> Result<Option<String>> {
        Ok(self.load().await?.map(|c| c.access_token))
    }

    async fn refresh_token(&self) -> Result<Option<String>> {
        Ok(self.load().await?.map(|c| c.refresh_token))
    }

    async fn user(&self) -> Result<Option<UserRecord>> {
        Ok(self.load().await?.map(|c| c.user))
    }
}
