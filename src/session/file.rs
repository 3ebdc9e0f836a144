//! 文件会话存储
//! 以扁平键值 JSON 持久化：accessToken / refreshToken / user（JSON 字符串）

use super::{SessionCredentials, SessionStore};
use crate::error::Result;
use crate::models::user::UserRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// 磁盘上的键值布局
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredEntries {
    #[serde(rename = "accessToken", default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(rename = "refreshToken", default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<String>,
}

/// 持久化会话存储
///
/// 内存中缓存一份凭据，每次修改后整体写回文件（先写临时文件再重命名）。
pub struct FileSessionStore {
    path: PathBuf,
    cache: RwLock<Option<SessionCredentials>>,
}

impl FileSessionStore {
    /// 打开存储文件，文件不存在时视为无会话
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let credentials = read_credentials(&path).await?;

        tracing::debug!(
            path = %path.display(),
            has_session = credentials.is_some(),
            "Session store opened"
        );

        Ok(Self {
            path,
            cache: RwLock::new(credentials),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, credentials: &SessionCredentials) -> Result<()> {
        let entries = StoredEntries {
            access_token: Some(credentials.access_token.clone()),
            refresh_token: Some(credentials.refresh_token.clone()),
            user: Some(serde_json::to_string(&credentials.user)?),
        };
        let data = serde_json::to_vec_pretty(&entries)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, data).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

async fn read_credentials(path: &Path) -> Result<Option<SessionCredentials>> {
    let data = match tokio::fs::read(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let entries: StoredEntries = match serde_json::from_slice(&data) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Corrupt session file, ignoring");
            return Ok(None);
        }
    };

    // 两个令牌必须同时存在
    let (Some(access_token), Some(refresh_token)) = (entries.access_token, entries.refresh_token)
    else {
        tracing::warn!(path = %path.display(), "Incomplete session file, ignoring");
        return Ok(None);
    };

    let user = match entries.user.as_deref().map(serde_json::from_str::<UserRecord>) {
        Some(Ok(user)) => user,
        _ => {
            tracing::warn!(path = %path.display(), "Session file has no usable user record, ignoring");
            return Ok(None);
        }
    };

    Ok(Some(SessionCredentials {
        access_token,
        refresh_token,
        user,
    }))
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<SessionCredentials>> {
        Ok(self.cache.read().await.clone())
    }

    async fn save(&self, credentials: SessionCredentials) -> Result<()> {
        let mut guard = self.cache.write().await;
        self.persist(&credentials).await?;
        *guard = Some(credentials);
        Ok(())
    }

    async fn replace_access_token(&self, access_token: &str) -> Result<bool> {
        let mut guard = self.cache.write().await;
        let Some(current) = guard.as_ref() else {
            return Ok(false);
        };

        let updated = SessionCredentials {
            access_token: access_token.to_string(),
            ..current.clone()
        };
        self.persist(&updated).await?;
        *guard = Some(updated);
        Ok(true)
    }

    async fn clear(&self) -> Result<()> {
        let mut guard = self.cache.write().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        *guard = None;
        Ok(())
    }
}
