//! 会话事件广播
//! 登录、刷新、登出以及"需要重新登录"都通过事件总线通知界面层

use tokio::sync::broadcast;

/// 会话结束原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutReason {
    /// 用户主动登出
    Logout,
    /// 后端拒绝了刷新令牌
    RefreshRejected,
    /// 需要刷新时没有刷新令牌
    MissingRefreshToken,
}

impl SignOutReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignOutReason::Logout => "logout",
            SignOutReason::RefreshRejected => "refresh_rejected",
            SignOutReason::MissingRefreshToken => "missing_refresh_token",
        }
    }
}

/// 会话事件类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// 登录成功
    SignedIn { username: String },
    /// 访问令牌已更新
    TokenRefreshed,
    /// 凭据已被清除
    SignedOut { reason: SignOutReason },
    /// 请求因缺少凭据被中止，界面应跳转到登录页
    SignInRequired,
}

impl SessionEvent {
    /// 获取事件类型名称
    pub fn event_type(&self) -> &str {
        match self {
            SessionEvent::SignedIn { .. } => "signed_in",
            SessionEvent::TokenRefreshed => "token_refreshed",
            SessionEvent::SignedOut { .. } => "signed_out",
            SessionEvent::SignInRequired => "sign_in_required",
        }
    }
}

/// 事件总线
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    /// 创建新的事件总线
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// 发布事件
    ///
    /// 没有订阅者时事件被丢弃。
    pub fn publish(&self, event: SessionEvent) {
        tracing::debug!(event = event.event_type(), "Session event");
        let _ = self.sender.send(event);
    }

    /// 订阅事件
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
