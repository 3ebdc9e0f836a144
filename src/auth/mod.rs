//! Authentication: token inspection, refresh management and sign-in

pub mod manager;
pub mod service;
pub mod token;

pub use manager::{BackgroundRefresh, TokenManager};
pub use service::AuthService;
pub use token::{decode_expiry, TokenFreshness, REFRESH_THRESHOLD_SECS};
