//! Authentication-related models

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::user::UserRecord;

/// Login request
#[derive(Serialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Login response
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    pub user: UserRecord,
}

/// Token refresh request
#[derive(Serialize)]
pub struct RefreshTokenRequest<'a> {
    pub refresh: &'a str,
}

/// Token refresh response
#[derive(Debug, Deserialize)]
pub struct RefreshTokenResponse {
    pub access: String,
}

/// Error body returned by the backend (`{"detail": "..."}`)
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}
