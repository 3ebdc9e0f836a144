//! User domain models

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Signed-in user as returned by the login endpoint and cached in the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub role: String,
}

/// Create user request (user management screen)
#[derive(Clone, Serialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 150))]
    pub username: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 32))]
    pub role: String,
}
