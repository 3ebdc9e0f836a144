//! 用户管理服务

use reqwest::Method;
use std::sync::Arc;
use validator::Validate;

use crate::error::Result;
use crate::gateway::ApiGateway;
use crate::models::user::{CreateUserRequest, UserRecord};

pub struct UserService {
    gateway: Arc<ApiGateway>,
}

impl UserService {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Vec<UserRecord>> {
        self.gateway.get_json("/users/").await
    }

    pub async fn create(&self, req: &CreateUserRequest) -> Result<UserRecord> {
        req.validate()?;
        let user: UserRecord = self.gateway.send_json(Method::POST, "/users/", req).await?;
        tracing::info!(user_id = user.id, username = %user.username, role = %user.role, "User created");
        Ok(user)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.gateway.delete(&format!("/users/{}/", id)).await
    }
}
