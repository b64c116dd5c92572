/// User service - account creation and lookup
use crate::db::PersistenceGateway;
use crate::error::{AppError, Result};
use crate::metrics::writes::record_write;
use crate::models::{CreateUserRequest, NewUser, User};
use crate::services::require_text;
use std::sync::Arc;
use validator::Validate;

#[derive(Clone)]
pub struct UserService {
    gateway: Arc<dyn PersistenceGateway>,
}

impl UserService {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self { gateway }
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> Result<User> {
        request.validate()?;
        require_text("username", &request.username, "Username cannot be blank")?;

        let result = self
            .gateway
            .insert_user(NewUser {
                username: request.username.trim().to_string(),
            })
            .await;
        record_write("user", result.is_ok());

        let user = result?;
        tracing::info!(user_id = user.id, "User created");
        Ok(user)
    }

    pub async fn get_user(&self, user_id: i64) -> Result<User> {
        self.gateway
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User", user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryGateway;

    #[tokio::test]
    async fn create_then_get() {
        let service = UserService::new(Arc::new(InMemoryGateway::new()));

        let user = service
            .create_user(CreateUserRequest {
                username: "  dora ".into(),
            })
            .await
            .unwrap();
        assert_eq!(user.username, "dora");

        let fetched = service.get_user(user.id).await.unwrap();
        assert_eq!(fetched, user);
    }

    #[tokio::test]
    async fn blank_username_is_rejected() {
        let service = UserService::new(Arc::new(InMemoryGateway::new()));
        let err = service
            .create_user(CreateUserRequest {
                username: "   ".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let service = UserService::new(Arc::new(InMemoryGateway::new()));
        let err = service.get_user(999999).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
