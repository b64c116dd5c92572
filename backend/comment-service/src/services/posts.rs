/// Post service - handles post creation and retrieval
use crate::db::PersistenceGateway;
use crate::error::{AppError, Result};
use crate::metrics::writes::record_write;
use crate::models::{CreatePostRequest, NewPost, Post};
use crate::services::{require_text, required};
use std::sync::Arc;
use validator::Validate;

#[derive(Clone)]
pub struct PostService {
    gateway: Arc<dyn PersistenceGateway>,
}

impl PostService {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self { gateway }
    }

    /// Create a post owned by an existing user.
    pub async fn create_post(&self, request: CreatePostRequest) -> Result<Post> {
        request.validate()?;
        require_text("title", &request.title, "Post Title cannot be blank")?;
        require_text("content", &request.content, "Post Content cannot be blank")?;
        let user_id = required(request.user_id, "user_id: User ID cannot be null")?;

        if self.gateway.find_user(user_id).await?.is_none() {
            tracing::warn!(user_id, "Post rejected: user not found");
            return Err(AppError::not_found("User", user_id));
        }

        let result = self
            .gateway
            .insert_post(NewPost {
                user_id,
                title: request.title,
                content: request.content,
            })
            .await;
        record_write("post", result.is_ok());

        let post = result?;
        tracing::info!(post_id = post.id, user_id, "Post created");
        Ok(post)
    }

    pub async fn get_post(&self, post_id: i64) -> Result<Post> {
        self.gateway
            .find_post(post_id)
            .await?
            .ok_or_else(|| AppError::not_found("Post", post_id))
    }
}
