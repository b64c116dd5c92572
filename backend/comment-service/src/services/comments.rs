/// Comment service - handles comment and reply creation and retrieval
use crate::db::PersistenceGateway;
use crate::error::{AppError, Result};
use crate::metrics::writes::record_write;
use crate::models::{Comment, CreateCommentRequest, NewComment};
use crate::services::{require_text, required};
use std::sync::Arc;
use validator::Validate;

#[derive(Clone)]
pub struct CommentService {
    gateway: Arc<dyn PersistenceGateway>,
}

impl CommentService {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self { gateway }
    }

    /// Add a top-level comment, or a reply when `parent_id` is set.
    ///
    /// Field validation runs before the gateway is touched. The parent is
    /// not required to belong to the same post.
    pub async fn add_comment(&self, request: CreateCommentRequest) -> Result<Comment> {
        request.validate()?;
        require_text("content", &request.content, "Comment content cannot be empty")?;
        let post_id = required(request.post_id, "post_id: Post ID cannot be null")?;
        let user_id = required(request.user_id, "user_id: User ID cannot be null")?;

        tracing::debug!(post_id, user_id, parent_id = ?request.parent_id, "Adding comment");

        if self.gateway.find_post(post_id).await?.is_none() {
            return Err(AppError::not_found("Post", post_id));
        }
        if self.gateway.find_user(user_id).await?.is_none() {
            return Err(AppError::not_found("User", user_id));
        }
        if let Some(parent_id) = request.parent_id {
            if self.gateway.find_comment(parent_id).await?.is_none() {
                return Err(AppError::not_found("Comment", parent_id));
            }
        }

        let result = self
            .gateway
            .insert_comment(NewComment {
                post_id,
                parent_id: request.parent_id,
                user_id,
                content: request.content,
            })
            .await;
        record_write("comment", result.is_ok());

        let comment = result?;
        tracing::info!(
            comment_id = comment.id,
            post_id,
            is_reply = comment.parent_id.is_some(),
            "Comment added"
        );
        Ok(comment)
    }

    pub async fn get_comment(&self, comment_id: i64) -> Result<Comment> {
        self.gateway
            .find_comment(comment_id)
            .await?
            .ok_or_else(|| AppError::not_found("Comment", comment_id))
    }
}
