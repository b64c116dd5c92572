/// Reaction service - records likes and dislikes on posts and comments
use crate::db::PersistenceGateway;
use crate::error::{AppError, Result};
use crate::metrics::writes::record_write;
use crate::models::{NewReaction, Reaction, ReactionRequest, ReactionTarget};
use crate::services::required;
use std::sync::Arc;
use validator::Validate;

#[derive(Clone)]
pub struct ReactionService {
    gateway: Arc<dyn PersistenceGateway>,
}

impl ReactionService {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self { gateway }
    }

    /// Record a reaction. Repeat reactions from the same user are stored as
    /// separate rows.
    pub async fn react(
        &self,
        target: ReactionTarget,
        request: ReactionRequest,
    ) -> Result<Reaction> {
        request.validate()?;
        let user_id = required(request.user_id, "user_id: User ID cannot be null")?;
        let reaction_type = required(
            request.resolved_type(),
            "type: Reaction type must be LIKE or DISLIKE",
        )?;

        let exists = match target {
            ReactionTarget::Post(id) => self.gateway.find_post(id).await?.is_some(),
            ReactionTarget::Comment(id) => self.gateway.find_comment(id).await?.is_some(),
        };
        if !exists {
            return Err(AppError::not_found(target.entity_name(), target.id()));
        }
        if self.gateway.find_user(user_id).await?.is_none() {
            return Err(AppError::not_found("User", user_id));
        }

        let result = self
            .gateway
            .insert_reaction(NewReaction {
                target,
                user_id,
                reaction_type,
            })
            .await;
        record_write("reaction", result.is_ok());

        let reaction = result?;
        tracing::info!(
            reaction_id = reaction.id,
            target = target.entity_name(),
            target_id = target.id(),
            reaction_type = %reaction_type,
            "Reaction recorded"
        );
        Ok(reaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryGateway;
    use crate::models::{Comment, Post, ReactionType, User};
    use chrono::Utc;

    async fn gateway() -> Arc<InMemoryGateway> {
        let gateway = Arc::new(InMemoryGateway::new());
        gateway
            .seed_user(User {
                id: 1,
                username: "alice".into(),
                created_at: Utc::now(),
            })
            .await;
        gateway
            .seed_post(Post {
                id: 2,
                user_id: 1,
                title: "A post".into(),
                content: "body".into(),
                created_at: Utc::now(),
            })
            .await;
        gateway
            .seed_comment(Comment {
                id: 3,
                post_id: 2,
                parent_id: None,
                user_id: 1,
                content: "a comment".into(),
                created_at: Utc::now(),
            })
            .await;
        gateway
    }

    fn like(user_id: i64) -> ReactionRequest {
        ReactionRequest {
            user_id: Some(user_id),
            reaction_type: Some(ReactionType::Like),
            is_like: None,
        }
    }

    #[tokio::test]
    async fn duplicate_reactions_are_kept() {
        let service = ReactionService::new(gateway().await);

        let first = service.react(ReactionTarget::Comment(3), like(1)).await.unwrap();
        let second = service.react(ReactionTarget::Comment(3), like(1)).await.unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(second.reaction_type, ReactionType::Like);
    }

    #[tokio::test]
    async fn legacy_boolean_form_is_accepted() {
        let service = ReactionService::new(gateway().await);
        let reaction = service
            .react(
                ReactionTarget::Post(2),
                ReactionRequest {
                    user_id: Some(1),
                    reaction_type: None,
                    is_like: Some(false),
                },
            )
            .await
            .unwrap();
        assert_eq!(reaction.reaction_type, ReactionType::Dislike);
        assert_eq!(reaction.target, ReactionTarget::Post(2));
    }

    #[tokio::test]
    async fn missing_type_is_a_validation_error() {
        let gateway = gateway().await;
        let service = ReactionService::new(gateway.clone());
        let err = service
            .react(
                ReactionTarget::Post(2),
                ReactionRequest {
                    user_id: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn missing_target_or_user_is_not_found() {
        let service = ReactionService::new(gateway().await);

        let err = service
            .react(ReactionTarget::Post(999999), like(1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = service
            .react(ReactionTarget::Comment(3), like(999999))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
