/// Database access layer
///
/// This module provides:
/// - `PersistenceGateway`: the storage contract the ranking engine and the
///   services are written against
/// - `PgGateway`: PostgreSQL implementation (sqlx) plus pool bootstrap and
///   embedded migrations
/// - `InMemoryGateway`: process-local implementation used by tests and by
///   `STORAGE_BACKEND=memory`
use crate::models::{
    Comment, CommentReactionCount, CommentScope, NewComment, NewPost, NewReaction, NewUser, Post,
    PostActivity, PostReactionCount, RankedComment, Reaction, ReactionType, User,
};
use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
pub mod pg;

pub use memory::InMemoryGateway;
pub use pg::{create_pool, PgGateway, MIGRATOR};

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A foreign key or check constraint rejected a write, typically because
    /// a referenced row vanished between lookup and insert.
    #[error("constraint violated: {0}")]
    Constraint(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Storage contract. Implementations must return rows in the orders defined
/// by `crate::ranking::order`, applying `offset`/`limit` after ordering.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Cheap round trip used by health checks.
    async fn ping(&self) -> GatewayResult<()>;

    async fn find_user(&self, id: i64) -> GatewayResult<Option<User>>;

    async fn find_post(&self, id: i64) -> GatewayResult<Option<Post>>;

    async fn find_comment(&self, id: i64) -> GatewayResult<Option<Comment>>;

    async fn insert_user(&self, user: NewUser) -> GatewayResult<User>;

    async fn insert_post(&self, post: NewPost) -> GatewayResult<Post>;

    async fn insert_comment(&self, comment: NewComment) -> GatewayResult<Comment>;

    async fn insert_reaction(&self, reaction: NewReaction) -> GatewayResult<Reaction>;

    /// Comments in scope, `created_at DESC, id DESC`.
    async fn find_comments_by_recency(
        &self,
        scope: CommentScope,
        offset: i64,
        limit: i64,
    ) -> GatewayResult<Vec<Comment>>;

    /// Comments in scope with net likes, `net_likes DESC, created_at DESC, id DESC`.
    async fn find_comments_with_net_likes(
        &self,
        scope: CommentScope,
        offset: i64,
        limit: i64,
    ) -> GatewayResult<Vec<RankedComment>>;

    /// Comments having at least one reaction of `kind`, by that count.
    async fn find_comments_with_reaction_count(
        &self,
        kind: ReactionType,
        offset: i64,
        limit: i64,
    ) -> GatewayResult<Vec<CommentReactionCount>>;

    /// Every post with its count of `kind` reactions (zero included).
    async fn find_posts_with_reaction_count(
        &self,
        kind: ReactionType,
        offset: i64,
        limit: i64,
    ) -> GatewayResult<Vec<PostReactionCount>>;

    /// Every post with reaction/comment aggregates, in activity order.
    async fn find_posts_by_activity(
        &self,
        offset: i64,
        limit: i64,
    ) -> GatewayResult<Vec<PostActivity>>;

    /// Posts owned by `user_id`, `created_at DESC, id DESC`.
    async fn find_posts_by_user(
        &self,
        user_id: i64,
        offset: i64,
        limit: i64,
    ) -> GatewayResult<Vec<Post>>;
}
