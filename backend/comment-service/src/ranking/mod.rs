/// Ranking engine
///
/// Turns a scope, an ordering mode and a page window into a deterministic
/// page of comments or posts. Aggregation and ordering happen in the gateway
/// (see `order` for the keys); the engine checks that the scope exists,
/// translates the window into offset/limit and records metrics.
use crate::db::{GatewayResult, PersistenceGateway};
use crate::error::{AppError, Result};
use crate::metrics::ranking as metrics;
use crate::models::{
    Comment, CommentReactionCount, CommentScope, Post, PostActivity, PostReactionCount,
    RankedComment, ReactionType,
};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

pub mod order;
pub mod page;

pub use page::PageWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentOrder {
    Recent,
    Top,
}

impl CommentOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentOrder::Recent => "recent",
            CommentOrder::Top => "top",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOrder {
    TopLiked,
    TopDisliked,
    TopActivity,
    ByUser(i64),
}

impl PostOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostOrder::TopLiked => "top-liked",
            PostOrder::TopDisliked => "top-disliked",
            PostOrder::TopActivity => "top-activity",
            PostOrder::ByUser(_) => "by-user",
        }
    }
}

/// A page of comments; `Top` pages carry the computed net likes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RankedComments {
    Recent(Vec<Comment>),
    Top(Vec<RankedComment>),
}

impl RankedComments {
    pub fn len(&self) -> usize {
        match self {
            RankedComments::Recent(items) => items.len(),
            RankedComments::Top(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Comment ids in ranked order.
    pub fn ids(&self) -> Vec<i64> {
        match self {
            RankedComments::Recent(items) => items.iter().map(|c| c.id).collect(),
            RankedComments::Top(items) => items.iter().map(|c| c.comment.id).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RankedPosts {
    Reactions(Vec<PostReactionCount>),
    Activity(Vec<PostActivity>),
    Posts(Vec<Post>),
}

impl RankedPosts {
    pub fn len(&self) -> usize {
        match self {
            RankedPosts::Reactions(items) => items.len(),
            RankedPosts::Activity(items) => items.len(),
            RankedPosts::Posts(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Post ids in ranked order.
    pub fn ids(&self) -> Vec<i64> {
        match self {
            RankedPosts::Reactions(items) => items.iter().map(|p| p.post.id).collect(),
            RankedPosts::Activity(items) => items.iter().map(|p| p.post.id).collect(),
            RankedPosts::Posts(items) => items.iter().map(|p| p.id).collect(),
        }
    }
}

#[derive(Clone)]
pub struct RankingEngine {
    gateway: Arc<dyn PersistenceGateway>,
}

impl RankingEngine {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self { gateway }
    }

    /// Rank the comments on a post or the replies to a comment.
    pub async fn rank_comments(
        &self,
        scope: CommentScope,
        order: CommentOrder,
        window: PageWindow,
    ) -> Result<RankedComments> {
        self.ensure_scope(scope).await?;

        let (offset, limit) = (window.offset(), window.limit());
        let ranked = match order {
            CommentOrder::Recent => RankedComments::Recent(
                timed("comment", order.as_str(), || {
                    self.gateway.find_comments_by_recency(scope, offset, limit)
                })
                .await?,
            ),
            CommentOrder::Top => RankedComments::Top(
                timed("comment", order.as_str(), || {
                    self.gateway
                        .find_comments_with_net_likes(scope, offset, limit)
                })
                .await?,
            ),
        };

        metrics::record_page("comment", ranked.len());
        debug!(
            scope = scope.as_str(),
            scope_id = scope.id(),
            order = order.as_str(),
            page_number = window.page_number(),
            page_size = window.page_size(),
            rows = ranked.len(),
            "Ranked comments"
        );

        Ok(ranked)
    }

    /// Rank posts globally, or list one user's posts newest first.
    pub async fn rank_posts(&self, order: PostOrder, window: PageWindow) -> Result<RankedPosts> {
        let (offset, limit) = (window.offset(), window.limit());
        let mode = order.as_str();

        let ranked = match order {
            PostOrder::TopLiked => RankedPosts::Reactions(
                timed("post", mode, || {
                    self.gateway
                        .find_posts_with_reaction_count(ReactionType::Like, offset, limit)
                })
                .await?,
            ),
            PostOrder::TopDisliked => RankedPosts::Reactions(
                timed("post", mode, || {
                    self.gateway
                        .find_posts_with_reaction_count(ReactionType::Dislike, offset, limit)
                })
                .await?,
            ),
            PostOrder::TopActivity => RankedPosts::Activity(
                timed("post", mode, || {
                    self.gateway.find_posts_by_activity(offset, limit)
                })
                .await?,
            ),
            PostOrder::ByUser(user_id) => {
                if self.gateway.find_user(user_id).await?.is_none() {
                    return Err(AppError::not_found("User", user_id));
                }
                RankedPosts::Posts(
                    timed("post", mode, || {
                        self.gateway.find_posts_by_user(user_id, offset, limit)
                    })
                    .await?,
                )
            }
        };

        metrics::record_page("post", ranked.len());
        debug!(
            order = mode,
            page_number = window.page_number(),
            page_size = window.page_size(),
            rows = ranked.len(),
            "Ranked posts"
        );

        Ok(ranked)
    }

    /// Comments with the most reactions of `kind`, across all posts.
    pub async fn rank_comments_by_reaction(
        &self,
        kind: ReactionType,
        window: PageWindow,
    ) -> Result<Vec<CommentReactionCount>> {
        let mode = match kind {
            ReactionType::Like => "top-liked",
            ReactionType::Dislike => "top-disliked",
        };

        let ranked = timed("comment", mode, || {
            self.gateway
                .find_comments_with_reaction_count(kind, window.offset(), window.limit())
        })
        .await?;

        metrics::record_page("comment", ranked.len());
        debug!(
            order = mode,
            page_number = window.page_number(),
            page_size = window.page_size(),
            rows = ranked.len(),
            "Ranked comments by reaction"
        );

        Ok(ranked)
    }

    async fn ensure_scope(&self, scope: CommentScope) -> Result<()> {
        match scope {
            CommentScope::Post(post_id) => {
                if self.gateway.find_post(post_id).await?.is_none() {
                    return Err(AppError::not_found("Post", post_id));
                }
            }
            CommentScope::Parent(parent_id) => {
                if self.gateway.find_comment(parent_id).await?.is_none() {
                    return Err(AppError::not_found("Comment", parent_id));
                }
            }
        }
        Ok(())
    }
}

async fn timed<T, F, Fut>(target: &str, mode: &str, query: F) -> GatewayResult<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = GatewayResult<T>>,
{
    let start = Instant::now();
    let result = query().await;
    metrics::record_query(target, mode, result.is_ok(), start.elapsed().as_secs_f64());
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryGateway;
    use crate::models::{Reaction, ReactionTarget, User};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap() + Duration::minutes(minute)
    }

    async fn seeded() -> Arc<InMemoryGateway> {
        let gateway = Arc::new(InMemoryGateway::new());
        gateway
            .seed_user(User {
                id: 1,
                username: "alice".into(),
                created_at: at(0),
            })
            .await;
        for (id, minute) in [(10, 1), (11, 2)] {
            gateway
                .seed_post(Post {
                    id,
                    user_id: 1,
                    title: format!("post {}", id),
                    content: "body".into(),
                    created_at: at(minute),
                })
                .await;
        }
        gateway
    }

    async fn comment(gateway: &InMemoryGateway, id: i64, parent_id: Option<i64>, minute: i64) {
        gateway
            .seed_comment(Comment {
                id,
                post_id: 10,
                parent_id,
                user_id: 1,
                content: format!("comment {}", id),
                created_at: at(minute),
            })
            .await;
    }

    async fn react(gateway: &InMemoryGateway, id: i64, target: ReactionTarget, kind: ReactionType) {
        gateway
            .seed_reaction(Reaction {
                id,
                target,
                user_id: 1,
                reaction_type: kind,
                created_at: at(60),
            })
            .await;
    }

    #[tokio::test]
    async fn top_comments_carry_net_likes() {
        let gateway = seeded().await;
        comment(&gateway, 100, None, 5).await;
        comment(&gateway, 101, None, 6).await;
        comment(&gateway, 102, None, 7).await;
        react(&gateway, 500, ReactionTarget::Comment(100), ReactionType::Like).await;
        react(&gateway, 501, ReactionTarget::Comment(100), ReactionType::Like).await;
        react(&gateway, 502, ReactionTarget::Comment(102), ReactionType::Dislike).await;

        let engine = RankingEngine::new(gateway);
        let ranked = engine
            .rank_comments(
                CommentScope::Post(10),
                CommentOrder::Top,
                PageWindow::new(0, 5).unwrap(),
            )
            .await
            .unwrap();

        match ranked {
            RankedComments::Top(items) => {
                let scored: Vec<(i64, i64)> =
                    items.iter().map(|c| (c.comment.id, c.net_likes)).collect();
                assert_eq!(scored, vec![(100, 2), (101, 0), (102, -1)]);
            }
            other => panic!("expected top comments, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn replies_are_scoped_to_parent() {
        let gateway = seeded().await;
        comment(&gateway, 100, None, 5).await;
        comment(&gateway, 101, Some(100), 6).await;
        comment(&gateway, 102, Some(100), 7).await;
        comment(&gateway, 103, Some(101), 8).await;

        let engine = RankingEngine::new(gateway);
        let ranked = engine
            .rank_comments(
                CommentScope::Parent(100),
                CommentOrder::Recent,
                PageWindow::new(0, 5).unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(ranked.ids(), vec![102, 101]);
    }

    #[tokio::test]
    async fn unknown_scope_is_not_found() {
        let engine = RankingEngine::new(seeded().await);
        let window = PageWindow::new(0, 5).unwrap();

        let err = engine
            .rank_comments(CommentScope::Post(999999), CommentOrder::Recent, window)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = engine
            .rank_comments(CommentScope::Parent(999999), CommentOrder::Top, window)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = engine
            .rank_posts(PostOrder::ByUser(999999), window)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn empty_scope_is_an_empty_page() {
        let engine = RankingEngine::new(seeded().await);
        let ranked = engine
            .rank_comments(
                CommentScope::Post(11),
                CommentOrder::Top,
                PageWindow::new(0, 5).unwrap(),
            )
            .await
            .unwrap();
        assert!(ranked.is_empty());
    }

    #[tokio::test]
    async fn top_liked_posts_include_unreacted_posts() {
        let gateway = seeded().await;
        react(&gateway, 500, ReactionTarget::Post(10), ReactionType::Like).await;
        react(&gateway, 501, ReactionTarget::Post(11), ReactionType::Dislike).await;

        let engine = RankingEngine::new(gateway);
        let ranked = engine
            .rank_posts(PostOrder::TopLiked, PageWindow::new(0, 5).unwrap())
            .await
            .unwrap();

        match ranked {
            RankedPosts::Reactions(items) => {
                let counts: Vec<(i64, i64)> =
                    items.iter().map(|p| (p.post.id, p.reaction_count)).collect();
                assert_eq!(counts, vec![(10, 1), (11, 0)]);
            }
            other => panic!("expected reaction counts, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn top_liked_comments_skip_comments_without_likes() {
        let gateway = seeded().await;
        comment(&gateway, 100, None, 5).await;
        comment(&gateway, 101, None, 6).await;
        comment(&gateway, 102, None, 7).await;
        react(&gateway, 500, ReactionTarget::Comment(101), ReactionType::Like).await;
        react(&gateway, 501, ReactionTarget::Comment(100), ReactionType::Like).await;
        react(&gateway, 502, ReactionTarget::Comment(100), ReactionType::Like).await;
        react(&gateway, 503, ReactionTarget::Comment(102), ReactionType::Dislike).await;

        let engine = RankingEngine::new(gateway);
        let ranked = engine
            .rank_comments_by_reaction(ReactionType::Like, PageWindow::new(0, 5).unwrap())
            .await
            .unwrap();

        let counts: Vec<(i64, i64)> = ranked
            .iter()
            .map(|c| (c.comment.id, c.reaction_count))
            .collect();
        assert_eq!(counts, vec![(100, 2), (101, 1)]);
    }
}
