/// Data models for comment-service
///
/// This module defines:
/// - Entities: User, Post, Comment, Reaction as stored rows
/// - Ranked projections: entities paired with the aggregates used to order them
/// - Request bodies accepted by the HTTP layer
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A comment on a post. `parent_id` is `None` for top-level comments and
/// points at another comment row for replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub parent_id: Option<i64>,
    pub user_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReactionType {
    Like,
    Dislike,
}

impl ReactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionType::Like => "LIKE",
            ReactionType::Dislike => "DISLIKE",
        }
    }

}

impl fmt::Display for ReactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a reaction points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ReactionTarget {
    Post(i64),
    Comment(i64),
}

impl ReactionTarget {
    pub fn id(&self) -> i64 {
        match self {
            ReactionTarget::Post(id) | ReactionTarget::Comment(id) => *id,
        }
    }

    pub fn entity_name(&self) -> &'static str {
        match self {
            ReactionTarget::Post(_) => "Post",
            ReactionTarget::Comment(_) => "Comment",
        }
    }
}

/// Bounds a comment ranking query: the comments of a post, or the replies
/// to one comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentScope {
    Post(i64),
    Parent(i64),
}

impl CommentScope {
    pub fn id(&self) -> i64 {
        match self {
            CommentScope::Post(id) | CommentScope::Parent(id) => *id,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CommentScope::Post(_) => "post",
            CommentScope::Parent(_) => "parent",
        }
    }

    pub fn contains(&self, comment: &Comment) -> bool {
        match self {
            CommentScope::Post(post_id) => comment.post_id == *post_id,
            CommentScope::Parent(parent_id) => comment.parent_id == Some(*parent_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub id: i64,
    pub target: ReactionTarget,
    pub user_id: i64,
    pub reaction_type: ReactionType,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Ranked projections
// ============================================================================

/// Comment paired with its net likes (LIKE count minus DISLIKE count).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedComment {
    #[serde(flatten)]
    pub comment: Comment,
    pub net_likes: i64,
}

/// Comment paired with the number of reactions of one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentReactionCount {
    #[serde(flatten)]
    pub comment: Comment,
    pub reaction_count: i64,
}

/// Post paired with the number of reactions of one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostReactionCount {
    #[serde(flatten)]
    pub post: Post,
    pub reaction_count: i64,
}

/// Post paired with its activity aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostActivity {
    #[serde(flatten)]
    pub post: Post,
    pub reaction_count: i64,
    pub comment_count: i64,
    pub latest_comment_time: Option<DateTime<Utc>>,
}

// ============================================================================
// Insert payloads (already validated, foreign keys resolved)
// ============================================================================

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: i64,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub parent_id: Option<i64>,
    pub user_id: i64,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct NewReaction {
    pub target: ReactionTarget,
    pub user_id: i64,
    pub reaction_type: ReactionType,
}

// ============================================================================
// Request bodies
// ============================================================================

/// Request body for adding a comment or a reply
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(required(message = "Post ID cannot be null"))]
    #[serde(alias = "postId")]
    pub post_id: Option<i64>,

    /// Comment being replied to, if any
    #[serde(default, alias = "parentId")]
    pub parent_id: Option<i64>,

    #[validate(required(message = "User ID cannot be null"))]
    #[serde(alias = "userId")]
    pub user_id: Option<i64>,

    #[validate(length(min = 1, message = "Comment content cannot be empty"))]
    #[serde(default)]
    pub content: String,
}

/// Request body for creating a post
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct CreatePostRequest {
    #[validate(required(message = "User ID cannot be null"))]
    #[serde(alias = "userId")]
    pub user_id: Option<i64>,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Post Title must be between 1 and 255 characters"
    ))]
    #[serde(default)]
    pub title: String,

    #[validate(length(min = 1, message = "Post Content cannot be empty"))]
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Username must be between 1 and 255 characters"
    ))]
    #[serde(default)]
    pub username: String,
}

/// Request body for liking or disliking a post or comment
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct ReactionRequest {
    #[validate(required(message = "User ID cannot be null"))]
    #[serde(alias = "userId")]
    pub user_id: Option<i64>,

    /// `LIKE` or `DISLIKE`
    #[serde(default, rename = "type", alias = "reaction_type")]
    pub reaction_type: Option<ReactionType>,

    /// Legacy boolean form: true for like, false for dislike
    #[serde(default, alias = "isLike")]
    pub is_like: Option<bool>,
}

impl ReactionRequest {
    /// Explicit `type` wins over the boolean form.
    pub fn resolved_type(&self) -> Option<ReactionType> {
        self.reaction_type.or(match self.is_like {
            Some(true) => Some(ReactionType::Like),
            Some(false) => Some(ReactionType::Dislike),
            None => None,
        })
    }
}
