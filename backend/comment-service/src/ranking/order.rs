//! Total orders used by the ranking queries.
//!
//! Each comparator returns `Ordering::Less` when `a` ranks before `b`. Every
//! order ends in `created_at DESC, id DESC` so pagination is stable even when
//! timestamps collide. The PostgreSQL gateway encodes the same keys in its
//! `ORDER BY` clauses.

use crate::models::{
    Comment, CommentReactionCount, Post, PostActivity, PostReactionCount, RankedComment,
};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

fn newest_first(
    a_created: DateTime<Utc>,
    a_id: i64,
    b_created: DateTime<Utc>,
    b_id: i64,
) -> Ordering {
    b_created.cmp(&a_created).then_with(|| b_id.cmp(&a_id))
}

/// `recent`: created_at DESC, id DESC.
pub fn comment_recency(a: &Comment, b: &Comment) -> Ordering {
    newest_first(a.created_at, a.id, b.created_at, b.id)
}

/// `top`: net_likes DESC, then created_at DESC, id DESC.
pub fn comment_net_likes(a: &RankedComment, b: &RankedComment) -> Ordering {
    b.net_likes
        .cmp(&a.net_likes)
        .then_with(|| comment_recency(&a.comment, &b.comment))
}

pub fn comment_reaction_count(a: &CommentReactionCount, b: &CommentReactionCount) -> Ordering {
    b.reaction_count
        .cmp(&a.reaction_count)
        .then_with(|| comment_recency(&a.comment, &b.comment))
}

/// `by-user`: created_at DESC, id DESC.
pub fn post_recency(a: &Post, b: &Post) -> Ordering {
    newest_first(a.created_at, a.id, b.created_at, b.id)
}

/// `top-liked` / `top-disliked`: reaction count DESC, then created_at DESC, id DESC.
pub fn post_reaction_count(a: &PostReactionCount, b: &PostReactionCount) -> Ordering {
    b.reaction_count
        .cmp(&a.reaction_count)
        .then_with(|| post_recency(&a.post, &b.post))
}

/// `top-activity`: reaction count DESC, latest comment time DESC (posts
/// without comments after any post with one), created_at DESC, id DESC.
pub fn post_activity(a: &PostActivity, b: &PostActivity) -> Ordering {
    b.reaction_count
        .cmp(&a.reaction_count)
        // `None < Some(_)`, so reversing puts comment-less posts last.
        .then_with(|| b.latest_comment_time.cmp(&a.latest_comment_time))
        .then_with(|| post_recency(&a.post, &b.post))
}
