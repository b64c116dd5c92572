//! PostgreSQL gateway.
//!
//! Ranking queries compute their aggregates in one grouped pass per query
//! (no per-row subqueries against the reaction tables) and always finish the
//! `ORDER BY` with `created_at DESC, id DESC`.

use super::{GatewayError, GatewayResult, PersistenceGateway};
use crate::config::DatabaseConfig;
use crate::models::{
    Comment, CommentReactionCount, CommentScope, NewComment, NewPost, NewReaction, NewUser, Post,
    PostActivity, PostReactionCount, RankedComment, Reaction, ReactionTarget, ReactionType, User,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, error, info};

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Create a PostgreSQL connection pool and verify it with a round trip.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    debug!(
        "Creating database pool: max={}, min={}, acquire_timeout={}s, idle_timeout={}s",
        config.max_connections,
        config.min_connections,
        config.acquire_timeout_secs,
        config.idle_timeout_secs
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .test_before_acquire(true)
        .connect(&config.url)
        .await?;

    match tokio::time::timeout(
        Duration::from_secs(config.connect_timeout_secs),
        sqlx::query("SELECT 1").execute(&pool),
    )
    .await
    {
        Ok(Ok(_)) => {
            info!("Database pool created and verified successfully");
            Ok(pool)
        }
        Ok(Err(e)) => {
            error!(error = %e, "Database connection verification failed");
            Err(e)
        }
        Err(_) => {
            error!(
                timeout_secs = config.connect_timeout_secs,
                "Database connection verification timeout"
            );
            Err(sqlx::Error::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "Database verification timeout",
            )))
        }
    }
}

fn write_error(err: sqlx::Error) -> GatewayError {
    let is_fk_violation = err
        .as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == FOREIGN_KEY_VIOLATION)
        .unwrap_or(false);

    if is_fk_violation {
        GatewayError::Constraint(err.to_string())
    } else {
        GatewayError::Database(err)
    }
}

fn scope_column(scope: CommentScope) -> &'static str {
    match scope {
        CommentScope::Post(_) => "post_id",
        CommentScope::Parent(_) => "parent_id",
    }
}

#[derive(sqlx::FromRow)]
struct RankedCommentRow {
    id: i64,
    post_id: i64,
    parent_id: Option<i64>,
    user_id: i64,
    content: String,
    created_at: DateTime<Utc>,
    score: i64,
}

impl RankedCommentRow {
    fn into_parts(self) -> (Comment, i64) {
        (
            Comment {
                id: self.id,
                post_id: self.post_id,
                parent_id: self.parent_id,
                user_id: self.user_id,
                content: self.content,
                created_at: self.created_at,
            },
            self.score,
        )
    }
}

#[derive(sqlx::FromRow)]
struct PostAggregateRow {
    id: i64,
    user_id: i64,
    title: String,
    content: String,
    created_at: DateTime<Utc>,
    reaction_count: i64,
    comment_count: i64,
    latest_comment_time: Option<DateTime<Utc>>,
}

impl PostAggregateRow {
    fn post(&self) -> Post {
        Post {
            id: self.id,
            user_id: self.user_id,
            title: self.title.clone(),
            content: self.content.clone(),
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ReactionRow {
    id: i64,
    created_at: DateTime<Utc>,
}

/// sqlx-backed gateway over the schema in `migrations/`.
#[derive(Clone)]
pub struct PgGateway {
    pool: PgPool,
}

impl PgGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PersistenceGateway for PgGateway {
    async fn ping(&self) -> GatewayResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_user(&self, id: i64) -> GatewayResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_post(&self, id: i64) -> GatewayResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, user_id, title, content, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn find_comment(&self, id: i64) -> GatewayResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, parent_id, user_id, content, created_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn insert_user(&self, user: NewUser) -> GatewayResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username)
            VALUES ($1)
            RETURNING id, username, created_at
            "#,
        )
        .bind(user.username)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)?;

        Ok(user)
    }

    async fn insert_post(&self, post: NewPost) -> GatewayResult<Post> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (user_id, title, content)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, title, content, created_at
            "#,
        )
        .bind(post.user_id)
        .bind(post.title)
        .bind(post.content)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)?;

        Ok(post)
    }

    async fn insert_comment(&self, comment: NewComment) -> GatewayResult<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (post_id, parent_id, user_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, post_id, parent_id, user_id, content, created_at
            "#,
        )
        .bind(comment.post_id)
        .bind(comment.parent_id)
        .bind(comment.user_id)
        .bind(comment.content)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)?;

        Ok(comment)
    }

    async fn insert_reaction(&self, reaction: NewReaction) -> GatewayResult<Reaction> {
        let sql = match reaction.target {
            ReactionTarget::Post(_) => {
                r#"
                INSERT INTO post_reactions (post_id, user_id, type)
                VALUES ($1, $2, $3)
                RETURNING id, created_at
                "#
            }
            ReactionTarget::Comment(_) => {
                r#"
                INSERT INTO comment_reactions (comment_id, user_id, type)
                VALUES ($1, $2, $3)
                RETURNING id, created_at
                "#
            }
        };

        let row = sqlx::query_as::<_, ReactionRow>(sql)
            .bind(reaction.target.id())
            .bind(reaction.user_id)
            .bind(reaction.reaction_type.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(write_error)?;

        Ok(Reaction {
            id: row.id,
            target: reaction.target,
            user_id: reaction.user_id,
            reaction_type: reaction.reaction_type,
            created_at: row.created_at,
        })
    }

    async fn find_comments_by_recency(
        &self,
        scope: CommentScope,
        offset: i64,
        limit: i64,
    ) -> GatewayResult<Vec<Comment>> {
        let query = format!(
            r#"
            SELECT id, post_id, parent_id, user_id, content, created_at
            FROM comments
            WHERE {} = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
            scope_column(scope)
        );

        let comments = sqlx::query_as::<_, Comment>(&query)
            .bind(scope.id())
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(comments)
    }

    async fn find_comments_with_net_likes(
        &self,
        scope: CommentScope,
        offset: i64,
        limit: i64,
    ) -> GatewayResult<Vec<RankedComment>> {
        let query = format!(
            r#"
            SELECT c.id, c.post_id, c.parent_id, c.user_id, c.content, c.created_at,
                   COALESCE(SUM(
                       CASE r.type WHEN 'LIKE' THEN 1 WHEN 'DISLIKE' THEN -1 ELSE 0 END
                   ), 0)::BIGINT AS score
            FROM comments c
            LEFT JOIN comment_reactions r ON r.comment_id = c.id
            WHERE c.{} = $1
            GROUP BY c.id
            ORDER BY score DESC, c.created_at DESC, c.id DESC
            LIMIT $2 OFFSET $3
            "#,
            scope_column(scope)
        );

        let rows = sqlx::query_as::<_, RankedCommentRow>(&query)
            .bind(scope.id())
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let (comment, net_likes) = row.into_parts();
                RankedComment { comment, net_likes }
            })
            .collect())
    }

    async fn find_comments_with_reaction_count(
        &self,
        kind: ReactionType,
        offset: i64,
        limit: i64,
    ) -> GatewayResult<Vec<CommentReactionCount>> {
        let rows = sqlx::query_as::<_, RankedCommentRow>(
            r#"
            SELECT c.id, c.post_id, c.parent_id, c.user_id, c.content, c.created_at,
                   COUNT(r.id) AS score
            FROM comment_reactions r
            JOIN comments c ON c.id = r.comment_id
            WHERE r.type = $1
            GROUP BY c.id
            ORDER BY score DESC, c.created_at DESC, c.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(kind.as_str())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let (comment, reaction_count) = row.into_parts();
                CommentReactionCount {
                    comment,
                    reaction_count,
                }
            })
            .collect())
    }

    async fn find_posts_with_reaction_count(
        &self,
        kind: ReactionType,
        offset: i64,
        limit: i64,
    ) -> GatewayResult<Vec<PostReactionCount>> {
        let rows = sqlx::query_as::<_, PostAggregateRow>(
            r#"
            SELECT p.id, p.user_id, p.title, p.content, p.created_at,
                   COUNT(r.id) AS reaction_count,
                   0::BIGINT AS comment_count,
                   NULL::TIMESTAMPTZ AS latest_comment_time
            FROM posts p
            LEFT JOIN post_reactions r ON r.post_id = p.id AND r.type = $1
            GROUP BY p.id
            ORDER BY reaction_count DESC, p.created_at DESC, p.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(kind.as_str())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| PostReactionCount {
                post: row.post(),
                reaction_count: row.reaction_count,
            })
            .collect())
    }

    async fn find_posts_by_activity(
        &self,
        offset: i64,
        limit: i64,
    ) -> GatewayResult<Vec<PostActivity>> {
        // Reactions and comments are aggregated separately before joining so
        // the two one-to-many joins cannot multiply each other.
        let rows = sqlx::query_as::<_, PostAggregateRow>(
            r#"
            SELECT p.id, p.user_id, p.title, p.content, p.created_at,
                   COALESCE(r.reaction_count, 0)::BIGINT AS reaction_count,
                   COALESCE(c.comment_count, 0)::BIGINT AS comment_count,
                   c.latest_comment_time
            FROM posts p
            LEFT JOIN (
                SELECT post_id, COUNT(DISTINCT id) AS reaction_count
                FROM post_reactions
                GROUP BY post_id
            ) r ON r.post_id = p.id
            LEFT JOIN (
                SELECT post_id,
                       COUNT(DISTINCT id) AS comment_count,
                       MAX(created_at) AS latest_comment_time
                FROM comments
                GROUP BY post_id
            ) c ON c.post_id = p.id
            ORDER BY reaction_count DESC, c.latest_comment_time DESC NULLS LAST,
                     p.created_at DESC, p.id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| PostActivity {
                post: row.post(),
                reaction_count: row.reaction_count,
                comment_count: row.comment_count,
                latest_comment_time: row.latest_comment_time,
            })
            .collect())
    }

    async fn find_posts_by_user(
        &self,
        user_id: i64,
        offset: i64,
        limit: i64,
    ) -> GatewayResult<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, user_id, title, content, created_at
            FROM posts
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }
}
