//! Process-local gateway.
//!
//! Holds every table in one `RwLock`. Aggregates are tallied in one pass per
//! read and sorted with the comparators in `crate::ranking::order`, so it
//! ranks exactly like the PostgreSQL gateway. Used by the test suites and
//! `STORAGE_BACKEND=memory`.

use super::{GatewayError, GatewayResult, PersistenceGateway};
use crate::models::{
    Comment, CommentReactionCount, CommentScope, NewComment, NewPost, NewReaction, NewUser, Post,
    PostActivity, PostReactionCount, RankedComment, Reaction, ReactionTarget, ReactionType, User,
};
use crate::ranking::order;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
struct Store {
    users: BTreeMap<i64, User>,
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
    reactions: Vec<Reaction>,
    next_id: i64,
}

impl Store {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Keep generated ids ahead of any explicitly seeded id.
    fn observe_id(&mut self, id: i64) {
        if id > self.next_id {
            self.next_id = id;
        }
    }

    fn target_exists(&self, target: ReactionTarget) -> bool {
        match target {
            ReactionTarget::Post(id) => self.posts.contains_key(&id),
            ReactionTarget::Comment(id) => self.comments.contains_key(&id),
        }
    }

    fn missing_user(&self, table: &str, user_id: i64) -> Option<GatewayError> {
        if self.users.contains_key(&user_id) {
            None
        } else {
            Some(GatewayError::Constraint(format!(
                "{}.user_id references missing user {}",
                table, user_id
            )))
        }
    }

    /// Per-target LIKE/DISLIKE counts, built in one pass over the reactions.
    fn reaction_tallies(&self) -> HashMap<ReactionTarget, Tally> {
        let mut tallies: HashMap<ReactionTarget, Tally> = HashMap::new();
        for reaction in &self.reactions {
            tallies
                .entry(reaction.target)
                .or_default()
                .record(reaction.reaction_type);
        }
        tallies
    }

    /// Per-post comment count and latest comment time, in one pass.
    fn comment_activity(&self) -> HashMap<i64, (i64, DateTime<Utc>)> {
        let mut activity: HashMap<i64, (i64, DateTime<Utc>)> = HashMap::new();
        for comment in self.comments.values() {
            activity
                .entry(comment.post_id)
                .and_modify(|(count, latest)| {
                    *count += 1;
                    if comment.created_at > *latest {
                        *latest = comment.created_at;
                    }
                })
                .or_insert((1, comment.created_at));
        }
        activity
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Tally {
    likes: i64,
    dislikes: i64,
}

impl Tally {
    fn record(&mut self, kind: ReactionType) {
        match kind {
            ReactionType::Like => self.likes += 1,
            ReactionType::Dislike => self.dislikes += 1,
        }
    }

    fn count(&self, kind: ReactionType) -> i64 {
        match kind {
            ReactionType::Like => self.likes,
            ReactionType::Dislike => self.dislikes,
        }
    }

    fn total(&self) -> i64 {
        self.likes + self.dislikes
    }

    fn net_likes(&self) -> i64 {
        self.likes - self.dislikes
    }
}

fn page<T>(mut items: Vec<T>, offset: i64, limit: i64) -> Vec<T> {
    let offset = usize::try_from(offset).unwrap_or(usize::MAX);
    let limit = usize::try_from(limit).unwrap_or(0);
    if offset >= items.len() {
        return Vec::new();
    }
    items.drain(..offset);
    items.truncate(limit);
    items
}

#[derive(Default)]
pub struct InMemoryGateway {
    store: RwLock<Store>,
    calls: AtomicUsize,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of gateway operations served so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    pub async fn seed_user(&self, user: User) {
        let mut store = self.store.write().await;
        store.observe_id(user.id);
        store.users.insert(user.id, user);
    }

    pub async fn seed_post(&self, post: Post) {
        let mut store = self.store.write().await;
        store.observe_id(post.id);
        store.posts.insert(post.id, post);
    }

    pub async fn seed_comment(&self, comment: Comment) {
        let mut store = self.store.write().await;
        store.observe_id(comment.id);
        store.comments.insert(comment.id, comment);
    }

    pub async fn seed_reaction(&self, reaction: Reaction) {
        let mut store = self.store.write().await;
        store.observe_id(reaction.id);
        store.reactions.push(reaction);
    }
}

#[async_trait]
impl PersistenceGateway for InMemoryGateway {
    async fn ping(&self) -> GatewayResult<()> {
        self.record_call();
        Ok(())
    }

    async fn find_user(&self, id: i64) -> GatewayResult<Option<User>> {
        self.record_call();
        Ok(self.store.read().await.users.get(&id).cloned())
    }

    async fn find_post(&self, id: i64) -> GatewayResult<Option<Post>> {
        self.record_call();
        Ok(self.store.read().await.posts.get(&id).cloned())
    }

    async fn find_comment(&self, id: i64) -> GatewayResult<Option<Comment>> {
        self.record_call();
        Ok(self.store.read().await.comments.get(&id).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> GatewayResult<User> {
        self.record_call();
        let mut store = self.store.write().await;
        let user = User {
            id: store.allocate_id(),
            username: user.username,
            created_at: Utc::now(),
        };
        store.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn insert_post(&self, post: NewPost) -> GatewayResult<Post> {
        self.record_call();
        let mut store = self.store.write().await;
        if let Some(err) = store.missing_user("posts", post.user_id) {
            return Err(err);
        }
        let post = Post {
            id: store.allocate_id(),
            user_id: post.user_id,
            title: post.title,
            content: post.content,
            created_at: Utc::now(),
        };
        store.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn insert_comment(&self, comment: NewComment) -> GatewayResult<Comment> {
        self.record_call();
        let mut store = self.store.write().await;
        if !store.posts.contains_key(&comment.post_id) {
            return Err(GatewayError::Constraint(format!(
                "comments.post_id references missing post {}",
                comment.post_id
            )));
        }
        if let Some(err) = store.missing_user("comments", comment.user_id) {
            return Err(err);
        }
        if let Some(parent_id) = comment.parent_id {
            if !store.comments.contains_key(&parent_id) {
                return Err(GatewayError::Constraint(format!(
                    "comments.parent_id references missing comment {}",
                    parent_id
                )));
            }
        }
        let comment = Comment {
            id: store.allocate_id(),
            post_id: comment.post_id,
            parent_id: comment.parent_id,
            user_id: comment.user_id,
            content: comment.content,
            created_at: Utc::now(),
        };
        store.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn insert_reaction(&self, reaction: NewReaction) -> GatewayResult<Reaction> {
        self.record_call();
        let mut store = self.store.write().await;
        if !store.target_exists(reaction.target) {
            return Err(GatewayError::Constraint(format!(
                "reaction references missing {} {}",
                reaction.target.entity_name(),
                reaction.target.id()
            )));
        }
        if let Some(err) = store.missing_user("reactions", reaction.user_id) {
            return Err(err);
        }
        let reaction = Reaction {
            id: store.allocate_id(),
            target: reaction.target,
            user_id: reaction.user_id,
            reaction_type: reaction.reaction_type,
            created_at: Utc::now(),
        };
        store.reactions.push(reaction.clone());
        Ok(reaction)
    }

    async fn find_comments_by_recency(
        &self,
        scope: CommentScope,
        offset: i64,
        limit: i64,
    ) -> GatewayResult<Vec<Comment>> {
        self.record_call();
        let store = self.store.read().await;
        let mut comments: Vec<Comment> = store
            .comments
            .values()
            .filter(|c| scope.contains(c))
            .cloned()
            .collect();
        comments.sort_by(order::comment_recency);
        Ok(page(comments, offset, limit))
    }

    async fn find_comments_with_net_likes(
        &self,
        scope: CommentScope,
        offset: i64,
        limit: i64,
    ) -> GatewayResult<Vec<RankedComment>> {
        self.record_call();
        let store = self.store.read().await;
        let tallies = store.reaction_tallies();
        let mut ranked: Vec<RankedComment> = store
            .comments
            .values()
            .filter(|c| scope.contains(c))
            .map(|c| RankedComment {
                net_likes: tallies
                    .get(&ReactionTarget::Comment(c.id))
                    .map(Tally::net_likes)
                    .unwrap_or(0),
                comment: c.clone(),
            })
            .collect();
        ranked.sort_by(order::comment_net_likes);
        Ok(page(ranked, offset, limit))
    }

    async fn find_comments_with_reaction_count(
        &self,
        kind: ReactionType,
        offset: i64,
        limit: i64,
    ) -> GatewayResult<Vec<CommentReactionCount>> {
        self.record_call();
        let store = self.store.read().await;
        let tallies = store.reaction_tallies();
        let mut counted: Vec<CommentReactionCount> = store
            .comments
            .values()
            .filter_map(|c| {
                let reaction_count = tallies
                    .get(&ReactionTarget::Comment(c.id))
                    .map(|t| t.count(kind))
                    .unwrap_or(0);
                (reaction_count > 0).then(|| CommentReactionCount {
                    comment: c.clone(),
                    reaction_count,
                })
            })
            .collect();
        counted.sort_by(order::comment_reaction_count);
        Ok(page(counted, offset, limit))
    }

    async fn find_posts_with_reaction_count(
        &self,
        kind: ReactionType,
        offset: i64,
        limit: i64,
    ) -> GatewayResult<Vec<PostReactionCount>> {
        self.record_call();
        let store = self.store.read().await;
        let tallies = store.reaction_tallies();
        let mut counted: Vec<PostReactionCount> = store
            .posts
            .values()
            .map(|p| PostReactionCount {
                reaction_count: tallies
                    .get(&ReactionTarget::Post(p.id))
                    .map(|t| t.count(kind))
                    .unwrap_or(0),
                post: p.clone(),
            })
            .collect();
        counted.sort_by(order::post_reaction_count);
        Ok(page(counted, offset, limit))
    }

    async fn find_posts_by_activity(
        &self,
        offset: i64,
        limit: i64,
    ) -> GatewayResult<Vec<PostActivity>> {
        self.record_call();
        let store = self.store.read().await;
        let tallies = store.reaction_tallies();
        let comments = store.comment_activity();
        let mut activity: Vec<PostActivity> = store
            .posts
            .values()
            .map(|p| {
                let (comment_count, latest_comment_time) = match comments.get(&p.id) {
                    Some((count, latest)) => (*count, Some(*latest)),
                    None => (0, None),
                };
                PostActivity {
                    reaction_count: tallies
                        .get(&ReactionTarget::Post(p.id))
                        .map(Tally::total)
                        .unwrap_or(0),
                    comment_count,
                    latest_comment_time,
                    post: p.clone(),
                }
            })
            .collect();
        activity.sort_by(order::post_activity);
        Ok(page(activity, offset, limit))
    }

    async fn find_posts_by_user(
        &self,
        user_id: i64,
        offset: i64,
        limit: i64,
    ) -> GatewayResult<Vec<Post>> {
        self.record_call();
        let store = self.store.read().await;
        let mut posts: Vec<Post> = store
            .posts
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        posts.sort_by(order::post_recency);
        Ok(page(posts, offset, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn page_slices_after_offset() {
        let items: Vec<i32> = (1..=7).collect();
        assert_eq!(page(items.clone(), 0, 5), vec![1, 2, 3, 4, 5]);
        assert_eq!(page(items.clone(), 5, 5), vec![6, 7]);
        assert!(page(items, 10, 5).is_empty());
    }

    #[tokio::test]
    async fn insert_assigns_ids_past_seeded_rows() {
        let gateway = InMemoryGateway::new();
        gateway
            .seed_user(User {
                id: 41,
                username: "seeded".into(),
                created_at: Utc::now(),
            })
            .await;

        let user = gateway
            .insert_user(NewUser {
                username: "fresh".into(),
            })
            .await
            .unwrap();
        assert_eq!(user.id, 42);
    }

    #[tokio::test]
    async fn comment_insert_rejects_missing_post() {
        let gateway = InMemoryGateway::new();
        let err = gateway
            .insert_comment(NewComment {
                post_id: 5,
                parent_id: None,
                user_id: 1,
                content: "orphan".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Constraint(_)));
    }

    fn user(id: i64) -> User {
        User {
            id,
            username: format!("user{}", id),
            created_at: Utc::now(),
        }
    }

    fn post(id: i64, minute: i64) -> Post {
        Post {
            id,
            user_id: 1,
            title: format!("post {}", id),
            content: "body".into(),
            created_at: base() + Duration::minutes(minute),
        }
    }

    fn comment(id: i64, post_id: i64, minute: i64) -> Comment {
        Comment {
            id,
            post_id,
            parent_id: None,
            user_id: 1,
            content: format!("comment {}", id),
            created_at: base() + Duration::minutes(minute),
        }
    }

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    async fn react(
        gateway: &InMemoryGateway,
        id: i64,
        target: ReactionTarget,
        kind: ReactionType,
    ) {
        gateway
            .seed_reaction(Reaction {
                id,
                target,
                user_id: 1,
                reaction_type: kind,
                created_at: base(),
            })
            .await;
    }

    #[test]
    fn tallies_split_by_target_kind() {
        let mut store = Store::default();
        for (id, target, kind) in [
            (100, ReactionTarget::Post(1), ReactionType::Like),
            (101, ReactionTarget::Post(1), ReactionType::Like),
            (102, ReactionTarget::Comment(1), ReactionType::Dislike),
            (103, ReactionTarget::Comment(1), ReactionType::Like),
            (104, ReactionTarget::Comment(1), ReactionType::Dislike),
        ] {
            store.reactions.push(Reaction {
                id,
                target,
                user_id: 1,
                reaction_type: kind,
                created_at: base(),
            });
        }

        let tallies = store.reaction_tallies();
        let post = tallies[&ReactionTarget::Post(1)];
        let comment = tallies[&ReactionTarget::Comment(1)];
        assert_eq!((post.likes, post.dislikes), (2, 0));
        assert_eq!(comment.net_likes(), -1);
        assert_eq!(comment.total(), 3);
        assert!(!tallies.contains_key(&ReactionTarget::Post(2)));
    }

    #[tokio::test]
    async fn aggregates_join_tallies_to_rows() {
        let gateway = InMemoryGateway::new();
        gateway.seed_user(user(1)).await;
        gateway.seed_post(post(1, 0)).await;
        gateway.seed_post(post(2, 1)).await;
        gateway.seed_post(post(3, 2)).await;
        gateway.seed_comment(comment(1, 2, 5)).await;
        gateway.seed_comment(comment(4, 2, 9)).await;
        gateway.seed_comment(comment(5, 3, 3)).await;
        gateway.seed_comment(comment(6, 3, 4)).await;

        // Post 1 and comment 1 share an id; their tallies must stay apart.
        react(&gateway, 10, ReactionTarget::Post(1), ReactionType::Like).await;
        react(&gateway, 11, ReactionTarget::Post(1), ReactionType::Like).await;
        react(&gateway, 12, ReactionTarget::Post(1), ReactionType::Dislike).await;
        react(&gateway, 13, ReactionTarget::Comment(1), ReactionType::Dislike).await;
        react(&gateway, 14, ReactionTarget::Comment(4), ReactionType::Like).await;
        react(&gateway, 15, ReactionTarget::Comment(4), ReactionType::Like).await;
        react(&gateway, 16, ReactionTarget::Comment(5), ReactionType::Like).await;
        react(&gateway, 17, ReactionTarget::Post(3), ReactionType::Dislike).await;

        let ranked = gateway
            .find_comments_with_net_likes(CommentScope::Post(2), 0, 10)
            .await
            .unwrap();
        let scored: Vec<(i64, i64)> = ranked.iter().map(|r| (r.comment.id, r.net_likes)).collect();
        assert_eq!(scored, vec![(4, 2), (1, -1)]);

        let liked = gateway
            .find_comments_with_reaction_count(ReactionType::Like, 0, 10)
            .await
            .unwrap();
        let counts: Vec<(i64, i64)> = liked
            .iter()
            .map(|c| (c.comment.id, c.reaction_count))
            .collect();
        assert_eq!(counts, vec![(4, 2), (5, 1)]);

        let posts = gateway
            .find_posts_with_reaction_count(ReactionType::Like, 0, 10)
            .await
            .unwrap();
        let counts: Vec<(i64, i64)> = posts
            .iter()
            .map(|p| (p.post.id, p.reaction_count))
            .collect();
        assert_eq!(counts, vec![(1, 2), (3, 0), (2, 0)]);

        let activity = gateway.find_posts_by_activity(0, 10).await.unwrap();
        let rows: Vec<(i64, i64, i64, Option<DateTime<Utc>>)> = activity
            .iter()
            .map(|a| {
                (
                    a.post.id,
                    a.reaction_count,
                    a.comment_count,
                    a.latest_comment_time,
                )
            })
            .collect();
        assert_eq!(
            rows,
            vec![
                (1, 3, 0, None),
                (3, 1, 2, Some(base() + Duration::minutes(4))),
                (2, 0, 2, Some(base() + Duration::minutes(9))),
            ]
        );
    }

    #[tokio::test]
    async fn writes_reject_missing_user() {
        let gateway = InMemoryGateway::new();
        gateway.seed_user(user(1)).await;
        gateway.seed_post(post(2, 0)).await;

        let err = gateway
            .insert_comment(NewComment {
                post_id: 2,
                parent_id: None,
                user_id: 77,
                content: "ghost".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Constraint(ref msg) if msg.contains("user 77")));

        let err = gateway
            .insert_reaction(NewReaction {
                target: ReactionTarget::Post(2),
                user_id: 77,
                reaction_type: ReactionType::Like,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Constraint(ref msg) if msg.contains("user 77")));

        let ranked = gateway
            .find_posts_with_reaction_count(ReactionType::Like, 0, 10)
            .await
            .unwrap();
        assert_eq!(ranked[0].reaction_count, 0);
        assert!(gateway
            .find_comments_by_recency(CommentScope::Post(2), 0, 10)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn calls_are_counted() {
        let gateway = InMemoryGateway::new();
        assert_eq!(gateway.call_count(), 0);
        gateway.find_post(1).await.unwrap();
        gateway.ping().await.unwrap();
        assert_eq!(gateway.call_count(), 2);
    }
}
