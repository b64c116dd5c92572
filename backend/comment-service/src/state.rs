/// Shared application state handed to every handler via `web::Data`.
use crate::config::PaginationConfig;
use crate::db::PersistenceGateway;
use crate::ranking::RankingEngine;
use crate::services::{CommentService, PostService, ReactionService, UserService};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub posts: PostService,
    pub comments: CommentService,
    pub reactions: ReactionService,
    pub ranking: RankingEngine,
    pub pagination: PaginationConfig,
    pub gateway: Arc<dyn PersistenceGateway>,
}

impl AppState {
    pub fn new(gateway: Arc<dyn PersistenceGateway>, pagination: PaginationConfig) -> Self {
        Self {
            users: UserService::new(gateway.clone()),
            posts: PostService::new(gateway.clone()),
            comments: CommentService::new(gateway.clone()),
            reactions: ReactionService::new(gateway.clone()),
            ranking: RankingEngine::new(gateway.clone()),
            pagination,
            gateway,
        }
    }
}
