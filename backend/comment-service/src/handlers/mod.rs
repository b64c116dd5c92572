/// HTTP handlers for comment-service
///
/// All JSON routes live under `/api/v1`:
/// - `users`: create and fetch users, list a user's posts
/// - `posts`: create and fetch posts, post rankings, post reactions
/// - `comments`: comments and replies, comment rankings, comment reactions
/// - `health`: liveness and gateway health
///
/// `/metrics` is served at the root.
use crate::config::PaginationConfig;
use crate::error::{AppError, Result};
use crate::ranking::PageWindow;
use actix_web::web;
use serde::Deserialize;

pub mod comments;
pub mod health;
pub mod posts;
pub mod users;

/// Register every route and the extractor error handlers.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .route("/metrics", web::get().to(crate::metrics::serve_metrics))
        .service(
            web::scope("/api/v1")
                .configure(health::configure)
                .configure(users::configure)
                .configure(posts::configure)
                .configure(comments::configure),
        );
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::Validation(format!("Invalid request body: {}", err)).into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        AppError::InvalidArgument(format!("Invalid query: {}", err)).into()
    })
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        AppError::InvalidArgument(format!("Invalid path: {}", err)).into()
    })
}

/// Zero-based page query, e.g. `?page_number=1&page_size=20`
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    #[serde(default, alias = "pageNumber")]
    pub page_number: Option<i64>,
    #[serde(default, alias = "pageSize")]
    pub page_size: Option<i64>,
}

impl PaginationParams {
    pub fn window(&self, config: &PaginationConfig) -> Result<PageWindow> {
        PageWindow::bounded(
            self.page_number.unwrap_or(0),
            self.page_size.unwrap_or(config.default_page_size),
            config.max_page_size,
        )
    }
}
