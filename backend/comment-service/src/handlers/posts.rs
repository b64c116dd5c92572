/// Post handlers - HTTP endpoints for post operations
use crate::error::{AppError, Result};
use crate::handlers::PaginationParams;
use crate::models::{CreatePostRequest, ReactionRequest, ReactionTarget};
use crate::ranking::PostOrder;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/posts")
            .service(web::resource("").route(web::post().to(create_post)))
            .service(web::resource("/by-user").route(web::get().to(get_posts_by_user)))
            .service(web::resource("/top-liked").route(web::get().to(top_liked_posts)))
            .service(web::resource("/top-disliked").route(web::get().to(top_disliked_posts)))
            .service(web::resource("/top-activity").route(web::get().to(top_activity_posts)))
            .service(web::resource("/{post_id}").route(web::get().to(get_post)))
            .service(web::resource("/{post_id}/reactions").route(web::post().to(react_to_post))),
    );
}

#[derive(Debug, Deserialize)]
pub struct ByUserQuery {
    #[serde(default, alias = "userId")]
    pub user_id: Option<i64>,
    #[serde(default, alias = "pageNumber")]
    pub page_number: Option<i64>,
    #[serde(default, alias = "pageSize")]
    pub page_size: Option<i64>,
}

/// Create a new post
pub async fn create_post(
    state: web::Data<AppState>,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    let post = state.posts.create_post(req.into_inner()).await?;
    Ok(HttpResponse::Created().json(post))
}

/// Get a post by ID
pub async fn get_post(state: web::Data<AppState>, post_id: web::Path<i64>) -> Result<HttpResponse> {
    let post = state.posts.get_post(post_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// Posts by one user, newest first
pub async fn get_posts_by_user(
    state: web::Data<AppState>,
    query: web::Query<ByUserQuery>,
) -> Result<HttpResponse> {
    let query = query.into_inner();
    let user_id = query
        .user_id
        .ok_or_else(|| AppError::Validation("user_id: User ID cannot be null".to_string()))?;
    let window = PaginationParams {
        page_number: query.page_number,
        page_size: query.page_size,
    }
    .window(&state.pagination)?;

    let posts = state
        .ranking
        .rank_posts(PostOrder::ByUser(user_id), window)
        .await?;
    Ok(HttpResponse::Ok().json(posts))
}

async fn ranked(
    state: &AppState,
    order: PostOrder,
    query: &PaginationParams,
) -> Result<HttpResponse> {
    let window = query.window(&state.pagination)?;
    let posts = state.ranking.rank_posts(order, window).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// Posts with the most likes
pub async fn top_liked_posts(
    state: web::Data<AppState>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    ranked(&state, PostOrder::TopLiked, &query).await
}

/// Posts with the most dislikes
pub async fn top_disliked_posts(
    state: web::Data<AppState>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    ranked(&state, PostOrder::TopDisliked, &query).await
}

/// Posts by reactions, then latest comment
pub async fn top_activity_posts(
    state: web::Data<AppState>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    ranked(&state, PostOrder::TopActivity, &query).await
}

/// Like or dislike a post
pub async fn react_to_post(
    state: web::Data<AppState>,
    post_id: web::Path<i64>,
    req: web::Json<ReactionRequest>,
) -> Result<HttpResponse> {
    let reaction = state
        .reactions
        .react(ReactionTarget::Post(post_id.into_inner()), req.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(reaction))
}
