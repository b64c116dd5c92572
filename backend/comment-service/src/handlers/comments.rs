/// Comment handlers - HTTP endpoints for comments and replies
use crate::error::Result;
use crate::handlers::PaginationParams;
use crate::models::{
    CommentScope, CreateCommentRequest, ReactionRequest, ReactionTarget, ReactionType,
};
use crate::ranking::CommentOrder;
use crate::state::AppState;
use actix_web::{web, HttpResponse};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/comments")
            .service(web::resource("").route(web::post().to(add_comment)))
            .service(
                web::resource("/recent/replies/{parent_id}")
                    .route(web::get().to(recent_replies)),
            )
            .service(web::resource("/recent/{post_id}").route(web::get().to(recent_comments)))
            .service(web::resource("/top/replies/{parent_id}").route(web::get().to(top_replies)))
            .service(web::resource("/top/{post_id}").route(web::get().to(top_comments)))
            .service(web::resource("/top-liked").route(web::get().to(top_liked_comments)))
            .service(web::resource("/top-disliked").route(web::get().to(top_disliked_comments)))
            .service(web::resource("/{comment_id}").route(web::get().to(get_comment)))
            .service(
                web::resource("/{comment_id}/reactions").route(web::post().to(react_to_comment)),
            ),
    );
}

/// Add a comment or reply
pub async fn add_comment(
    state: web::Data<AppState>,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    let comment = state.comments.add_comment(req.into_inner()).await?;
    Ok(HttpResponse::Created().json(comment))
}

/// Get a comment by ID
pub async fn get_comment(
    state: web::Data<AppState>,
    comment_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let comment = state.comments.get_comment(comment_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(comment))
}

async fn ranked(
    state: &AppState,
    scope: CommentScope,
    order: CommentOrder,
    query: &PaginationParams,
) -> Result<HttpResponse> {
    let window = query.window(&state.pagination)?;
    let comments = state.ranking.rank_comments(scope, order, window).await?;
    Ok(HttpResponse::Ok().json(comments))
}

pub async fn recent_comments(
    state: web::Data<AppState>,
    post_id: web::Path<i64>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let scope = CommentScope::Post(post_id.into_inner());
    ranked(&state, scope, CommentOrder::Recent, &query).await
}

pub async fn recent_replies(
    state: web::Data<AppState>,
    parent_id: web::Path<i64>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let scope = CommentScope::Parent(parent_id.into_inner());
    ranked(&state, scope, CommentOrder::Recent, &query).await
}

pub async fn top_comments(
    state: web::Data<AppState>,
    post_id: web::Path<i64>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let scope = CommentScope::Post(post_id.into_inner());
    ranked(&state, scope, CommentOrder::Top, &query).await
}

pub async fn top_replies(
    state: web::Data<AppState>,
    parent_id: web::Path<i64>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let scope = CommentScope::Parent(parent_id.into_inner());
    ranked(&state, scope, CommentOrder::Top, &query).await
}

async fn by_reaction(
    state: &AppState,
    kind: ReactionType,
    query: &PaginationParams,
) -> Result<HttpResponse> {
    let window = query.window(&state.pagination)?;
    let comments = state.ranking.rank_comments_by_reaction(kind, window).await?;
    Ok(HttpResponse::Ok().json(comments))
}

/// Comments with the most likes across all posts
pub async fn top_liked_comments(
    state: web::Data<AppState>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    by_reaction(&state, ReactionType::Like, &query).await
}

/// Comments with the most dislikes across all posts
pub async fn top_disliked_comments(
    state: web::Data<AppState>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    by_reaction(&state, ReactionType::Dislike, &query).await
}

/// Like or dislike a comment
pub async fn react_to_comment(
    state: web::Data<AppState>,
    comment_id: web::Path<i64>,
    req: web::Json<ReactionRequest>,
) -> Result<HttpResponse> {
    let reaction = state
        .reactions
        .react(ReactionTarget::Comment(comment_id.into_inner()), req.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(reaction))
}
