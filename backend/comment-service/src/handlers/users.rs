/// User handlers - HTTP endpoints for user operations
use crate::error::Result;
use crate::handlers::PaginationParams;
use crate::models::CreateUserRequest;
use crate::ranking::PostOrder;
use crate::state::AppState;
use actix_web::{web, HttpResponse};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .service(web::resource("").route(web::post().to(create_user)))
            .service(web::resource("/{user_id}").route(web::get().to(get_user)))
            .service(web::resource("/{user_id}/posts").route(web::get().to(get_user_posts))),
    );
}

/// Create a user
pub async fn create_user(
    state: web::Data<AppState>,
    req: web::Json<CreateUserRequest>,
) -> Result<HttpResponse> {
    let user = state.users.create_user(req.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Get a user by ID
pub async fn get_user(state: web::Data<AppState>, user_id: web::Path<i64>) -> Result<HttpResponse> {
    let user = state.users.get_user(user_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Get a user's posts, newest first
pub async fn get_user_posts(
    state: web::Data<AppState>,
    user_id: web::Path<i64>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let window = query.window(&state.pagination)?;
    let posts = state
        .ranking
        .rank_posts(PostOrder::ByUser(user_id.into_inner()), window)
        .await?;
    Ok(HttpResponse::Ok().json(posts))
}
