/// Post handlers - HTTP endpoints for post operations
///
/// The acting user arrives as `Option<Actor>` and is handed to the service
/// unchanged; whether anonymous access is allowed is decided there.
///
/// Post bodies are extracted as `Result`s so a malformed body is reported
/// only after the lookup and permission checks have passed.
use actix_web::{web, Either, HttpResponse};

use crate::error::{AppError, Result};
use crate::models::{Actor, PostFields, PostPatch, PostResponse};
use crate::services::PostService;

/// Request bodies are accepted as JSON or as a urlencoded form.
pub type Body<T> = Either<web::Json<T>, web::Form<T>>;

/// A body whose extraction failure has not been reported yet.
pub type DeferredBody<T> = std::result::Result<Body<T>, actix_web::Error>;

fn deferred<T>(body: DeferredBody<T>) -> Result<T> {
    body.map(|b| b.into_inner())
        .map_err(|err| match err.as_error::<AppError>() {
            Some(AppError::Validation(msg)) => AppError::Validation(msg.clone()),
            _ => AppError::Validation(err.to_string()),
        })
}

/// List all posts
pub async fn list_posts(
    service: web::Data<PostService>,
    actor: Option<Actor>,
) -> Result<HttpResponse> {
    let posts = service.list_posts().await?;
    let body: Vec<PostResponse> = posts
        .into_iter()
        .map(|post| PostResponse::for_viewer(post, actor.as_ref()))
        .collect();

    Ok(HttpResponse::Ok().json(body))
}

/// Create a new post owned by the caller
pub async fn create_post(
    service: web::Data<PostService>,
    actor: Option<Actor>,
    req: DeferredBody<PostFields>,
) -> Result<HttpResponse> {
    let post = service.create_post(actor.as_ref(), deferred(req)).await?;

    Ok(HttpResponse::Created().json(PostResponse::for_viewer(post, actor.as_ref())))
}

/// Get a post by ID
pub async fn get_post(
    service: web::Data<PostService>,
    actor: Option<Actor>,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let post = service.get_post(post_id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(PostResponse::for_viewer(post, actor.as_ref())))
}

/// Replace a post's title and content
pub async fn update_post(
    service: web::Data<PostService>,
    actor: Option<Actor>,
    post_id: web::Path<i64>,
    req: DeferredBody<PostFields>,
) -> Result<HttpResponse> {
    let post = service
        .update_post(actor.as_ref(), post_id.into_inner(), deferred(req))
        .await?;

    Ok(HttpResponse::Ok().json(PostResponse::for_viewer(post, actor.as_ref())))
}

/// Update only the supplied fields of a post
pub async fn partial_update_post(
    service: web::Data<PostService>,
    actor: Option<Actor>,
    post_id: web::Path<i64>,
    req: DeferredBody<PostPatch>,
) -> Result<HttpResponse> {
    let post = service
        .partial_update_post(actor.as_ref(), post_id.into_inner(), deferred(req))
        .await?;

    Ok(HttpResponse::Ok().json(PostResponse::for_viewer(post, actor.as_ref())))
}

/// Delete a post
pub async fn delete_post(
    service: web::Data<PostService>,
    actor: Option<Actor>,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    service
        .delete_post(actor.as_ref(), post_id.into_inner())
        .await?;

    Ok(HttpResponse::NoContent().finish())
}
