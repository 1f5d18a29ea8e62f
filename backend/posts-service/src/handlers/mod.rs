/// HTTP handlers and route table
///
/// - Posts: list and create on the collection, retrieve/update/delete on items
/// - Auth: account registration and token login
/// - Health: liveness and readiness probes
///
/// Every route is reachable with and without a trailing slash.
pub mod auth;
pub mod health;
pub mod posts;

pub use auth::{login, register};
pub use health::{health_summary, liveness_check, readiness_summary, HealthState};
pub use posts::{
    create_post, delete_post, get_post, list_posts, partial_update_post, update_post,
};

use actix_web::web;

use crate::error::AppError;
use crate::metrics;
use crate::middleware::{AuthMiddleware, MetricsMiddleware};

/// Register all routes. Shared state is added separately by the caller.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::Validation(err.to_string()).into()
    }))
    .app_data(web::FormConfig::default().error_handler(|err, _req| {
        AppError::Validation(err.to_string()).into()
    }))
    .route("/metrics", web::get().to(metrics::serve_metrics))
    .route("/health", web::get().to(health_summary))
    .route("/health/ready", web::get().to(readiness_summary))
    .route("/health/live", web::get().to(liveness_check))
    .service(
        web::scope("/auth")
            .wrap(MetricsMiddleware)
            .service(web::resource(["/register", "/register/"]).route(web::post().to(register)))
            .service(web::resource(["/login", "/login/"]).route(web::post().to(login))),
    )
    .service(
        web::scope("/posts")
            .wrap(AuthMiddleware)
            .wrap(MetricsMiddleware)
            .service(
                web::resource(["", "/"])
                    .route(web::get().to(list_posts))
                    .route(web::post().to(create_post)),
            )
            .service(
                web::resource(["/{post_id}", "/{post_id}/"])
                    .route(web::get().to(get_post))
                    .route(web::put().to(update_post))
                    .route(web::patch().to(partial_update_post))
                    .route(web::delete().to(delete_post)),
            ),
    );
}
