//! Prometheus metrics for posts-service.
//!
//! Exposes request and post-operation collectors and an HTTP handler for the
//! `/metrics` endpoint.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

lazy_static! {
    /// HTTP requests segmented by method and response status.
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "posts_http_requests_total",
        "HTTP requests segmented by method and status",
        &["method", "status"]
    )
    .expect("failed to register posts_http_requests_total");

    /// Post operations segmented by operation and outcome.
    pub static ref POST_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "post_operations_total",
        "Post operations segmented by operation and outcome",
        &["operation", "outcome"]
    )
    .expect("failed to register post_operations_total");
}

/// Outcome label for a finished post operation.
pub fn record_post_operation<T>(operation: &str, result: &crate::Result<T>) {
    let outcome = match result {
        Ok(_) => "success",
        Err(crate::AppError::PermissionDenied) => "forbidden",
        Err(crate::AppError::NotFound(_)) => "not_found",
        Err(crate::AppError::Validation(_)) => "invalid",
        Err(_) => "error",
    };
    POST_OPERATIONS_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
