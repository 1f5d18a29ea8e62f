/// Health endpoints for container orchestration
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::repository::PostRepository;

pub struct HealthState {
    posts: Arc<dyn PostRepository>,
}

impl HealthState {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "lowercase")]
enum ComponentStatus {
    Healthy,
    Unhealthy,
}

#[derive(Serialize)]
struct ComponentCheck {
    status: ComponentStatus,
    message: String,
    latency_ms: u64,
}

#[derive(Serialize)]
struct ReadinessResponse {
    ready: bool,
    status: ComponentStatus,
    checks: HashMap<String, ComponentCheck>,
    timestamp: String,
}

pub async fn health_summary(state: web::Data<HealthState>) -> HttpResponse {
    match state.posts.health_check().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "posts-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => {
            tracing::error!("storage health check failed: {}", e);
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "unhealthy",
                "service": "posts-service"
            }))
        }
    }
}

pub async fn readiness_summary(state: web::Data<HealthState>) -> HttpResponse {
    let start = Instant::now();
    let result = state.posts.health_check().await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let (ready, check) = match result {
        Ok(()) => (
            true,
            ComponentCheck {
                status: ComponentStatus::Healthy,
                message: "storage reachable".to_string(),
                latency_ms,
            },
        ),
        Err(e) => {
            tracing::warn!("readiness check failed: {}", e);
            (
                false,
                ComponentCheck {
                    status: ComponentStatus::Unhealthy,
                    message: "storage unreachable".to_string(),
                    latency_ms,
                },
            )
        }
    };

    let response = ReadinessResponse {
        ready,
        status: check.status.clone(),
        checks: HashMap::from([("storage".to_string(), check)]),
        timestamp: Utc::now().to_rfc3339(),
    };

    if ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

pub async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}
