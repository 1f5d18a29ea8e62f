/// HTTP middleware utilities for posts-service
///
/// Provides optional bearer-token authentication, the `Actor` extractor and
/// request metrics. Authentication never rejects anonymous requests; it only
/// rejects requests that present a token which does not validate.
pub mod permissions;

pub use permissions::*;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{web, Error, FromRequest, HttpMessage, HttpRequest};
use crypto_core::JwtKeys;
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::time::Instant;

use crate::error::AppError;
use crate::metrics;
use crate::models::Actor;

// =====================================================================
// Bearer authentication
// =====================================================================

/// Attaches an [`Actor`] to requests that carry a valid bearer token.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            if let Some(actor) = authenticate(&req)? {
                tracing::debug!(user_id = %actor.id, "request authenticated");
                req.extensions_mut().insert(actor);
            }

            service.call(req).await
        })
    }
}

/// `Ok(None)` for anonymous requests; an error for a token that fails.
fn authenticate(req: &ServiceRequest) -> Result<Option<Actor>, AppError> {
    let Some(header) = req.headers().get("Authorization") else {
        return Ok(None);
    };

    let token = header
        .to_str()
        .ok()
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".to_string()))?;

    let keys = req
        .app_data::<web::Data<JwtKeys>>()
        .ok_or_else(|| AppError::Internal("JWT keys not registered".to_string()))?;

    let claims = keys.validate_token(token).map_err(|e| {
        tracing::warn!("JWT validation failed: {}", e);
        AppError::from(e)
    })?;

    let id = claims.user_id().map_err(AppError::from)?;

    Ok(Some(Actor {
        id,
        username: claims.username,
    }))
}

/// Extracting `Actor` fails with 403 for anonymous requests; handlers that
/// accept anonymous callers take `Option<Actor>` instead.
impl FromRequest for Actor {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Actor>()
                .cloned()
                .ok_or_else(|| AppError::PermissionDenied.into()),
        )
    }
}

// =====================================================================
// Request metrics
// =====================================================================

/// Records a counter per method and status, and logs request latency.
pub struct MetricsMiddleware;

impl<S, B> Transform<S, ServiceRequest> for MetricsMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = MetricsMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(MetricsMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct MetricsMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for MetricsMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let path = req.path().to_string();
        let method = req.method().to_string();
        let start = Instant::now();

        Box::pin(async move {
            let res = service.call(req).await;
            let status = match &res {
                Ok(resp) => resp.status(),
                Err(err) => err.as_response_error().status_code(),
            };
            metrics::HTTP_REQUESTS_TOTAL
                .with_label_values(&[method.as_str(), status.as_str()])
                .inc();

            let elapsed = start.elapsed().as_millis();
            tracing::debug!(%method, %path, status = status.as_u16(), %elapsed, "request completed");
            res
        })
    }
}
