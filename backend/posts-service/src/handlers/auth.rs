/// Account handlers - registration and login
use actix_web::{web, HttpResponse};

use super::posts::Body;
use crate::error::Result;
use crate::models::{Credentials, UserResponse};
use crate::services::AccountService;

/// Register a new account
pub async fn register(
    service: web::Data<AccountService>,
    req: Body<Credentials>,
) -> Result<HttpResponse> {
    let user = service.register(req.into_inner()).await?;

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Exchange credentials for a bearer token
pub async fn login(
    service: web::Data<AccountService>,
    req: Body<Credentials>,
) -> Result<HttpResponse> {
    let token = service.login(req.into_inner()).await?;

    Ok(HttpResponse::Ok().json(token))
}
