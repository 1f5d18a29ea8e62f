/// Account service - registration and credential login
use crypto_core::{password, JwtKeys};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::{Credentials, TokenResponse, User};
use crate::repository::UserRepository;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

pub struct AccountService {
    users: Arc<dyn UserRepository>,
    jwt: Arc<JwtKeys>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserRepository>, jwt: Arc<JwtKeys>) -> Self {
        Self { users, jwt }
    }

    /// Create an account. The password is stored only as an Argon2id hash.
    pub async fn register(&self, credentials: Credentials) -> Result<User> {
        credentials.validate()?;
        validate_username(&credentials.username)?;

        let Credentials { username, password } = credentials;
        let password_hash = run_blocking(move || password::hash_password(&password)).await?;

        let user = self.users.insert_user(&username, &password_hash).await?;
        tracing::info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Exchange a username and password for an access token.
    ///
    /// Unknown users and wrong passwords produce the same error.
    pub async fn login(&self, credentials: Credentials) -> Result<TokenResponse> {
        let Credentials { username, password } = credentials;

        let Some(user) = self.users.find_user_by_username(&username).await? else {
            tracing::debug!(%username, "login for unknown user");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        let hash = user.password_hash.clone();
        let matches = run_blocking(move || password::verify_password(&password, &hash)).await?;
        if !matches {
            tracing::warn!(user_id = %user.id, "login with wrong password");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let access_token = self.jwt.generate_access_token(user.id, &user.username)?;
        Ok(TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt.access_ttl().num_seconds(),
        })
    }
}

/// Letters, digits and `@ . + - _` only.
fn validate_username(username: &str) -> Result<()> {
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');
    if username.chars().all(allowed) {
        Ok(())
    } else {
        Err(AppError::Validation(
            "username: may contain only letters, digits and @/./+/-/_".to_string(),
        ))
    }
}

/// Argon2 is CPU-bound; keep it off the async worker threads.
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> crypto_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(format!("blocking task failed: {e}")))?
        .map_err(AppError::from)
}
