//! Shared credential primitives for the posts workspace.
//!
//! - `jwt`: RS256 access token issuance and validation
//! - `password`: Argon2id password hashing

pub mod jwt;
pub mod password;

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("signing key not configured")]
    SigningKeyUnavailable,

    #[error("token expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;

pub use jwt::{Claims, JwtKeys};
