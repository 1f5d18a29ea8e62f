/// Shared JWT module for the posts workspace
///
/// Access tokens are signed with RS256 only. Symmetric algorithms are never
/// accepted, so a token signed with the public key as an HMAC secret is
/// rejected.
///
/// Keys are held in a [`JwtKeys`] value that callers construct at startup
/// and hand to whatever needs it, rather than in process-wide statics.
///
/// ## Usage
///
/// ```rust,no_run
/// use crypto_core::jwt::JwtKeys;
///
/// let private_key = std::env::var("JWT_PRIVATE_KEY_PEM").unwrap();
/// let public_key = std::env::var("JWT_PUBLIC_KEY_PEM").unwrap();
/// let keys = JwtKeys::from_rsa_pem(&private_key, &public_key).unwrap();
///
/// let token = keys.generate_access_token(uuid::Uuid::new_v4(), "rob").unwrap();
/// let claims = keys.validate_token(&token).unwrap();
/// assert_eq!(claims.username, "rob");
/// ```
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CryptoError, Result};

const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 3600;

/// JWT algorithm - MUST be RS256 for every service in this workspace
const JWT_ALGORITHM: Algorithm = Algorithm::RS256;

const ACCESS_TOKEN_TYPE: &str = "access";

/// JWT claims carried by every access token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token type, always "access" for tokens minted here
    pub token_type: String,
    /// Username at issue time
    pub username: String,
}

impl Claims {
    /// Parse the subject as a user id.
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub)
            .map_err(|e| CryptoError::InvalidToken(format!("malformed subject: {e}")))
    }
}

/// RSA key pair used to sign and verify access tokens.
pub struct JwtKeys {
    encoding: Option<EncodingKey>,
    decoding: DecodingKey,
    access_ttl: Duration,
}

impl JwtKeys {
    /// Build signing and validation keys from PEM-encoded RSA keys.
    pub fn from_rsa_pem(private_key_pem: &str, public_key_pem: &str) -> Result<Self> {
        let encoding = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .map_err(|e| CryptoError::InvalidKey(format!("RSA private key: {e}")))?;
        let mut keys = Self::validation_only(public_key_pem)?;
        keys.encoding = Some(encoding);
        Ok(keys)
    }

    /// Build keys that can validate but never issue tokens.
    pub fn validation_only(public_key_pem: &str) -> Result<Self> {
        let decoding = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| CryptoError::InvalidKey(format!("RSA public key: {e}")))?;

        Ok(Self {
            encoding: None,
            decoding,
            access_ttl: Duration::seconds(DEFAULT_ACCESS_TOKEN_TTL_SECS),
        })
    }

    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn can_sign(&self) -> bool {
        self.encoding.is_some()
    }

    /// Issue an access token for the given user.
    pub fn generate_access_token(&self, user_id: Uuid, username: &str) -> Result<String> {
        let encoding = self
            .encoding
            .as_ref()
            .ok_or(CryptoError::SigningKeyUnavailable)?;

        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
            token_type: ACCESS_TOKEN_TYPE.to_string(),
            username: username.to_string(),
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, encoding)
            .map_err(|e| CryptoError::InvalidKey(format!("failed to sign token: {e}")))
    }

    /// Validate signature, expiry and token type, returning the claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| match e.kind()
        {
            ErrorKind::ExpiredSignature => CryptoError::TokenExpired,
            _ => CryptoError::InvalidToken(e.to_string()),
        })?;

        if data.claims.token_type != ACCESS_TOKEN_TYPE {
            tracing::debug!(token_type = %data.claims.token_type, "rejected non-access token");
            return Err(CryptoError::InvalidToken(format!(
                "unexpected token type: {}",
                data.claims.token_type
            )));
        }

        Ok(data.claims)
    }
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys")
            .field("can_sign", &self.can_sign())
            .field("access_ttl_secs", &self.access_ttl.num_seconds())
            .finish()
    }
}
