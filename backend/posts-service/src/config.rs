/// Configuration management for Posts Service
///
/// Configuration comes from environment variables, optionally seeded from a
/// `.env` file. Missing optional values fall back to defaults; values that
/// are present but unparsable are errors.
use std::collections::HashMap;
use std::env;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// JWT key material
    pub jwt: JwtConfig,
}

/// Application settings
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
    /// Actix worker threads
    pub workers: usize,
    /// Emit JSON logs instead of human-readable lines
    pub json_logs: bool,
}

/// CORS configuration
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins, `*` for any
    pub allowed_origins: String,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL URL; in-memory storage when absent
    pub url: Option<String>,
    /// Max connections in pool
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Clone)]
pub struct JwtConfig {
    pub private_key_pem: String,
    pub public_key_pem: String,
    pub access_token_ttl_secs: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("private_key_pem", &"<redacted>")
            .field("public_key_pem", &"<redacted>")
            .field("access_token_ttl_secs", &self.access_token_ttl_secs)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{name} has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from an explicit variable map
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |name: &str| vars.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());

        Ok(Config {
            app: AppConfig {
                env: get("APP_ENV").unwrap_or("development").to_string(),
                host: get("POSTS_SERVICE_HOST").unwrap_or("0.0.0.0").to_string(),
                port: parse_or(vars, "POSTS_SERVICE_PORT", 8080)?,
                workers: parse_or(vars, "HTTP_WORKERS", 4)?,
                json_logs: get("LOG_FORMAT")
                    .map(|v| v.eq_ignore_ascii_case("json"))
                    .unwrap_or(false),
            },
            cors: CorsConfig {
                allowed_origins: get("CORS_ALLOWED_ORIGINS").unwrap_or("*").to_string(),
            },
            database: DatabaseConfig {
                url: get("DATABASE_URL").map(str::to_string),
                max_connections: parse_or(vars, "DATABASE_MAX_CONNECTIONS", 10)?,
                acquire_timeout_secs: parse_or(vars, "DATABASE_ACQUIRE_TIMEOUT_SECS", 5)?,
            },
            jwt: JwtConfig {
                private_key_pem: pem(get("JWT_PRIVATE_KEY_PEM"), "JWT_PRIVATE_KEY_PEM")?,
                public_key_pem: pem(get("JWT_PUBLIC_KEY_PEM"), "JWT_PUBLIC_KEY_PEM")?,
                access_token_ttl_secs: parse_or(vars, "JWT_ACCESS_TOKEN_TTL_SECS", 3600)?,
            },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.app.host, self.app.port)
    }
}

fn parse_or<T: std::str::FromStr>(
    vars: &HashMap<String, String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match vars.get(name).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
            name,
            value: raw.to_string(),
        }),
    }
}

/// PEM values set through env files often carry literal `\n` sequences.
fn pem(value: Option<&str>, name: &'static str) -> Result<String, ConfigError> {
    value
        .map(|v| v.replace("\\n", "\n"))
        .ok_or(ConfigError::Missing(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        let mut map: HashMap<String, String> = [
            ("JWT_PRIVATE_KEY_PEM", "private"),
            ("JWT_PUBLIC_KEY_PEM", "public"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        for (k, v) in pairs {
            map.insert(k.to_string(), v.to_string());
        }
        map
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = Config::from_vars(&vars(&[])).unwrap();

        assert_eq!(cfg.app.env, "development");
        assert_eq!(cfg.bind_address(), "0.0.0.0:8080");
        assert_eq!(cfg.app.workers, 4);
        assert!(!cfg.app.json_logs);
        assert!(cfg.database.url.is_none());
        assert_eq!(cfg.database.max_connections, 10);
        assert_eq!(cfg.jwt.access_token_ttl_secs, 3600);
        assert_eq!(cfg.cors.allowed_origins, "*");
    }

    #[test]
    fn explicit_values_override_defaults() {
        let cfg = Config::from_vars(&vars(&[
            ("POSTS_SERVICE_PORT", "9090"),
            ("DATABASE_URL", "postgres://localhost/posts"),
            ("LOG_FORMAT", "JSON"),
            ("JWT_PUBLIC_KEY_PEM", "line1\\nline2"),
        ]))
        .unwrap();

        assert_eq!(cfg.app.port, 9090);
        assert_eq!(
            cfg.database.url.as_deref(),
            Some("postgres://localhost/posts")
        );
        assert!(cfg.app.json_logs);
        assert_eq!(cfg.jwt.public_key_pem, "line1\nline2");
    }

    #[test]
    fn unparsable_number_is_an_error() {
        let err = Config::from_vars(&vars(&[("POSTS_SERVICE_PORT", "eighty")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                name: "POSTS_SERVICE_PORT",
                ..
            }
        ));
    }

    #[test]
    fn jwt_keys_are_required() {
        let mut map = vars(&[]);
        map.remove("JWT_PRIVATE_KEY_PEM");

        assert!(matches!(
            Config::from_vars(&map),
            Err(ConfigError::Missing("JWT_PRIVATE_KEY_PEM"))
        ));
    }

    #[test]
    fn jwt_keys_are_redacted_in_debug_output() {
        let cfg = Config::from_vars(&vars(&[])).unwrap();
        let rendered = format!("{:?}", cfg.jwt);
        assert!(!rendered.contains("\"private\""));
        assert!(!rendered.contains("\"public\""));
        assert!(rendered.contains("<redacted>"));
    }
}
