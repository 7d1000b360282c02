//! JWT configuration loaded from the environment.

use core_config::{env_or_default, env_required, ConfigError, FromEnv};

/// Default access token lifetime in seconds (15 minutes).
pub const DEFAULT_ACCESS_TOKEN_TTL: i64 = 900;

/// Default refresh token lifetime in seconds (7 days).
pub const DEFAULT_REFRESH_TOKEN_TTL: i64 = 604_800;

/// JWT authentication configuration.
///
/// Loaded from environment variables:
/// - `JWT_SECRET` (required) - Base64-encoded HS512 signing key, at least
///   64 bytes once decoded
/// - `ACCESS_TOKEN_TTL` - Access token lifetime in seconds (default 900)
/// - `REFRESH_TOKEN_TTL` - Refresh token lifetime in seconds (default 604800)
///
/// # Example
///
/// ```ignore
/// use axum_helpers::JwtConfig;
/// use core_config::FromEnv;
///
/// let config = JwtConfig::from_env()?;
/// ```
#[derive(Clone, Debug)]
pub struct JwtConfig {
    /// Base64-encoded signing secret
    pub secret: String,
    /// Access token lifetime in seconds
    pub access_token_ttl: i64,
    /// Refresh token lifetime in seconds
    pub refresh_token_ttl: i64,
}

impl JwtConfig {
    /// Create a new JwtConfig with the given base64 secret and default TTLs.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_token_ttl: DEFAULT_ACCESS_TOKEN_TTL,
            refresh_token_ttl: DEFAULT_REFRESH_TOKEN_TTL,
        }
    }
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;
        let access_token_ttl = env_or_default("ACCESS_TOKEN_TTL", &DEFAULT_ACCESS_TOKEN_TTL.to_string())
            .parse()
            .map_err(|e| ConfigError::ParseError {
                key: "ACCESS_TOKEN_TTL".to_string(),
                details: format!("{}", e),
            })?;
        let refresh_token_ttl = env_or_default("REFRESH_TOKEN_TTL", &DEFAULT_REFRESH_TOKEN_TTL.to_string())
            .parse()
            .map_err(|e| ConfigError::ParseError {
                key: "REFRESH_TOKEN_TTL".to_string(),
                details: format!("{}", e),
            })?;

        Ok(Self {
            secret,
            access_token_ttl,
            refresh_token_ttl,
        })
    }
}
