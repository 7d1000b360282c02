use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::config::JwtConfig;

/// Name of the cookie carrying the refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Minimum decoded key length for HS512 in bytes.
const MIN_KEY_BYTES: usize = 64;

/// User identity embedded in token claims and login responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TokenUser {
    pub id: i64,
    pub email: String,
    pub name: String,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user email)
    pub sub: String,
    /// Embedded user identity
    pub user: TokenUser,
    /// Expiration time (unix seconds)
    pub exp: i64,
    /// Issued at (unix seconds)
    pub iat: i64,
}

/// Stateless HS512 token signer and verifier.
///
/// Access and refresh tokens share the same claim shape and signing key;
/// they differ only in lifetime. Refresh token rotation is enforced by the
/// caller comparing the presented token against the one stored per user.
#[derive(Clone)]
pub struct JwtAuth {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_ttl: i64,
    refresh_token_ttl: i64,
}

impl JwtAuth {
    /// Create a new signer from configuration.
    ///
    /// The secret must be valid base64 and decode to at least 64 bytes.
    pub fn new(config: &JwtConfig) -> eyre::Result<Self> {
        let key = BASE64
            .decode(&config.secret)
            .map_err(|e| eyre::eyre!("JWT_SECRET is not valid base64: {}", e))?;

        if key.len() < MIN_KEY_BYTES {
            eyre::bail!(
                "JWT_SECRET must decode to at least {} bytes for HS512 (got {}). Generate one with: openssl rand -base64 64",
                MIN_KEY_BYTES,
                key.len()
            );
        }

        tracing::info!("JWT auth initialized");
        Ok(Self {
            encoding_key: EncodingKey::from_secret(&key),
            decoding_key: DecodingKey::from_secret(&key),
            access_token_ttl: config.access_token_ttl,
            refresh_token_ttl: config.refresh_token_ttl,
        })
    }

    /// Access token lifetime in seconds.
    pub fn access_token_ttl(&self) -> i64 {
        self.access_token_ttl
    }

    /// Refresh token lifetime in seconds.
    pub fn refresh_token_ttl(&self) -> i64 {
        self.refresh_token_ttl
    }

    /// Create a short-lived access token.
    pub fn create_access_token(&self, user: &TokenUser) -> eyre::Result<String> {
        self.create_token(user, self.access_token_ttl)
    }

    /// Create a long-lived refresh token.
    pub fn create_refresh_token(&self, user: &TokenUser) -> eyre::Result<String> {
        self.create_token(user, self.refresh_token_ttl)
    }

    fn create_token(&self, user: &TokenUser, ttl_seconds: i64) -> eyre::Result<String> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user.email.clone(),
            user: user.clone(),
            exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
            iat: now.timestamp(),
        };

        let header = Header::new(Algorithm::HS512);
        let token = encode(&header, &claims, &self.encoding_key)?;

        Ok(token)
    }

    /// Verify token signature and expiry, returning the decoded claims.
    pub fn verify_token(&self, token: &str) -> eyre::Result<JwtClaims> {
        let token_data = decode::<JwtClaims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS512),
        )?;

        Ok(token_data.claims)
    }
}
