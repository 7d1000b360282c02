//! Login, token refresh and registration on top of the user repository.
//!
//! Access tokens travel in the response body; refresh tokens are persisted
//! on the user row and compared on refresh, so a stolen cookie stops
//! working after the next rotation or logout.

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum_helpers::auth::{JwtAuth, JwtClaims, TokenUser};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AuthError, AuthResult};
use crate::models::{AccountUser, AuthUser, LoginRequest, LoginResponse, RegisterRequest, User};
use crate::repository::UserRepository;

/// Hash a password with argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Verify a password against a stored argon2 hash.
/// A hash that fails to parse counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Access token plus the refresh token destined for the cookie.
pub struct TokenPair {
    pub response: LoginResponse,
    pub refresh_token: String,
}

/// Service layer for authentication flows
#[derive(Clone)]
pub struct AuthService<R: UserRepository> {
    repository: Arc<R>,
    jwt: JwtAuth,
}

impl<R: UserRepository> AuthService<R> {
    pub fn new(repository: R, jwt: JwtAuth) -> Self {
        Self {
            repository: Arc::new(repository),
            jwt,
        }
    }

    pub fn from_arc(repository: Arc<R>, jwt: JwtAuth) -> Self {
        Self { repository, jwt }
    }

    /// Refresh token lifetime in seconds, for the cookie Max-Age.
    pub fn refresh_token_ttl(&self) -> i64 {
        self.jwt.refresh_token_ttl()
    }

    /// Verify credentials and issue a fresh token pair.
    pub async fn login(&self, input: LoginRequest) -> AuthResult<TokenPair> {
        input
            .validate()
            .map_err(|e| AuthError::Validation(e.to_string()))?;

        let user = self
            .repository
            .find_auth_by_email(&input.username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&input.password, &user.password_hash) {
            tracing::warn!(email = %input.username, "Failed login attempt");
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(user_id = user.id, "User logged in");
        self.issue_tokens(&user).await
    }

    /// Rotate both tokens when the presented refresh token matches the
    /// stored one for its subject.
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        let claims = self
            .jwt
            .verify_token(refresh_token)
            .map_err(|_| AuthError::Unauthorized("Invalid refresh token".to_string()))?;

        let user = self
            .repository
            .find_by_refresh_token_and_email(refresh_token, &claims.sub)
            .await?
            .ok_or_else(|| {
                AuthError::Unauthorized("Refresh token is no longer valid".to_string())
            })?;

        tracing::debug!(user_id = user.id, "Rotated refresh token");
        self.issue_tokens(&user).await
    }

    /// Clear the stored refresh token for the current user.
    pub async fn logout(&self, claims: &JwtClaims) -> AuthResult<()> {
        self.repository
            .update_refresh_token(claims.user.id, None)
            .await?;

        tracing::info!(user_id = claims.user.id, "User logged out");
        Ok(())
    }

    /// Current user profile, fetched fresh so role changes apply.
    pub async fn account(&self, claims: &JwtClaims) -> AuthResult<AccountUser> {
        let user = self
            .repository
            .find_auth_by_email(&claims.sub)
            .await?
            .ok_or_else(|| AuthError::Unauthorized("Account no longer exists".to_string()))?;

        Ok(user.account_user())
    }

    /// Public self-registration; the new user has no role or company.
    pub async fn register(&self, input: RegisterRequest) -> AuthResult<User> {
        input
            .validate()
            .map_err(|e| AuthError::Validation(e.to_string()))?;

        let password_hash = hash_password(&input.password)
            .map_err(|e| AuthError::Internal(format!("Password hashing failed: {}", e)))?;

        let user = self
            .repository
            .create(input.into(), password_hash, None)
            .await?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(user)
    }

    async fn issue_tokens(&self, user: &AuthUser) -> AuthResult<TokenPair> {
        let token_user = TokenUser {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
        };

        let access_token = self
            .jwt
            .create_access_token(&token_user)
            .map_err(|e| AuthError::Internal(format!("Token creation failed: {}", e)))?;
        let refresh_token = self
            .jwt
            .create_refresh_token(&token_user)
            .map_err(|e| AuthError::Internal(format!("Token creation failed: {}", e)))?;

        self.repository
            .update_refresh_token(user.id, Some(refresh_token.clone()))
            .await?;

        Ok(TokenPair {
            response: LoginResponse {
                access_token,
                user: user.account_user(),
            },
            refresh_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryUserRepository;
    use axum_helpers::auth::JwtConfig;
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

    fn test_jwt() -> JwtAuth {
        let secret = BASE64.encode([5u8; 64]);
        JwtAuth::new(&JwtConfig::new(secret)).unwrap()
    }

    fn test_service() -> AuthService<InMemoryUserRepository> {
        AuthService::new(InMemoryUserRepository::new(), test_jwt())
    }

    fn registration() -> RegisterRequest {
        RegisterRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "secret123".to_string(),
            age: None,
            gender: None,
            address: None,
        }
    }

    #[test]
    fn test_password_hash_verifies() {
        let hash = hash_password("secret123").unwrap();
        assert!(verify_password("secret123", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(!verify_password("secret123", "not a phc string"));
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let service = test_service();
        service.register(registration()).await.unwrap();

        let pair = service
            .login(LoginRequest {
                username: "ada@example.com".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(pair.response.user.email, "ada@example.com");
        assert!(!pair.response.access_token.is_empty());
        assert!(!pair.refresh_token.is_empty());
    }

    #[tokio::test]
    async fn test_login_with_wrong_password() {
        let service = test_service();
        service.register(registration()).await.unwrap();

        let result = service
            .login(LoginRequest {
                username: "ada@example.com".to_string(),
                password: "wrong-password".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_with_unknown_email() {
        let service = test_service();

        let result = service
            .login(LoginRequest {
                username: "ghost@example.com".to_string(),
                password: "whatever1".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let service = test_service();
        service.register(registration()).await.unwrap();

        let result = service.register(registration()).await;
        assert!(matches!(result, Err(AuthError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_refresh_rotates_token() {
        let service = test_service();
        service.register(registration()).await.unwrap();

        let pair = service
            .login(LoginRequest {
                username: "ada@example.com".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();

        let rotated = service.refresh(&pair.refresh_token).await.unwrap();
        assert_eq!(rotated.response.user.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_logout_invalidates_refresh_token() {
        let service = test_service();
        service.register(registration()).await.unwrap();

        let pair = service
            .login(LoginRequest {
                username: "ada@example.com".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();

        let claims = test_jwt().verify_token(&pair.response.access_token).unwrap();
        service.logout(&claims).await.unwrap();

        let result = service.refresh(&pair.refresh_token).await;
        assert!(matches!(result, Err(AuthError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token_reuse_of_stale_value() {
        let service = test_service();
        service.register(registration()).await.unwrap();

        let first = service
            .login(LoginRequest {
                username: "ada@example.com".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();

        // A second login overwrites the stored refresh token.
        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
        service
            .login(LoginRequest {
                username: "ada@example.com".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();

        let result = service.refresh(&first.refresh_token).await;
        assert!(matches!(result, Err(AuthError::Unauthorized(_))));
    }
}
