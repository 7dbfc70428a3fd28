//! Authentication Service
//!
//! Handles registration, login and JWT token management.
//!
//! Access and refresh tokens are both HS256 JWTs; the `token_type` claim keeps
//! one from being used in place of the other.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtSettings;
use crate::domain::{User, UserRepository};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

/// Authentication service trait for dependency injection
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user
    async fn register(&self, username: &str, email: &str, password: &str) -> Result<(User, AuthTokens), AuthError>;

    /// Authenticate user with username and password
    async fn login(&self, username: &str, password: &str) -> Result<(User, AuthTokens), AuthError>;

    /// Issue a new access token from a refresh token
    async fn refresh(&self, refresh_token: &str) -> Result<AccessToken, AuthError>;
}

/// Authentication tokens response
#[derive(Debug, Clone, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

/// A freshly issued access token
#[derive(Debug, Clone, Serialize)]
pub struct AccessToken {
    pub access_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
    /// Unique token id
    pub jti: String,
    pub token_type: TokenType,
}

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User account is disabled")]
    AccountDisabled,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("A user with that username already exists")]
    UsernameExists,

    #[error("A user with that email already exists")]
    EmailExists,

    #[error(transparent)]
    Repository(#[from] AppError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::AccountDisabled
            | AuthError::TokenExpired
            | AuthError::InvalidToken => AppError::Unauthorized(err.to_string()),
            AuthError::UsernameExists | AuthError::EmailExists => AppError::Conflict(err.to_string()),
            AuthError::Repository(inner) => inner,
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Sign a token of `token_type` for `user_id`, valid for `lifetime`.
fn issue_token(secret: &str, user_id: i64, token_type: TokenType, lifetime: Duration) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (now + lifetime).timestamp(),
        iat: now.timestamp(),
        jti: uuid::Uuid::new_v4().to_string(),
        token_type,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AuthError::Internal(format!("Token generation failed: {}", e)))
}

/// Verify a token's signature, expiry and type and return the user id it names.
pub fn verify_token(settings: &JwtSettings, token: &str, expected: TokenType) -> Result<i64, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    if token_data.claims.token_type != expected {
        return Err(AuthError::InvalidToken);
    }

    token_data
        .claims
        .sub
        .parse::<i64>()
        .map_err(|_| AuthError::InvalidToken)
}

/// AuthService implementation
pub struct AuthServiceImpl {
    user_repo: Arc<dyn UserRepository>,
    id_generator: Arc<SnowflakeGenerator>,
    jwt_settings: JwtSettings,
}

impl AuthServiceImpl {
    /// Create a new AuthServiceImpl
    pub fn new(user_repo: Arc<dyn UserRepository>, id_generator: Arc<SnowflakeGenerator>, jwt_settings: JwtSettings) -> Self {
        Self {
            user_repo,
            id_generator,
            jwt_settings,
        }
    }

    /// Hash a password using Argon2id
    fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Verify a password against its hash
    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| AuthError::Internal(format!("Invalid password hash: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    fn access_token(&self, user_id: i64) -> Result<AccessToken, AuthError> {
        let lifetime = Duration::minutes(self.jwt_settings.access_token_expiry_minutes);
        Ok(AccessToken {
            access_token: issue_token(&self.jwt_settings.secret, user_id, TokenType::Access, lifetime)?,
            expires_in: lifetime.num_seconds(),
            token_type: "Bearer".to_string(),
        })
    }

    /// Generate access and refresh tokens
    fn generate_tokens(&self, user_id: i64) -> Result<AuthTokens, AuthError> {
        let access = self.access_token(user_id)?;
        let refresh_token = issue_token(
            &self.jwt_settings.secret,
            user_id,
            TokenType::Refresh,
            Duration::days(self.jwt_settings.refresh_token_expiry_days),
        )?;

        Ok(AuthTokens {
            access_token: access.access_token,
            refresh_token,
            expires_in: access.expires_in,
            token_type: access.token_type,
        })
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    async fn register(&self, username: &str, email: &str, password: &str) -> Result<(User, AuthTokens), AuthError> {
        if self.user_repo.find_by_username(username).await?.is_some() {
            return Err(AuthError::UsernameExists);
        }
        if self.user_repo.find_by_email(email).await?.is_some() {
            return Err(AuthError::EmailExists);
        }

        let password_hash = self.hash_password(password)?;
        let user = User::new(self.id_generator.generate(), username, email, password_hash);

        // A racing registration still trips the unique constraints.
        let created_user = self.user_repo.create(&user).await?;
        tracing::info!(user_id = created_user.id, "User registered");

        let tokens = self.generate_tokens(created_user.id)?;
        Ok((created_user, tokens))
    }

    async fn login(&self, username: &str, password: &str) -> Result<(User, AuthTokens), AuthError> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }
        if !user.is_active {
            return Err(AuthError::AccountDisabled);
        }

        tracing::debug!(user_id = user.id, "User logged in");
        let tokens = self.generate_tokens(user.id)?;
        Ok((user, tokens))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AccessToken, AuthError> {
        let user_id = verify_token(&self.jwt_settings, refresh_token, TokenType::Refresh)?;

        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;
        if !user.is_active {
            return Err(AuthError::AccountDisabled);
        }

        self.access_token(user.id)
    }
}
