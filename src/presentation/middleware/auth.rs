//! Authentication Middleware
//!
//! JWT validation middleware for protected routes. Handlers downstream read
//! the caller from `Extension<AuthUser>` and never see the token itself.
//!
//! A valid token is not enough: the account it names must still exist and be
//! active.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::application::services::auth_service::verify_token;
use crate::application::services::TokenType;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Authenticated user extension
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: i64,
}

/// Authentication middleware that validates access tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Extract Authorization header
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Authentication credentials were not provided".into()))?;

    // Check for Bearer token
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization header format".into()))?;

    let user_id = verify_token(&state.settings.jwt, token, TokenType::Access)?;

    let user = state
        .repos
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;
    if !user.is_active {
        tracing::debug!(user_id, "Rejected token of disabled account");
        return Err(AppError::Unauthorized("User account is disabled".into()));
    }

    request.extensions_mut().insert(AuthUser { user_id });

    Ok(next.run(request).await)
}
