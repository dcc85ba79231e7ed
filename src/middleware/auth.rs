//! Request gate
//!
//! Extracts the bearer token on protected routes, verifies it against the
//! signing configuration and attaches the resolved identity to the request.
//! Verification is stateless: no database round-trip happens here, so a
//! token stays valid for its whole lifetime even if the account changes.
//!
//! Every verification failure collapses into the same generic 401 body; the
//! specific reason (malformed, bad signature, expired) is only logged.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use uuid::Uuid;

use crate::auth::JwtConfig;
use crate::error::ApiError;
use crate::models::UserRole;

/// Identity resolved from a verified session token
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(user: AuthUser) -> impl IntoResponse {
///     format!("Hello, user {}", user.user_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: UserRole,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    JwtConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::MissingToken)?;

        let jwt = JwtConfig::from_ref(state);

        let claims = jwt.verify(bearer.token()).map_err(|e| {
            tracing::debug!(reason = %e, "Token verification failed");
            ApiError::InvalidToken
        })?;

        let user_id = claims.user_id().map_err(|e| {
            tracing::debug!(reason = %e, "Token carried an invalid subject");
            ApiError::InvalidToken
        })?;

        let role = claims.role().map_err(|e| {
            tracing::debug!(reason = %e, "Token carried an invalid role");
            ApiError::InvalidToken
        })?;

        Ok(AuthUser { user_id, role })
    }
}

/// Extractor requiring the admin role
pub struct AdminUser(pub AuthUser);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    JwtConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        if user.role != UserRole::Admin {
            return Err(ApiError::Forbidden);
        }

        Ok(AdminUser(user))
    }
}
