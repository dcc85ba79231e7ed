//! Authentication service
//!
//! Core business logic for credential-based authentication: registration,
//! login, session introspection and password changes.

use thiserror::Error;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{
    AuthData, ChangePasswordRequest, LoginRequest, RegisterRequest, SessionCheck,
    UpdateProfileRequest, UserResponse,
};
use crate::users::{NewUser, ProfileUpdate, StoreError, UserStore};

use super::jwt::{JwtConfig, JwtError};
use super::password::verify_password;

/// Auth service errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Duplicate entry")]
    DuplicateEmail,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => AuthError::DuplicateEmail,
            StoreError::NotFound => AuthError::UserNotFound,
            StoreError::Hash(detail) => AuthError::Internal(detail),
            StoreError::Database(detail) => AuthError::Database(detail),
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(e: JwtError) -> Self {
        match e {
            JwtError::EncodingFailed(detail) => AuthError::Internal(detail),
            _ => AuthError::InvalidToken,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::DuplicateEmail => ApiError::DuplicateEmail,
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthError::UserNotFound => ApiError::UserNotFound,
            AuthError::InvalidToken => ApiError::InvalidToken,
            AuthError::Internal(detail) => ApiError::Internal(detail),
            AuthError::Database(detail) => ApiError::Database(detail),
        }
    }
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    store: UserStore,
    jwt: JwtConfig,
}

impl AuthService {
    pub fn new(store: UserStore, jwt: JwtConfig) -> Self {
        Self { store, jwt }
    }

    /// Get the signing configuration (for the request gate)
    pub fn jwt(&self) -> &JwtConfig {
        &self.jwt
    }

    /// Register a new user and issue a session token
    ///
    /// Input shape validation happens at the handler; the store enforces
    /// email uniqueness.
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthData, AuthError> {
        let user = self
            .store
            .create(NewUser {
                first_name: req.first_name,
                last_name: req.last_name,
                email: req.email,
                password: req.password,
                phone: req.phone,
                date_of_birth: req.date_of_birth,
                country: req.country,
            })
            .await?;

        let token = self.jwt.issue(user.id, user.role)?;

        tracing::info!(user_id = %user.id, "User registered");

        Ok(AuthData {
            user: user.into(),
            token,
        })
    }

    /// Verify credentials and issue a session token
    ///
    /// An unknown email, a wrong password and a deactivated account all
    /// yield the same `InvalidCredentials`, so login cannot be used as a
    /// user-existence oracle.
    pub async fn login(&self, req: LoginRequest) -> Result<AuthData, AuthError> {
        let mut user = self
            .store
            .find_by_email(&req.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&req.password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AuthError::InvalidCredentials);
        }

        // Best-effort: a failed timestamp update must not fail the login
        match self.store.touch_last_login(user.id).await {
            Ok(at) => user.last_login_at = Some(at),
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Failed to update last-login timestamp")
            }
        }

        let token = self.jwt.issue(user.id, user.role)?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(AuthData {
            user: user.into(),
            token,
        })
    }

    /// Load the user behind an already-verified token subject
    ///
    /// Fails with `UserNotFound` if the row is gone or deactivated; a token
    /// can outlive its account.
    pub async fn current_user(&self, user_id: Uuid) -> Result<UserResponse, AuthError> {
        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !user.is_active {
            return Err(AuthError::UserNotFound);
        }

        Ok(user.into())
    }

    /// Lightweight session check: token verification only, no user load
    ///
    /// Pure and idempotent; repeated calls with the same token return the
    /// same result.
    pub fn verify_session(&self, token: &str) -> Result<SessionCheck, AuthError> {
        let claims = self.jwt.verify(token).map_err(|e| {
            tracing::debug!(reason = %e, "Session check failed");
            AuthError::InvalidToken
        })?;

        let user_id = claims.user_id()?;

        Ok(SessionCheck {
            valid: true,
            user_id,
        })
    }

    /// Change a user's password after re-verifying the current one
    pub async fn change_password(
        &self,
        user_id: Uuid,
        req: ChangePasswordRequest,
    ) -> Result<(), AuthError> {
        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !verify_password(&req.current_password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        self.store
            .update_password(user_id, &req.new_password)
            .await?;

        tracing::info!(user_id = %user_id, "Password changed");

        Ok(())
    }

    /// Apply a partial profile update
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        req: UpdateProfileRequest,
    ) -> Result<UserResponse, AuthError> {
        let user = self
            .store
            .update_profile(
                user_id,
                ProfileUpdate {
                    first_name: req.first_name,
                    last_name: req.last_name,
                    phone: req.phone,
                    date_of_birth: req.date_of_birth,
                    country: req.country,
                },
            )
            .await?;

        Ok(user.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;

    fn service_without_db() -> AuthService {
        // The pool is lazy: nothing connects until a query runs, so
        // token-only paths are testable without a database.
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgresql://localhost/unused")
            .expect("lazy pool");
        AuthService::new(UserStore::new(pool), JwtConfig::new("test-secret-key", 86400))
    }

    #[tokio::test]
    async fn test_verify_session_round_trip() {
        let service = service_without_db();
        let user_id = Uuid::new_v4();
        let token = service.jwt().issue(user_id, UserRole::Applicant).unwrap();

        let check = service.verify_session(&token).unwrap();
        assert!(check.valid);
        assert_eq!(check.user_id, user_id);
    }

    #[tokio::test]
    async fn test_verify_session_is_idempotent() {
        let service = service_without_db();
        let token = service
            .jwt()
            .issue(Uuid::new_v4(), UserRole::Applicant)
            .unwrap();

        let first = service.verify_session(&token).unwrap();
        let second = service.verify_session(&token).unwrap();
        assert_eq!(first.user_id, second.user_id);
    }

    #[tokio::test]
    async fn test_verify_session_rejects_truncated_token() {
        let service = service_without_db();
        let token = service
            .jwt()
            .issue(Uuid::new_v4(), UserRole::Applicant)
            .unwrap();

        let truncated = &token[..token.len() - 1];
        assert!(matches!(
            service.verify_session(truncated),
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_verify_session_rejects_garbage() {
        let service = service_without_db();
        assert!(matches!(
            service.verify_session("garbage"),
            Err(AuthError::InvalidToken)
        ));
    }
}
