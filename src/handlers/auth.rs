//! Authentication HTTP handlers
//!
//! Endpoints for registration, login, session introspection and password
//! changes.

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use uuid::Uuid;
use validator::Validate;

use super::AuthUser;
use crate::error::ApiError;
use crate::models::{
    ApiResponse, AuthData, ChangePasswordRequest, LoginRequest, RegisterRequest, UserResponse,
};
use crate::state::AppState;

/// Wrapper so `/auth/me` nests the user under `data.user`
#[derive(Debug, serde::Serialize)]
pub struct CurrentUserData {
    pub user: UserResponse,
}

/// Response body for `/auth/verify-token`
#[derive(Debug, serde::Serialize)]
pub struct VerifyTokenResponse {
    pub success: bool,
    pub valid: bool,
    pub data: SessionData,
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub user_id: Uuid,
}

/// POST /api/auth/register - Create an account and issue a token
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthData>>), ApiError> {
    req.validate()?;

    let data = state.auth_service.register(req).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::data(data))))
}

/// POST /api/auth/login - Verify credentials and issue a token
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthData>>, ApiError> {
    req.validate()?;

    let data = state.auth_service.login(req).await?;

    Ok(Json(ApiResponse::data(data)))
}

/// GET /api/auth/me - Get the current authenticated user
pub async fn get_current_user(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<CurrentUserData>>, ApiError> {
    let user = state.auth_service.current_user(user.user_id).await?;

    Ok(Json(ApiResponse::data(CurrentUserData { user })))
}

/// GET /api/auth/verify-token - Lightweight session check
///
/// Deliberately bypasses the request gate: the whole point is to report on
/// the token itself, without loading the user.
pub async fn verify_token(
    State(state): State<AppState>,
    header: Option<TypedHeader<Authorization<Bearer>>>,
) -> Result<Json<VerifyTokenResponse>, ApiError> {
    let TypedHeader(Authorization(bearer)) = header.ok_or(ApiError::MissingToken)?;

    let check = state.auth_service.verify_session(bearer.token())?;

    Ok(Json(VerifyTokenResponse {
        success: true,
        valid: check.valid,
        data: SessionData {
            user_id: check.user_id,
        },
    }))
}

/// PUT /api/auth/change-password - Change the current user's password
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    req.validate()?;

    state
        .auth_service
        .change_password(user.user_id, req)
        .await?;

    Ok(Json(ApiResponse::message("Password changed successfully")))
}
