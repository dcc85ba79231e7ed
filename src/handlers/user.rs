//! User profile handlers

use axum::{extract::State, Json};
use validator::Validate;

use super::auth::CurrentUserData;
use super::AuthUser;
use crate::error::ApiError;
use crate::models::{ApiResponse, UpdateProfileRequest};
use crate::state::AppState;

/// PUT /api/users/profile - Update the current user's profile
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<CurrentUserData>>, ApiError> {
    req.validate()?;

    let user = state
        .auth_service
        .update_profile(user.user_id, req)
        .await?;

    Ok(Json(ApiResponse::data(CurrentUserData { user })))
}
