//! Application HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use super::{AdminUser, AuthUser};
use crate::application::{
    Application, CreateApplicationRequest, UpdateApplicationRequest, UpdateStatusRequest,
};
use crate::error::ApiError;
use crate::models::{ApiResponse, PaginatedResponse, PaginationParams};
use crate::state::AppState;

/// POST /api/applications - Create a draft application
pub async fn create_application(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Application>>), ApiError> {
    req.validate()?;

    let application = state.application_service.create(user.user_id, req).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::data(application))))
}

/// GET /api/applications - List applications (own, or all for admins)
pub async fn list_applications(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PaginatedResponse<Application>>>, ApiError> {
    let (page, limit) = params.resolve();

    let applications = state
        .application_service
        .list(user.user_id, user.role, page, limit)
        .await?;

    Ok(Json(ApiResponse::data(applications)))
}

/// GET /api/applications/:id - Fetch one application
pub async fn get_application(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Application>>, ApiError> {
    let application = state
        .application_service
        .get(user.user_id, user.role, id)
        .await?;

    Ok(Json(ApiResponse::data(application)))
}

/// PUT /api/applications/:id - Edit a draft application
pub async fn update_application(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateApplicationRequest>,
) -> Result<Json<ApiResponse<Application>>, ApiError> {
    req.validate()?;

    let application = state
        .application_service
        .update(user.user_id, id, req)
        .await?;

    Ok(Json(ApiResponse::data(application)))
}

/// POST /api/applications/:id/submit - Submit a draft for review
pub async fn submit_application(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Application>>, ApiError> {
    let application = state.application_service.submit(user.user_id, id).await?;

    Ok(Json(ApiResponse::with_message(
        "Application submitted",
        application,
    )))
}

/// POST /api/applications/:id/cancel - Cancel an application
pub async fn cancel_application(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Application>>, ApiError> {
    let application = state.application_service.cancel(user.user_id, id).await?;

    Ok(Json(ApiResponse::with_message(
        "Application cancelled",
        application,
    )))
}

/// PUT /api/applications/:id/status - Admin status change
pub async fn update_application_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<Application>>, ApiError> {
    let application = state
        .application_service
        .update_status(admin.user_id, id, req)
        .await?;

    Ok(Json(ApiResponse::data(application)))
}
