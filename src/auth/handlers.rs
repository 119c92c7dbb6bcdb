// HTTP handlers for authentication and staff account endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::auth::{
    error::AuthError,
    middleware::AuthenticatedUser,
    models::{CreateUserRequest, LoginRequest, LoginResponse, UpdateUserRequest, UserResponse},
};

/// Query parameters for the user list
#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    /// Case-insensitive search over username and display name
    pub search: Option<String>,
}

/// Handler for POST /api/auth/login
pub async fn login_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    let response = state.auth_service.login(request).await?;

    Ok(Json(response))
}

/// Handler for GET /api/auth/me
pub async fn me_handler(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UserResponse>, AuthError> {
    let response = state.auth_service.get_current_user(user.user_id).await?;

    Ok(Json(response))
}

/// Handler for POST /api/users (admin only, enforced by route layer)
pub async fn create_user_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AuthError> {
    let response = state.auth_service.create_user(request).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET /api/users (admin only, enforced by route layer)
pub async fn list_users_handler(
    State(state): State<crate::AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Vec<UserResponse>>, AuthError> {
    let users = state.auth_service.list_users(query.search.as_deref()).await?;

    Ok(Json(users))
}

/// Handler for GET /api/users/{id} (admin only, enforced by route layer)
pub async fn get_user_handler(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UserResponse>, AuthError> {
    let response = state.auth_service.get_user(id).await?;

    Ok(Json(response))
}

/// Handler for PUT /api/users/{id} (admin only, enforced by route layer)
pub async fn update_user_handler(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AuthError> {
    let response = state.auth_service.update_user(id, request).await?;

    Ok(Json(response))
}

/// Handler for DELETE /api/users/{id} (admin only, enforced by route layer)
pub async fn delete_user_handler(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AuthError> {
    state.auth_service.delete_user(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
