/// User directory endpoints
///
/// # Endpoints
///
/// - `GET /api/users` - List users
/// - `GET /api/users/:id` - Get a user
/// - `PUT /api/users/:id` - Update a profile (self or ADMIN)
/// - `DELETE /api/users/:id` - Delete a user (self or ADMIN)

use crate::{
    app::AppState,
    error::{validate_request, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use taskflow_shared::{
    auth::middleware::AuthContext,
    models::user::{UpdateUser, User},
};
use uuid::Uuid;
use validator::Validate;

/// Profile update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: Option<String>,

    /// New password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,
}

pub async fn list_users(State(state): State<AppState>, _auth: AuthContext) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.services.list_users().await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.services.get_user(id).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    validate_request(&req)?;

    let changes = UpdateUser {
        first_name: req.first_name,
        last_name: req.last_name,
        password_hash: None,
    };
    let user = state
        .services
        .update_user(&auth, id, changes, req.password.as_deref())
        .await?;

    Ok(Json(user))
}

/// # Errors
///
/// - `409 Conflict`: The user still owns boards or authored comments/activity
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.delete_user(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
