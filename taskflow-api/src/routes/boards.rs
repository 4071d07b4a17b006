/// Board endpoints
///
/// Boards are exposed under `/api/projects`.
///
/// # Endpoints
///
/// - `POST /api/projects` - Create a board owned by the caller
/// - `GET /api/projects` - Boards the caller owns or belongs to
/// - `GET /api/projects/:id` - Board with its columns (member)
/// - `PUT /api/projects/:id` - Rename or re-describe (owner)
/// - `DELETE /api/projects/:id` - Delete with everything below it (owner)
///
/// Non-members receive `404` for every board-scoped request.

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
    models::board::{Board, CreateBoard, UpdateBoard},
    services::BoardDetails,
};
use uuid::Uuid;
use validator::Validate;

/// Create board request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBoardRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
}

/// Update board request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBoardRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
}

pub async fn create_board(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<CreateBoardRequest>,
) -> ApiResult<(StatusCode, Json<BoardDetails>)> {
    validate_request(&req)?;

    let details = state
        .services
        .create_board(
            auth.user_id,
            CreateBoard {
                name: req.name,
                description: req.description,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(details)))
}

pub async fn list_boards(State(state): State<AppState>, auth: AuthContext) -> ApiResult<Json<Vec<Board>>> {
    Ok(Json(state.services.list_boards(auth.user_id).await?))
}

pub async fn get_board(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BoardDetails>> {
    Ok(Json(state.services.get_board(auth.user_id, id).await?))
}

pub async fn update_board(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateBoardRequest>,
) -> ApiResult<Json<Board>> {
    validate_request(&req)?;

    let board = state
        .services
        .update_board(
            auth.user_id,
            id,
            UpdateBoard {
                name: req.name,
                description: req.description,
            },
        )
        .await?;

    Ok(Json(board))
}

pub async fn delete_board(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.delete_board(auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
