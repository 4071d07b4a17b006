/// Card endpoints
///
/// # Endpoints
///
/// - `GET /api/projects/:id/cards` - Cards of a board (member)
/// - `POST /api/cards` - Create a card in a column (member)
/// - `GET /api/cards/:id` - Get a card (member)
/// - `PUT /api/cards/:id` - Update fields, including moving within the board (member)
/// - `DELETE /api/cards/:id` - Delete (owner)
/// - `PUT /api/cards/:id/move` - `{ "column_id" }` (member)
/// - `PUT /api/cards/:id/complete` - Set progress to 100 (member)
/// - `PUT /api/cards/:id/assign-me` - Assign the caller (owner)
///
/// Moving a card to a column of another board is `400 Bad Request`.

use crate::{
    app::AppState,
    error::{validate_request, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use taskflow_shared::{
    auth::middleware::AuthContext,
    models::card::{Card, CreateCard, Priority, UpdateCard},
};
use uuid::Uuid;
use validator::Validate;

/// Create card request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCardRequest {
    pub column_id: Uuid,

    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    pub description: Option<String>,

    #[serde(default)]
    pub priority: Priority,

    pub due_date: Option<NaiveDate>,

    #[serde(default)]
    #[validate(range(min = 0, max = 100, message = "Completion must be between 0 and 100"))]
    pub completion_percentage: i32,

    pub assignee_id: Option<Uuid>,
}

impl From<CreateCardRequest> for CreateCard {
    fn from(req: CreateCardRequest) -> Self {
        CreateCard {
            column_id: req.column_id,
            title: req.title,
            description: req.description,
            priority: req.priority,
            due_date: req.due_date,
            completion_percentage: req.completion_percentage,
            assignee_id: req.assignee_id,
        }
    }
}

/// Move card request
#[derive(Debug, Deserialize)]
pub struct MoveCardRequest {
    /// Destination column on the same board
    pub column_id: Uuid,
}

pub async fn list_cards(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(board_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Card>>> {
    Ok(Json(state.services.list_cards(auth.user_id, board_id).await?))
}

pub async fn create_card(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<CreateCardRequest>,
) -> ApiResult<(StatusCode, Json<Card>)> {
    validate_request(&req)?;
    let card = state.services.create_card(auth.user_id, req.into()).await?;
    Ok((StatusCode::CREATED, Json(card)))
}

pub async fn get_card(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Card>> {
    Ok(Json(state.services.get_card(auth.user_id, id).await?))
}

pub async fn update_card(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCard>,
) -> ApiResult<Json<Card>> {
    Ok(Json(state.services.update_card(auth.user_id, id, req).await?))
}

pub async fn delete_card(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.delete_card(auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn move_card(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<MoveCardRequest>,
) -> ApiResult<Json<Card>> {
    Ok(Json(state.services.move_card(auth.user_id, id, req.column_id).await?))
}

pub async fn complete_card(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Card>> {
    Ok(Json(state.services.complete_card(auth.user_id, id).await?))
}

pub async fn assign_self(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Card>> {
    Ok(Json(state.services.assign_self(auth.user_id, id).await?))
}
