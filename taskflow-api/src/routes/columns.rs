/// Column endpoints
///
/// - `GET /api/projects/:id/columns` - Columns in display order (member)
/// - `POST /api/columns` - `{ "board_id", "column_type_id", "display_order" }` (member)
/// - `PUT /api/columns/:id` - Change type or position (member)
/// - `DELETE /api/columns/:id` - Delete with its cards (owner)

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use taskflow_shared::{
    auth::middleware::AuthContext,
    models::column::{Column, CreateColumn, UpdateColumn},
};
use uuid::Uuid;

pub async fn list_columns(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(board_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Column>>> {
    Ok(Json(state.services.list_columns(auth.user_id, board_id).await?))
}

pub async fn create_column(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<CreateColumn>,
) -> ApiResult<(StatusCode, Json<Column>)> {
    let column = state.services.create_column(auth.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(column)))
}

pub async fn update_column(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateColumn>,
) -> ApiResult<Json<Column>> {
    Ok(Json(state.services.update_column(auth.user_id, id, req).await?))
}

pub async fn delete_column(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.delete_column(auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
