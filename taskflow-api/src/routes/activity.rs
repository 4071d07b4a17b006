/// Activity log endpoints
///
/// Entries are returned in the order they were recorded.

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    Json,
};
use taskflow_shared::{auth::middleware::AuthContext, models::activity::ActivityLogEntry};
use uuid::Uuid;

/// `GET /api/projects/:id/activity`
pub async fn board_activity(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(board_id): Path<Uuid>,
) -> ApiResult<Json<Vec<ActivityLogEntry>>> {
    Ok(Json(state.services.board_activity(auth.user_id, board_id).await?))
}

/// `GET /api/cards/:id/activity`
pub async fn card_activity(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(card_id): Path<Uuid>,
) -> ApiResult<Json<Vec<ActivityLogEntry>>> {
    Ok(Json(state.services.card_activity(auth.user_id, card_id).await?))
}
