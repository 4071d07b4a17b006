/// Board membership endpoints
///
/// - `GET /api/projects/:id/members` - Members with profiles (member)
/// - `POST /api/projects/:id/members` - Invite `{ "user_id", "role" }` (owner)
/// - `DELETE /api/projects/:id/members/:user_id` - Remove (owner)
///
/// `role` is `EDITOR` (default) or `VIEWER`. A second invitation for the same
/// user is `409 Conflict`.

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use taskflow_shared::{auth::middleware::AuthContext, models::membership::AddMember, services::MemberView};
use uuid::Uuid;

pub async fn list_members(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(board_id): Path<Uuid>,
) -> ApiResult<Json<Vec<MemberView>>> {
    Ok(Json(state.services.list_members(auth.user_id, board_id).await?))
}

pub async fn add_member(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(board_id): Path<Uuid>,
    Json(req): Json<AddMember>,
) -> ApiResult<(StatusCode, Json<MemberView>)> {
    let member = state.services.add_member(auth.user_id, board_id, req).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

pub async fn remove_member(
    State(state): State<AppState>,
    auth: AuthContext,
    Path((board_id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    state
        .services
        .remove_member(auth.user_id, board_id, user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
