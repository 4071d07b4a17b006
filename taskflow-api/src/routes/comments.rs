/// Card comments
///
/// - `GET /api/cards/:id/comments` - Oldest first (member)
/// - `POST /api/cards/:id/comments` - `{ "text" }` (member)
///
/// The card's assignee is emailed about new comments unless they wrote it.

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
use taskflow_shared::{auth::middleware::AuthContext, models::comment::Comment};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, max = 5000, message = "Comment must be 1-5000 characters"))]
    pub text: String,
}

pub async fn list_comments(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(card_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Comment>>> {
    Ok(Json(state.services.list_comments(auth.user_id, card_id).await?))
}

pub async fn add_comment(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(card_id): Path<Uuid>,
    Json(req): Json<CommentRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    validate_request(&req)?;
    let comment = state
        .services
        .add_comment(auth.user_id, card_id, &req.text)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}
