/// Column type catalogue endpoints
///
/// Open to any authenticated identity.
///
/// - `POST /api/column-types` - `{ "name", "display_order" }`
/// - `GET /api/column-types`
/// - `GET /api/column-types/:id`
/// - `PUT /api/column-types/:id`
/// - `DELETE /api/column-types/:id` - `409` while a column uses it

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
    models::column::{ColumnType, CreateColumnType},
};
use uuid::Uuid;
use validator::Validate;

/// Column type request
#[derive(Debug, Deserialize, Validate)]
pub struct ColumnTypeRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[serde(default)]
    pub display_order: i32,
}

impl From<ColumnTypeRequest> for CreateColumnType {
    fn from(req: ColumnTypeRequest) -> Self {
        CreateColumnType {
            name: req.name,
            display_order: req.display_order,
        }
    }
}

pub async fn create_column_type(
    State(state): State<AppState>,
    _auth: AuthContext,
    Json(req): Json<ColumnTypeRequest>,
) -> ApiResult<(StatusCode, Json<ColumnType>)> {
    validate_request(&req)?;
    let column_type = state.services.create_column_type(req.into()).await?;
    Ok((StatusCode::CREATED, Json(column_type)))
}

pub async fn list_column_types(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> ApiResult<Json<Vec<ColumnType>>> {
    Ok(Json(state.services.list_column_types().await?))
}

pub async fn get_column_type(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ColumnType>> {
    Ok(Json(state.services.get_column_type(id).await?))
}

pub async fn update_column_type(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<ColumnTypeRequest>,
) -> ApiResult<Json<ColumnType>> {
    validate_request(&req)?;
    Ok(Json(state.services.update_column_type(id, req.into()).await?))
}

pub async fn delete_column_type(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.delete_column_type(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
