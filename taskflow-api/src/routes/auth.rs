/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Register and receive a token
/// - `POST /api/auth/login` - Exchange credentials for a token
/// - `GET /api/auth/me` - Current identity

use crate::{
    app::AppState,
    error::{validate_request, ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use taskflow_shared::{auth::middleware::AuthContext, error::DomainError, models::user::User};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Given name
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    /// Family name
    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Token response for register and login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Bearer token
    pub access_token: String,

    /// Always "Bearer"
    pub token_type: &'static str,

    /// Token lifetime in seconds
    pub expires_in: i64,

    /// Authenticated profile
    pub user: User,
}

fn token_response(state: &AppState, user: User) -> ApiResult<AuthResponse> {
    let access_token = state.tokens.issue(&user.email)?;
    Ok(AuthResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.tokens.ttl().num_seconds(),
        user,
    })
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/register
/// Content-Type: application/json
///
/// {
///   "email": "ada@example.com",
///   "password": "correct-horse",
///   "first_name": "Ada",
///   "last_name": "Lovelace"
/// }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: Email already exists
/// - `422 Unprocessable Entity`: Validation failed
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    validate_request(&req)?;

    let user = state
        .services
        .register(&req.email, &req.password, &req.first_name, &req.last_name)
        .await?;

    Ok((StatusCode::CREATED, Json(token_response(&state, user)?)))
}

/// Login with email and password
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or wrong password (same message)
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    validate_request(&req)?;

    let user = state
        .services
        .authenticate(&req.email, &req.password)
        .await
        .map_err(|e| match e {
            DomainError::Unauthenticated => ApiError::Unauthorized("Invalid email or password".to_string()),
            other => other.into(),
        })?;

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Json(token_response(&state, user)?))
}

/// Current identity
pub async fn me(State(state): State<AppState>, auth: AuthContext) -> ApiResult<Json<User>> {
    Ok(Json(state.services.get_user(auth.user_id).await?))
}
