/// Error handling for the API server
///
/// Every handler returns `ApiResult<T>`. Domain failures convert through an
/// exhaustive match on `DomainError`, so each variant has exactly one status
/// code and none of them degrades into a generic 500:
///
/// | Domain | HTTP |
/// |---|---|
/// | `Unauthenticated` | 401 |
/// | `Forbidden` | 403 |
/// | `NotFound` | 404 |
/// | `Conflict` | 409 |
/// | `InvalidArgument` | 400 |
/// | `Storage` | 500 (details logged, masked in the body) |
///
/// Request bodies that fail `validator` rules produce 422 with per-field
/// details.
///
/// # Example
///
/// ```
/// use taskflow_api::error::{ApiError, ApiResult};
/// use taskflow_shared::error::DomainError;
///
/// fn lookup() -> ApiResult<()> {
///     Err(DomainError::not_found("board", "42"))?
/// }
///
/// assert!(matches!(lookup(), Err(ApiError::NotFound(_))));
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use taskflow_shared::{
    auth::{jwt::JwtError, middleware::AuthError, password::PasswordError},
    error::DomainError,
};
use validator::Validate;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - e.g., duplicate membership
    Conflict(String),

    /// Unprocessable entity (422) - validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_code, message, details) = match self {
            ApiError::BadRequest(msg) => ("bad_request", msg, None),
            ApiError::Unauthorized(msg) => ("unauthorized", msg, None),
            ApiError::Forbidden(msg) => ("forbidden", msg, None),
            ApiError::NotFound(msg) => ("not_found", msg, None),
            ApiError::Conflict(msg) => ("conflict", msg, None),
            ApiError::ValidationError(errors) => (
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                ("internal_error", "An internal error occurred".to_string(), None)
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert domain errors to API errors
impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Unauthenticated => ApiError::Unauthorized("Authentication required".to_string()),
            DomainError::Forbidden(msg) => ApiError::Forbidden(msg),
            err @ DomainError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DomainError::Conflict(msg) => ApiError::Conflict(msg),
            DomainError::InvalidArgument(msg) => ApiError::BadRequest(msg),
            DomainError::Storage(msg) => ApiError::InternalError(msg),
        }
    }
}

/// Convert request authentication errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::Invalid(_) => ApiError::Unauthorized("Invalid token".to_string()),
            JwtError::CreateError(msg) => ApiError::InternalError(msg),
        }
    }
}

/// Runs `validator` rules on a request body
///
/// # Errors
///
/// `ApiError::ValidationError` listing every failing field.
pub fn validate_request<T: Validate>(req: &T) -> ApiResult<()> {
    req.validate().map_err(|e| {
        let mut errors: Vec<ValidationErrorDetail> = e
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        errors.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::ValidationError(errors)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("card not found".to_string());
        assert_eq!(err.to_string(), "Not found: card not found");
    }

    #[test]
    fn test_domain_error_mapping_is_total() {
        let cases = [
            (DomainError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (DomainError::forbidden("owner only"), StatusCode::FORBIDDEN),
            (DomainError::not_found("board", "x"), StatusCode::NOT_FOUND),
            (DomainError::conflict("duplicate"), StatusCode::CONFLICT),
            (DomainError::invalid("bad column"), StatusCode::BAD_REQUEST),
            (DomainError::Storage("boom".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (domain, status) in cases {
            assert_eq!(ApiError::from(domain).status(), status);
        }
    }

    #[test]
    fn test_jwt_errors_are_unauthorized() {
        assert_eq!(ApiError::from(JwtError::Expired).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::from(JwtError::Invalid("bad signature".to_string())).status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_validation_error() {
        let errors = vec![
            ValidationErrorDetail {
                field: "email".to_string(),
                message: "Invalid email format".to_string(),
            },
            ValidationErrorDetail {
                field: "password".to_string(),
                message: "Password too short".to_string(),
            },
        ];

        let err = ApiError::ValidationError(errors);
        assert_eq!(err.to_string(), "Validation failed: 2 errors");
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
