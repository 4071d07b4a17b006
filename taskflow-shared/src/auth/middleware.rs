/// Request authentication context
///
/// The authentication gate validates the bearer token, resolves the identity
/// and inserts an [`AuthContext`] into the request extensions. Handlers take
/// `AuthContext` as an extractor; if the gate did not run for a route the
/// extractor rejects with 401, so no handler can observe an unauthenticated
/// caller by accident.
///
/// # Example
///
/// ```no_run
/// use taskflow_shared::auth::middleware::AuthContext;
///
/// async fn handler(auth: AuthContext) -> String {
///     format!("Hello, {}!", auth.email)
/// }
/// ```

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::models::user::{GlobalRole, User};

/// Authenticated caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Email (token subject)
    pub email: String,

    /// Global roles loaded at authentication time
    pub roles: Vec<GlobalRole>,
}

impl AuthContext {
    /// Builds the context for a resolved user
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            roles: user.roles.clone(),
        }
    }

    /// Whether the caller carries the `ADMIN` global role
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&GlobalRole::Admin)
    }
}

/// Error type for request authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header
    #[error("Missing credentials")]
    MissingCredentials,

    /// Header present but not `Bearer <token>`
    #[error("Expected Bearer token")]
    InvalidFormat,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": "unauthorized",
            "message": self.to_string(),
        }));
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header
///
/// # Errors
///
/// - `AuthError::MissingCredentials` if the header is absent
/// - `AuthError::InvalidFormat` if it is not a non-empty bearer token
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat)?;

    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(AuthError::InvalidFormat)?;

    if token.is_empty() {
        return Err(AuthError::InvalidFormat);
    }

    Ok(token)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AuthError::MissingCredentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        map
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_bearer_token_missing() {
        assert!(matches!(
            bearer_token(&HeaderMap::new()),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn test_bearer_token_malformed() {
        assert!(matches!(bearer_token(&headers("Basic dXNlcjpwdw==")), Err(AuthError::InvalidFormat)));
        assert!(matches!(bearer_token(&headers("Bearer ")), Err(AuthError::InvalidFormat)));
        assert!(matches!(bearer_token(&headers("abc.def.ghi")), Err(AuthError::InvalidFormat)));
    }

    #[test]
    fn test_auth_error_is_unauthorized() {
        for err in [
            AuthError::MissingCredentials,
            AuthError::InvalidFormat,
        ] {
            assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn test_extractor_fails_closed_without_context() {
        let (mut parts, _) = axum::http::Request::new(()).into_parts();
        let result = AuthContext::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::MissingCredentials)));
    }
}
