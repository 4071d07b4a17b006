/// Domain error taxonomy
///
/// Every operation in the board hierarchy, the authorization layer and the
/// persistence seam surfaces one of these variants. The API layer maps them
/// to HTTP status codes with an exhaustive match, so a predictable domain
/// failure never turns into a generic 500.
///
/// | Variant | HTTP |
/// |---|---|
/// | `Unauthenticated` | 401 |
/// | `Forbidden` | 403 |
/// | `NotFound` | 404 |
/// | `Conflict` | 409 |
/// | `InvalidArgument` | 400 |
/// | `Storage` | 500 |
///
/// # Example
///
/// ```
/// use taskflow_shared::error::DomainError;
/// use uuid::Uuid;
///
/// let err = DomainError::not_found("board", Uuid::nil());
/// assert_eq!(err.to_string(), "board not found: 00000000-0000-0000-0000-000000000000");
/// ```

use std::fmt::Display;

use crate::auth::password::PasswordError;
use crate::db::store::StoreError;

/// Result alias used by services and authorization checks
pub type DomainResult<T> = Result<T, DomainError>;

/// Closed set of failures visible to callers
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// Missing, invalid or expired credentials
    #[error("authentication required")]
    Unauthenticated,

    /// Authenticated and a member, but the operation needs more rights
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Entity lookup failed
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity type ("board", "card", ...)
        entity: &'static str,
        /// Identifier used for the lookup
        id: String,
    },

    /// Uniqueness or state conflict (duplicate membership, email taken)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Structural invariant violated by the request
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Persistence layer failure
    #[error("storage failure: {0}")]
    Storage(String),
}

impl DomainError {
    /// Builds a `NotFound` for the given entity type and identifier
    pub fn not_found(entity: &'static str, id: impl Display) -> Self {
        DomainError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Builds a `Forbidden` error
    pub fn forbidden(message: impl Into<String>) -> Self {
        DomainError::Forbidden(message.into())
    }

    /// Builds a `Conflict` error
    pub fn conflict(message: impl Into<String>) -> Self {
        DomainError::Conflict(message.into())
    }

    /// Builds an `InvalidArgument` error
    pub fn invalid(message: impl Into<String>) -> Self {
        DomainError::InvalidArgument(message.into())
    }
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => DomainError::NotFound { entity, id },
            StoreError::Conflict(msg) => DomainError::Conflict(msg),
            StoreError::Database(e) => DomainError::Storage(e.to_string()),
            StoreError::Unavailable(msg) => DomainError::Storage(msg),
        }
    }
}

/// Hashing failures are server faults, never a credential mismatch
impl From<PasswordError> for DomainError {
    fn from(err: PasswordError) -> Self {
        DomainError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_not_found_display() {
        let id = Uuid::new_v4();
        let err = DomainError::not_found("card", id);
        assert_eq!(err.to_string(), format!("card not found: {}", id));
    }

    #[test]
    fn test_store_error_conversion() {
        let err: DomainError = StoreError::Conflict("duplicate membership".to_string()).into();
        assert!(matches!(err, DomainError::Conflict(_)));

        let err: DomainError = StoreError::NotFound {
            entity: "column",
            id: "x".to_string(),
        }
        .into();
        assert!(matches!(err, DomainError::NotFound { entity: "column", .. }));

        let err: DomainError = StoreError::Unavailable("pool closed".to_string()).into();
        assert!(matches!(err, DomainError::Storage(_)));
    }
}
