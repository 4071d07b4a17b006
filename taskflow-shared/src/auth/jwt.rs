/// Token service: JWT issuance and validation
///
/// Tokens are compact HS256 JWTs whose subject is the identity's email.
/// The signing and verification keys are derived once from the configured
/// secret when the service is built at startup and are reused for every
/// request.
///
/// Validation is stateless: it never consults the user store. A deleted
/// identity holding a still-valid token passes validation here and is
/// rejected later by the authentication gate's user lookup.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiry**: `iat + ttl`, checked with zero leeway
/// - **Issuer**: always `"taskflow"`
/// - **Secret**: at least 32 bytes, enforced by configuration
///
/// # Example
///
/// ```
/// use chrono::Duration;
/// use taskflow_shared::auth::jwt::TokenService;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tokens = TokenService::new("a-very-long-secret-of-at-least-32-bytes", Duration::hours(24));
///
/// let token = tokens.issue("ada@example.com")?;
/// let claims = tokens.validate(&token)?;
/// assert_eq!(claims.sub, "ada@example.com");
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Issuer claim stamped on every token
pub const ISSUER: &str = "taskflow";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Malformed token, bad signature or wrong issuer
    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - identity email
    pub sub: String,

    /// Issuer - always "taskflow"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Claims for `email` expiring `ttl` from now
    ///
    /// Expiry saturates at the latest representable instant.
    pub fn new(email: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        let exp = now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            sub: email.into(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    /// Checks if the claims have expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Issues and validates tokens with a process-wide key
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl_seconds", &self.ttl.num_seconds())
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Builds the keys from `secret`; tokens live for `ttl`
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// Configured token lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token whose subject is `email`
    ///
    /// # Errors
    ///
    /// Returns `JwtError::CreateError` if encoding fails
    pub fn issue(&self, email: &str) -> Result<String, JwtError> {
        let claims = Claims::new(email, self.ttl);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
    }

    /// Verifies signature, issuer and expiry and returns the claims
    ///
    /// # Errors
    ///
    /// - `JwtError::Expired` once `exp` has passed
    /// - `JwtError::Invalid` for anything else
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_issue_and_validate() {
        let tokens = TokenService::new(SECRET, Duration::hours(1));
        let token = tokens.issue("ada@example.com").expect("Should issue token");

        let claims = tokens.validate(&token).expect("Should validate token");
        assert_eq!(claims.sub, "ada@example.com");
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let issuer = TokenService::new(SECRET, Duration::hours(1));
        let other = TokenService::new("another-secret-key-at-least-32-bytes!", Duration::hours(1));

        let token = issuer.issue("ada@example.com").unwrap();
        assert!(matches!(other.validate(&token), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn test_malformed_token_is_invalid() {
        let tokens = TokenService::new(SECRET, Duration::hours(1));
        assert!(matches!(tokens.validate("not.a.jwt"), Err(JwtError::Invalid(_))));
        assert!(matches!(tokens.validate(""), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn test_already_expired_token() {
        let tokens = TokenService::new(SECRET, Duration::seconds(-60));
        let token = tokens.issue("ada@example.com").unwrap();
        assert!(matches!(tokens.validate(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_one_second_token_expires_after_two_seconds() {
        let tokens = TokenService::new(SECRET, Duration::seconds(1));
        let token = tokens.issue("ada@example.com").unwrap();
        assert!(tokens.validate(&token).is_ok());

        std::thread::sleep(std::time::Duration::from_secs(2));

        assert!(matches!(tokens.validate(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_expiry_saturates_instead_of_overflowing() {
        let claims = Claims::new("ada@example.com", Duration::days(365 * 300_000));
        assert_eq!(claims.exp, DateTime::<Utc>::MAX_UTC.timestamp());
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_foreign_issuer_is_invalid() {
        let tokens = TokenService::new(SECRET, Duration::hours(1));
        let mut claims = Claims::new("ada@example.com", Duration::hours(1));
        claims.iss = "someone-else".to_string();

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(tokens.validate(&token), Err(JwtError::Invalid(_))));
    }
}
