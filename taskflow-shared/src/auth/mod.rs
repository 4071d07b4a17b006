/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: bearer token issuance and validation
/// - [`middleware`]: the per-request `AuthContext` and its extractor
/// - [`authorization`]: board ownership/membership predicates and the policy table
///
/// # Example
///
/// ```
/// use chrono::Duration;
/// use taskflow_shared::auth::jwt::TokenService;
/// use taskflow_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let tokens = TokenService::new("a-very-long-secret-of-at-least-32-bytes", Duration::hours(1));
/// let token = tokens.issue("user@example.com")?;
/// assert_eq!(tokens.validate(&token)?.sub, "user@example.com");
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
