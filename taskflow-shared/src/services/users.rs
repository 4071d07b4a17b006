/// Identity operations
///
/// Registration, credential checks and profile management. Emails are
/// normalized to trimmed lowercase before storage and lookup.
///
/// Deleting an identity is refused with `Conflict` while it owns a board or is
/// the author of comments or activity entries; otherwise its memberships go
/// and cards assigned to it become unassigned.

use uuid::Uuid;

use super::{ensure_written, required, Services};
use crate::auth::middleware::AuthContext;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{DomainError, DomainResult};
use crate::models::user::{CreateUser, UpdateUser, User};

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn ensure_self_or_admin(actor: &AuthContext, user_id: Uuid) -> DomainResult<()> {
    if actor.user_id == user_id || actor.is_admin() {
        Ok(())
    } else {
        Err(DomainError::forbidden("You can only manage your own account"))
    }
}

impl Services {
    /// Registers a new identity with the `USER` role
    ///
    /// # Errors
    ///
    /// `Conflict` if the email is already registered.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> DomainResult<User> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(DomainError::invalid("email must not be empty"));
        }
        let first_name = required("first_name", first_name)?;
        let last_name = required("last_name", last_name)?;

        // Hash outside the transaction
        let password_hash = hash_password(password)?;

        let mut tx = self.begin().await?;
        if tx.find_user_by_email(&email).await?.is_some() {
            return Err(DomainError::conflict("Email already registered"));
        }

        let user = User::new(CreateUser {
            email,
            password_hash,
            first_name,
            last_name,
        });
        tx.insert_user(&user).await?;
        tx.commit().await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Checks an email/password pair
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> DomainResult<User> {
        let email = normalize_email(email);
        let mut tx = self.begin().await?;
        let user = match tx.find_user_by_email(&email).await? {
            Some(user) => user,
            None => {
                tracing::debug!("Login attempt for unknown email");
                return Err(DomainError::Unauthenticated);
            }
        };
        drop(tx);

        if !verify_password(password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "Login attempt with wrong password");
            return Err(DomainError::Unauthenticated);
        }

        Ok(user)
    }

    /// Resolves a token subject to the current identity
    ///
    /// An identity deleted after its token was issued is `Unauthenticated`.
    pub async fn resolve_identity(&self, email: &str) -> DomainResult<User> {
        let mut tx = self.begin().await?;
        tx.find_user_by_email(&normalize_email(email))
            .await?
            .ok_or(DomainError::Unauthenticated)
    }

    pub async fn get_user(&self, user_id: Uuid) -> DomainResult<User> {
        let mut tx = self.begin().await?;
        tx.find_user(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", user_id))
    }

    pub async fn list_users(&self) -> DomainResult<Vec<User>> {
        let mut tx = self.begin().await?;
        Ok(tx.list_users().await?)
    }

    /// Updates a profile; `new_password` is hashed before storage
    ///
    /// # Errors
    ///
    /// - `Forbidden` unless the caller is the user or an admin
    /// - `NotFound` if the user does not exist
    pub async fn update_user(
        &self,
        actor: &AuthContext,
        user_id: Uuid,
        mut changes: UpdateUser,
        new_password: Option<&str>,
    ) -> DomainResult<User> {
        ensure_self_or_admin(actor, user_id)?;

        if let Some(first_name) = changes.first_name.as_deref() {
            changes.first_name = Some(required("first_name", first_name)?);
        }
        if let Some(last_name) = changes.last_name.as_deref() {
            changes.last_name = Some(required("last_name", last_name)?);
        }
        if let Some(password) = new_password {
            changes.password_hash = Some(hash_password(password)?);
        }

        let mut tx = self.begin().await?;
        let mut user = tx
            .find_user(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", user_id))?;

        user.apply(changes);
        ensure_written(tx.update_user(&user).await?, "user", user.id)?;
        tx.commit().await?;

        tracing::info!(user_id = %user.id, actor = %actor.user_id, "User updated");
        Ok(user)
    }

    /// Deletes an identity under the reference policy
    ///
    /// # Errors
    ///
    /// - `Forbidden` unless the caller is the user or an admin
    /// - `NotFound` if the user does not exist
    /// - `Conflict` while boards, comments or activity entries reference it
    pub async fn delete_user(&self, actor: &AuthContext, user_id: Uuid) -> DomainResult<()> {
        ensure_self_or_admin(actor, user_id)?;

        let mut tx = self.begin().await?;
        if tx.find_user(user_id).await?.is_none() {
            return Err(DomainError::not_found("user", user_id));
        }

        let references = tx.count_user_references(user_id).await?;
        if references > 0 {
            return Err(DomainError::conflict(format!(
                "User is still referenced by {} boards, comments or activity entries",
                references
            )));
        }

        ensure_written(tx.delete_user(user_id).await?, "user", user_id)?;
        tx.commit().await?;

        tracing::info!(user_id = %user_id, actor = %actor.user_id, "User deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::Fixture;
    use super::*;
    use crate::models::board::CreateBoard;

    #[tokio::test]
    async fn test_register_and_authenticate() {
        let fx = Fixture::new();
        let user = fx
            .services
            .register(" Ada@Example.com ", "correct-horse", "Ada", "Lovelace")
            .await
            .unwrap();
        assert_eq!(user.email, "ada@example.com");

        let found = fx.services.authenticate("ADA@example.com", "correct-horse").await.unwrap();
        assert_eq!(found.id, user.id);

        let err = fx.services.authenticate("ada@example.com", "wrong").await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthenticated));
        let err = fx.services.authenticate("nobody@example.com", "x").await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let fx = Fixture::new();
        fx.user("ada").await;

        let err = fx
            .services
            .register("ada@example.com", "password1", "Ada", "Again")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_requires_self_or_admin() {
        let fx = Fixture::new();
        let ada = fx.user("ada").await;
        let bob = fx.user("bob").await;

        let changes = UpdateUser {
            first_name: Some("Augusta".to_string()),
            ..Default::default()
        };
        let err = fx
            .services
            .update_user(&AuthContext::from_user(&bob), ada.id, changes.clone(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let updated = fx
            .services
            .update_user(&AuthContext::from_user(&ada), ada.id, changes, None)
            .await
            .unwrap();
        assert_eq!(updated.first_name, "Augusta");
    }

    #[tokio::test]
    async fn test_delete_refused_while_owning_a_board() {
        let fx = Fixture::new();
        let ada = fx.user("ada").await;
        fx.services
            .create_board(
                ada.id,
                CreateBoard {
                    name: "Launch".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap();

        let err = fx
            .services
            .delete_user(&AuthContext::from_user(&ada), ada.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_delete_unreferenced_user() {
        let fx = Fixture::new();
        let bob = fx.user("bob").await;

        fx.services
            .delete_user(&AuthContext::from_user(&bob), bob.id)
            .await
            .unwrap();

        let err = fx.services.resolve_identity("bob@example.com").await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthenticated));
    }
}
