/// User model and database operations
///
/// Users are the identities behind every token. They own boards, join boards
/// through memberships, author comments and appear as actors in the activity
/// log.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE global_role AS ENUM ('user', 'admin');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     first_name VARCHAR(100) NOT NULL,
///     last_name VARCHAR(100) NOT NULL,
///     roles global_role[] NOT NULL DEFAULT '{user}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```
/// use taskflow_shared::models::user::{CreateUser, GlobalRole, User};
///
/// let user = User::new(CreateUser {
///     email: "ada@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     first_name: "Ada".to_string(),
///     last_name: "Lovelace".to_string(),
/// });
///
/// assert_eq!(user.roles, vec![GlobalRole::User]);
/// assert!(!user.is_admin());
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use uuid::Uuid;

/// Global (not board-scoped) role of an identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "global_role", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum GlobalRole {
    /// Regular account
    User,

    /// Administrator, may manage other accounts
    Admin,
}

impl sqlx::postgres::PgHasArrayType for GlobalRole {
    fn array_type_info() -> sqlx::postgres::PgTypeInfo {
        sqlx::postgres::PgTypeInfo::with_name("_global_role")
    }
}

impl GlobalRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            GlobalRole::User => "USER",
            GlobalRole::Admin => "ADMIN",
        }
    }
}

/// User account
///
/// The password hash is never serialized into responses.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Email address, unique across all users, used as token subject
    pub email: String,

    /// Argon2id password hash (PHC string)
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Given name
    pub first_name: String,

    /// Family name
    pub last_name: String,

    /// Global roles
    pub roles: Vec<GlobalRole>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the profile was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Email address
    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,

    /// Given name
    pub first_name: String,

    /// Family name
    pub last_name: String,
}

/// Profile changes; only `Some` fields are applied
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUser {
    /// New given name
    pub first_name: Option<String>,

    /// New family name
    pub last_name: Option<String>,

    /// New password hash
    #[serde(skip)]
    pub password_hash: Option<String>,
}

impl User {
    /// Builds a new user with the default `USER` role
    pub fn new(data: CreateUser) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: data.email,
            password_hash: data.password_hash,
            first_name: data.first_name,
            last_name: data.last_name,
            roles: vec![GlobalRole::User],
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the user carries the `ADMIN` global role
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&GlobalRole::Admin)
    }

    /// Applies a profile update and bumps `updated_at`
    pub fn apply(&mut self, changes: UpdateUser) {
        if let Some(first_name) = changes.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = changes.last_name {
            self.last_name = last_name;
        }
        if let Some(password_hash) = changes.password_hash {
            self.password_hash = password_hash;
        }
        self.updated_at = Utc::now();
    }

    /// Inserts a user row
    ///
    /// # Errors
    ///
    /// Fails with a unique violation if the email is already registered.
    pub async fn insert(conn: &mut PgConnection, user: &User) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, first_name, last_name, roles, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.roles)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Finds a user by ID
    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, first_name, last_name, roles, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    /// Finds a user by email address
    pub async fn find_by_email(
        conn: &mut PgConnection,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, first_name, last_name, roles, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(conn)
        .await
    }

    /// Lists all users ordered by email
    pub async fn list(conn: &mut PgConnection) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, first_name, last_name, roles, created_at, updated_at
            FROM users
            ORDER BY email
            "#,
        )
        .fetch_all(conn)
        .await
    }

    /// Persists profile fields of an existing user
    ///
    /// Returns `true` if a row was updated.
    pub async fn update(conn: &mut PgConnection, user: &User) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET first_name = $2, last_name = $3, password_hash = $4, roles = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(&user.roles)
        .bind(user.updated_at)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a user
    ///
    /// Memberships cascade and card assignments are cleared by the schema.
    /// Returns `true` if a row was deleted.
    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts rows that keep a user from being deleted
    ///
    /// Owned boards, authored comments and activity entries where the user
    /// is the actor.
    pub async fn count_references(conn: &mut PgConnection, id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT
                (SELECT COUNT(*) FROM boards WHERE owner_id = $1)
              + (SELECT COUNT(*) FROM comments WHERE user_id = $1)
              + (SELECT COUNT(*) FROM activity_log WHERE user_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(conn)
        .await
    }
}
