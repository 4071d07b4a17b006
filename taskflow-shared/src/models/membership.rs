/// Board membership model and database operations
///
/// A membership grants a user access to a board with a role. The pair
/// `(board_id, user_id)` is the primary key, so two concurrent invitations
/// of the same user cannot both succeed.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE member_role AS ENUM ('owner', 'editor', 'viewer');
///
/// CREATE TABLE board_members (
///     board_id UUID NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     role member_role NOT NULL DEFAULT 'editor',
///     joined_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (board_id, user_id)
/// );
/// ```
///
/// # Roles
///
/// - **owner**: the board creator; materialized when the board is created
/// - **editor**: invited collaborator
/// - **viewer**: invited collaborator with a read-oriented role label
///
/// Access decisions only distinguish owner from member; see
/// [`crate::auth::authorization`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use uuid::Uuid;

/// Board-scoped role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "member_role", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum MemberRole {
    /// Board creator
    Owner,

    /// Collaborator
    Editor,

    /// Read-oriented collaborator
    Viewer,
}

impl MemberRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Owner => "OWNER",
            MemberRole::Editor => "EDITOR",
            MemberRole::Viewer => "VIEWER",
        }
    }
}

/// Membership row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    /// Board ID
    pub board_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role on the board
    pub role: MemberRole,

    /// When the user joined
    pub joined_at: DateTime<Utc>,
}

/// Input for inviting a member
#[derive(Debug, Clone, Deserialize)]
pub struct AddMember {
    /// User to invite
    pub user_id: Uuid,

    /// Role to grant (defaults to Editor)
    #[serde(default = "default_role")]
    pub role: MemberRole,
}

fn default_role() -> MemberRole {
    MemberRole::Editor
}

impl Membership {
    /// Builds a membership joined now
    pub fn new(board_id: Uuid, user_id: Uuid, role: MemberRole) -> Self {
        Self {
            board_id,
            user_id,
            role,
            joined_at: Utc::now(),
        }
    }

    /// Inserts a membership
    ///
    /// # Errors
    ///
    /// Fails with a unique violation if the pair already exists.
    pub async fn insert(conn: &mut PgConnection, membership: &Membership) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO board_members (board_id, user_id, role, joined_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(membership.board_id)
        .bind(membership.user_id)
        .bind(membership.role)
        .bind(membership.joined_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Finds the membership for a (board, user) pair
    pub async fn find(
        conn: &mut PgConnection,
        board_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Membership>(
            r#"
            SELECT board_id, user_id, role, joined_at
            FROM board_members
            WHERE board_id = $1 AND user_id = $2
            "#,
        )
        .bind(board_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await
    }

    /// Lists memberships of a board in join order
    pub async fn list_by_board(
        conn: &mut PgConnection,
        board_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Membership>(
            r#"
            SELECT board_id, user_id, role, joined_at
            FROM board_members
            WHERE board_id = $1
            ORDER BY joined_at, user_id
            "#,
        )
        .bind(board_id)
        .fetch_all(conn)
        .await
    }

    /// Deletes a membership; returns `true` if one existed
    pub async fn delete(
        conn: &mut PgConnection,
        board_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM board_members WHERE board_id = $1 AND user_id = $2")
            .bind(board_id)
            .bind(user_id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
