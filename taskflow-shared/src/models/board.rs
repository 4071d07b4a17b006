/// Board model and database operations
///
/// A board is the top-level project container. It has exactly one owner and
/// exclusively owns its columns and memberships; deleting a board removes
/// both, and through the columns, every card and comment below them.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE boards (
///     id UUID PRIMARY KEY,
///     name VARCHAR(200) NOT NULL,
///     description TEXT,
///     owner_id UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use uuid::Uuid;

/// Board (project)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Board {
    /// Unique board ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Optional free-text description
    pub description: Option<String>,

    /// Owning identity
    pub owner_id: Uuid,

    /// When the board was created
    pub created_at: DateTime<Utc>,

    /// When the board was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a board
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBoard {
    /// Display name
    pub name: String,

    /// Optional description
    pub description: Option<String>,
}

/// Board changes; only `Some` fields are applied
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBoard {
    /// New name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,
}

impl Board {
    /// Builds a board owned by `owner_id`
    pub fn new(owner_id: Uuid, data: CreateBoard) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: data.name,
            description: data.description,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies changes and bumps `updated_at`
    pub fn apply(&mut self, changes: UpdateBoard) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(description) = changes.description {
            self.description = Some(description);
        }
        self.updated_at = Utc::now();
    }

    /// Inserts a board row
    pub async fn insert(conn: &mut PgConnection, board: &Board) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO boards (id, name, description, owner_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(board.id)
        .bind(&board.name)
        .bind(&board.description)
        .bind(board.owner_id)
        .bind(board.created_at)
        .bind(board.updated_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Finds a board by ID and takes a shared row lock on it
    ///
    /// The lock makes any mutation under this board wait for a concurrent
    /// board delete to finish; afterwards the board is simply gone.
    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Board>(
            r#"
            SELECT id, name, description, owner_id, created_at, updated_at
            FROM boards
            WHERE id = $1
            FOR SHARE
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    /// Lists boards the user owns or is a member of, newest first
    pub async fn list_for_user(
        conn: &mut PgConnection,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Board>(
            r#"
            SELECT b.id, b.name, b.description, b.owner_id, b.created_at, b.updated_at
            FROM boards b
            WHERE b.owner_id = $1
               OR EXISTS (
                   SELECT 1 FROM board_members m
                   WHERE m.board_id = b.id AND m.user_id = $1
               )
            ORDER BY b.created_at DESC, b.id
            "#,
        )
        .bind(user_id)
        .fetch_all(conn)
        .await
    }

    /// Persists name and description changes
    pub async fn update(conn: &mut PgConnection, board: &Board) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE boards
            SET name = $2, description = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(board.id)
        .bind(&board.name)
        .bind(&board.description)
        .bind(board.updated_at)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a board; columns, cards, comments and memberships cascade
    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_keeps_unset_fields() {
        let mut board = Board::new(
            Uuid::new_v4(),
            CreateBoard {
                name: "Roadmap".to_string(),
                description: Some("Q3".to_string()),
            },
        );

        board.apply(UpdateBoard {
            name: Some("Roadmap 2".to_string()),
            description: None,
        });

        assert_eq!(board.name, "Roadmap 2");
        assert_eq!(board.description.as_deref(), Some("Q3"));
    }
}
