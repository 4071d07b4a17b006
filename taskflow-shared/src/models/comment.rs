/// Comment model and database operations
///
/// Comments are immutable once written.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE comments (
///     id UUID PRIMARY KEY,
///     card_id UUID NOT NULL REFERENCES cards(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id),
///     text TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use uuid::Uuid;

/// Comment on a card
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub card_id: Uuid,
    /// Author
    pub user_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Builds a comment authored now
    pub fn new(card_id: Uuid, user_id: Uuid, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            card_id,
            user_id,
            text,
            created_at: Utc::now(),
        }
    }

    /// Inserts a comment
    pub async fn insert(conn: &mut PgConnection, comment: &Comment) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO comments (id, card_id, user_id, text, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(comment.id)
        .bind(comment.card_id)
        .bind(comment.user_id)
        .bind(&comment.text)
        .bind(comment.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Lists comments of a card, oldest first
    pub async fn list_by_card(
        conn: &mut PgConnection,
        card_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, card_id, user_id, text, created_at
            FROM comments
            WHERE card_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(card_id)
        .fetch_all(conn)
        .await
    }
}
