/// Activity log model and database operations
///
/// The activity log is an append-only audit trail. Every mutation in the
/// board hierarchy appends exactly one entry inside the same transaction as
/// the mutation itself, so a failed append rolls the mutation back.
///
/// Entries keep `board_id` and `card_id` as plain historical references
/// without foreign keys: deleting a board or card never removes its trail.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE activity_log (
///     sequence BIGINT GENERATED ALWAYS AS IDENTITY UNIQUE,
///     id UUID PRIMARY KEY,
///     event_type activity_event NOT NULL,
///     details TEXT NOT NULL,
///     user_id UUID NOT NULL REFERENCES users(id),
///     board_id UUID,
///     card_id UUID,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Ordering is by `sequence`, which equals insertion order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use uuid::Uuid;

/// Kind of audited mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "activity_event", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    BoardCreated,
    BoardUpdated,
    BoardDeleted,
    MemberAdded,
    MemberRemoved,
    ColumnCreated,
    ColumnUpdated,
    ColumnDeleted,
    CardCreated,
    CardUpdated,
    CardMoved,
    CardCompleted,
    CardDeleted,
    MemberAssigned,
    CommentCreated,
}

/// Stored activity entry
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ActivityLogEntry {
    /// Unique ID
    pub id: Uuid,

    /// Monotonic insertion order
    pub sequence: i64,

    /// What happened
    pub event_type: EventType,

    /// Human-readable description
    pub details: String,

    /// Actor
    pub user_id: Uuid,

    /// Board the event relates to, if any
    pub board_id: Option<Uuid>,

    /// Card the event relates to, if any
    pub card_id: Option<Uuid>,

    /// When the entry was appended
    pub created_at: DateTime<Utc>,
}

/// Entry to append; the store assigns id, sequence and timestamp
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub event_type: EventType,
    pub details: String,
    pub user_id: Uuid,
    pub board_id: Option<Uuid>,
    pub card_id: Option<Uuid>,
}

impl NewActivity {
    /// Board-level event
    pub fn board(event_type: EventType, user_id: Uuid, board_id: Uuid, details: String) -> Self {
        Self {
            event_type,
            details,
            user_id,
            board_id: Some(board_id),
            card_id: None,
        }
    }

    /// Card-level event, also attached to the card's board
    pub fn card(
        event_type: EventType,
        user_id: Uuid,
        board_id: Uuid,
        card_id: Uuid,
        details: String,
    ) -> Self {
        Self {
            event_type,
            details,
            user_id,
            board_id: Some(board_id),
            card_id: Some(card_id),
        }
    }
}

impl ActivityLogEntry {
    /// Appends an entry and returns it with its assigned sequence
    pub async fn append(conn: &mut PgConnection, entry: NewActivity) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ActivityLogEntry>(
            r#"
            INSERT INTO activity_log (id, event_type, details, user_id, board_id, card_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, sequence, event_type, details, user_id, board_id, card_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(entry.event_type)
        .bind(&entry.details)
        .bind(entry.user_id)
        .bind(entry.board_id)
        .bind(entry.card_id)
        .bind(Utc::now())
        .fetch_one(conn)
        .await
    }

    /// Lists entries for a board in insertion order
    pub async fn list_by_board(
        conn: &mut PgConnection,
        board_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ActivityLogEntry>(
            r#"
            SELECT id, sequence, event_type, details, user_id, board_id, card_id, created_at
            FROM activity_log
            WHERE board_id = $1
            ORDER BY sequence
            "#,
        )
        .bind(board_id)
        .fetch_all(conn)
        .await
    }

    /// Lists entries for a card in insertion order
    pub async fn list_by_card(
        conn: &mut PgConnection,
        card_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ActivityLogEntry>(
            r#"
            SELECT id, sequence, event_type, details, user_id, board_id, card_id, created_at
            FROM activity_log
            WHERE card_id = $1
            ORDER BY sequence
            "#,
        )
        .bind(card_id)
        .fetch_all(conn)
        .await
    }
}
