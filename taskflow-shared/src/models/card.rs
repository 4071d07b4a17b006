/// Card model and database operations
///
/// A card is a unit of work that lives in exactly one column. Moving a card
/// re-parents it to another column of the same board.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE card_priority AS ENUM ('low', 'medium', 'high', 'urgent');
///
/// CREATE TABLE cards (
///     id UUID PRIMARY KEY,
///     column_id UUID NOT NULL REFERENCES board_columns(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     priority card_priority NOT NULL DEFAULT 'medium',
///     due_date DATE,
///     completion_percentage INTEGER NOT NULL DEFAULT 0
///         CHECK (completion_percentage BETWEEN 0 AND 100),
///     assignee_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```
/// use taskflow_shared::models::card::Priority;
///
/// let p: Priority = "urgente".parse().unwrap();
/// assert_eq!(p, Priority::Urgent);
/// assert_eq!("high".parse::<Priority>().unwrap(), Priority::High);
/// ```

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use uuid::Uuid;

/// Highest allowed completion percentage
pub const COMPLETE: i32 = 100;

/// Card priority
///
/// Parsing is case-insensitive and also accepts the Portuguese labels
/// `baixa`, `media`, `alta` and `urgente`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "card_priority", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "low" | "baixa" => Ok(Priority::Low),
            "medium" | "media" => Ok(Priority::Medium),
            "high" | "alta" => Ok(Priority::High),
            "urgent" | "urgente" => Ok(Priority::Urgent),
            other => Err(format!("unknown priority: {}", other)),
        }
    }
}

impl TryFrom<String> for Priority {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Card
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Card {
    /// Unique ID
    pub id: Uuid,

    /// Parent column
    pub column_id: Uuid,

    /// Title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Priority
    pub priority: Priority,

    /// Optional due date
    pub due_date: Option<NaiveDate>,

    /// Progress, 0..=100
    pub completion_percentage: i32,

    /// Assigned user, if any
    pub assignee_id: Option<Uuid>,

    /// When the card was created
    pub created_at: DateTime<Utc>,

    /// When the card was last changed
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a card
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCard {
    /// Parent column
    pub column_id: Uuid,

    /// Title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Priority (defaults to MEDIUM)
    #[serde(default)]
    pub priority: Priority,

    /// Optional due date
    pub due_date: Option<NaiveDate>,

    /// Initial progress (defaults to 0)
    #[serde(default)]
    pub completion_percentage: i32,

    /// Optional assignee; must be a member of the board
    pub assignee_id: Option<Uuid>,
}

/// Card changes; only `Some` fields are applied
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCard {
    /// Target column on the same board
    pub column_id: Option<Uuid>,

    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New priority
    pub priority: Option<Priority>,

    /// New due date
    pub due_date: Option<NaiveDate>,

    /// New progress
    pub completion_percentage: Option<i32>,

    /// New assignee; must be a member of the board
    pub assignee_id: Option<Uuid>,
}

/// Checks that a completion percentage is within 0..=100
pub fn valid_completion(value: i32) -> bool {
    (0..=COMPLETE).contains(&value)
}

impl Card {
    /// Builds a card
    pub fn new(data: CreateCard) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            column_id: data.column_id,
            title: data.title,
            description: data.description,
            priority: data.priority,
            due_date: data.due_date,
            completion_percentage: data.completion_percentage,
            assignee_id: data.assignee_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Bumps `updated_at`
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Inserts a card
    pub async fn insert(conn: &mut PgConnection, card: &Card) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO cards (id, column_id, title, description, priority, due_date,
                               completion_percentage, assignee_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(card.id)
        .bind(card.column_id)
        .bind(&card.title)
        .bind(&card.description)
        .bind(card.priority)
        .bind(card.due_date)
        .bind(card.completion_percentage)
        .bind(card.assignee_id)
        .bind(card.created_at)
        .bind(card.updated_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Finds a card by ID
    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Card>(
            r#"
            SELECT id, column_id, title, description, priority, due_date,
                   completion_percentage, assignee_id, created_at, updated_at
            FROM cards
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    /// Lists every card on every column of a board
    pub async fn list_by_board(
        conn: &mut PgConnection,
        board_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Card>(
            r#"
            SELECT c.id, c.column_id, c.title, c.description, c.priority, c.due_date,
                   c.completion_percentage, c.assignee_id, c.created_at, c.updated_at
            FROM cards c
            JOIN board_columns col ON col.id = c.column_id
            WHERE col.board_id = $1
            ORDER BY col.display_order, c.created_at, c.id
            "#,
        )
        .bind(board_id)
        .fetch_all(conn)
        .await
    }

    /// Persists every mutable field
    pub async fn update(conn: &mut PgConnection, card: &Card) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE cards
            SET column_id = $2, title = $3, description = $4, priority = $5, due_date = $6,
                completion_percentage = $7, assignee_id = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(card.id)
        .bind(card.column_id)
        .bind(&card.title)
        .bind(&card.description)
        .bind(card.priority)
        .bind(card.due_date)
        .bind(card.completion_percentage)
        .bind(card.assignee_id)
        .bind(card.updated_at)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a card; comments cascade
    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cards WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
