/// Column and column type models
///
/// Column types are a shared catalogue of lane classifications ("To Do",
/// "In Progress", "Done"). Columns are board lanes typed by one of them.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE column_types (
///     id UUID PRIMARY KEY,
///     name VARCHAR(100) NOT NULL UNIQUE,
///     display_order INTEGER NOT NULL DEFAULT 0
/// );
///
/// CREATE TABLE board_columns (
///     id UUID PRIMARY KEY,
///     board_id UUID NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
///     column_type_id UUID NOT NULL REFERENCES column_types(id),
///     display_order INTEGER NOT NULL DEFAULT 0,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use uuid::Uuid;

/// Lane classification shared by all boards
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ColumnType {
    /// Unique ID
    pub id: Uuid,

    /// Unique display name
    pub name: String,

    /// Default position of lanes of this type
    pub display_order: i32,
}

/// Input for creating or replacing a column type
#[derive(Debug, Clone, Deserialize)]
pub struct CreateColumnType {
    /// Unique display name
    pub name: String,

    /// Default position
    #[serde(default)]
    pub display_order: i32,
}

/// Board lane
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Column {
    /// Unique ID
    pub id: Uuid,

    /// Owning board
    pub board_id: Uuid,

    /// Lane classification
    pub column_type_id: Uuid,

    /// Position within the board (not unique)
    pub display_order: i32,

    /// When the column was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a column
#[derive(Debug, Clone, Deserialize)]
pub struct CreateColumn {
    /// Owning board
    pub board_id: Uuid,

    /// Lane classification
    pub column_type_id: Uuid,

    /// Position within the board
    #[serde(default)]
    pub display_order: i32,
}

/// Column changes; only `Some` fields are applied
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateColumn {
    /// New classification
    pub column_type_id: Option<Uuid>,

    /// New position
    pub display_order: Option<i32>,
}

/// Column types seeded by the initial migration: To Do, In Progress, Done
pub fn default_column_types() -> Vec<ColumnType> {
    [("To Do", 0), ("In Progress", 1), ("Done", 2)]
        .into_iter()
        .enumerate()
        .map(|(i, (name, display_order))| ColumnType {
            id: Uuid::from_u128(i as u128 + 1),
            name: name.to_string(),
            display_order,
        })
        .collect()
}

impl ColumnType {
    /// Builds a column type
    pub fn new(data: CreateColumnType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: data.name,
            display_order: data.display_order,
        }
    }

    /// Inserts a column type; duplicate names are a unique violation
    pub async fn insert(conn: &mut PgConnection, column_type: &ColumnType) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO column_types (id, name, display_order) VALUES ($1, $2, $3)")
            .bind(column_type.id)
            .bind(&column_type.name)
            .bind(column_type.display_order)
            .execute(conn)
            .await?;

        Ok(())
    }

    /// Finds a column type by ID
    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ColumnType>(
            "SELECT id, name, display_order FROM column_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    /// Lists column types by display order
    pub async fn list(conn: &mut PgConnection) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ColumnType>(
            "SELECT id, name, display_order FROM column_types ORDER BY display_order, name",
        )
        .fetch_all(conn)
        .await
    }

    /// Persists name and order
    pub async fn update(conn: &mut PgConnection, column_type: &ColumnType) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE column_types SET name = $2, display_order = $3 WHERE id = $1")
            .bind(column_type.id)
            .bind(&column_type.name)
            .bind(column_type.display_order)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a column type
    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM column_types WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether any column is typed by this column type
    pub async fn in_use(conn: &mut PgConnection, id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM board_columns WHERE column_type_id = $1)")
            .bind(id)
            .fetch_one(conn)
            .await
    }
}

impl Column {
    /// Builds a column
    pub fn new(data: CreateColumn) -> Self {
        Self {
            id: Uuid::new_v4(),
            board_id: data.board_id,
            column_type_id: data.column_type_id,
            display_order: data.display_order,
            created_at: Utc::now(),
        }
    }

    /// Inserts a column
    pub async fn insert(conn: &mut PgConnection, column: &Column) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO board_columns (id, board_id, column_type_id, display_order, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(column.id)
        .bind(column.board_id)
        .bind(column.column_type_id)
        .bind(column.display_order)
        .bind(column.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Finds a column by ID
    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Column>(
            r#"
            SELECT id, board_id, column_type_id, display_order, created_at
            FROM board_columns
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    /// Lists the columns of a board by display order
    pub async fn list_by_board(
        conn: &mut PgConnection,
        board_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Column>(
            r#"
            SELECT id, board_id, column_type_id, display_order, created_at
            FROM board_columns
            WHERE board_id = $1
            ORDER BY display_order, created_at, id
            "#,
        )
        .bind(board_id)
        .fetch_all(conn)
        .await
    }

    /// Persists type and order
    pub async fn update(conn: &mut PgConnection, column: &Column) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE board_columns SET column_type_id = $2, display_order = $3 WHERE id = $1",
        )
        .bind(column.id)
        .bind(column.column_type_id)
        .bind(column.display_order)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a column; its cards and their comments cascade
    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM board_columns WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
