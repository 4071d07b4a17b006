/// Persistence seam
///
/// Services never talk to a database directly. They open a [`StoreTx`]
/// through a [`Store`], run every read, authorization check and write of one
/// operation inside it, and commit once at the end. Dropping a transaction
/// without calling [`StoreTx::commit`] rolls it back.
///
/// Two implementations exist:
///
/// - [`crate::db::postgres::PgStore`]: PostgreSQL through sqlx
/// - [`crate::db::memory::MemoryStore`]: an in-process arena for tests and
///   local development
///
/// # Example
///
/// ```
/// use taskflow_shared::db::memory::MemoryStore;
/// use taskflow_shared::db::store::{Store, StoreTx};
/// use taskflow_shared::models::user::{CreateUser, User};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
///
/// let mut tx = store.begin().await?;
/// let user = User::new(CreateUser {
///     email: "ada@example.com".to_string(),
///     password_hash: "hash".to_string(),
///     first_name: "Ada".to_string(),
///     last_name: "Lovelace".to_string(),
/// });
/// tx.insert_user(&user).await?;
/// tx.commit().await?;
///
/// let mut tx = store.begin().await?;
/// assert!(tx.find_user_by_email("ada@example.com").await?.is_some());
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use sqlx::postgres::PgDatabaseError;
use uuid::Uuid;

use crate::models::{
    activity::{ActivityLogEntry, NewActivity},
    board::Board,
    card::Card,
    column::{Column, ColumnType},
    comment::Comment,
    membership::Membership,
    user::User,
};

/// Error type for persistence operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Row to update or delete does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Uniqueness constraint violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Backend cannot serve the request (closed pool, poisoned state)
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let what = db_err
                    .constraint()
                    .map(|c| format!("Constraint violation: {}", c))
                    .unwrap_or_else(|| db_err.message().to_string());
                return StoreError::Conflict(what);
            }
            if db_err.is_foreign_key_violation() {
                let constraint = db_err.constraint().unwrap_or_default();

                // Deleting a row that is still referenced
                if db_err.message().starts_with("update or delete") {
                    return StoreError::Conflict(format!("Still referenced: {}", constraint));
                }

                // Inserting or updating against a parent that a concurrent
                // transaction removed
                let detail = db_err
                    .try_downcast_ref::<PgDatabaseError>()
                    .and_then(PgDatabaseError::detail)
                    .unwrap_or_default();
                return StoreError::NotFound {
                    entity: referenced_entity(constraint),
                    id: referenced_key(detail).unwrap_or(constraint).to_string(),
                };
            }
        }
        StoreError::Database(err)
    }
}

/// Entity named by a default PostgreSQL foreign key constraint
/// (`<table>_<column>_fkey`)
fn referenced_entity(constraint: &str) -> &'static str {
    if constraint.contains("column_type_id") {
        "column type"
    } else if constraint.contains("column_id") {
        "column"
    } else if constraint.contains("card_id") {
        "card"
    } else if constraint.contains("board_id") {
        "board"
    } else {
        "user"
    }
}

/// Key value from a detail such as
/// `Key (column_id)=(...) is not present in table "board_columns".`
fn referenced_key(detail: &str) -> Option<&str> {
    let start = detail.find(")=(")? + 3;
    let len = detail[start..].find(')')?;
    Some(&detail[start..start + len])
}

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Factory for transactions
#[async_trait]
pub trait Store: Send + Sync {
    /// Opens a transaction
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>>;

    /// Checks that the backend is reachable
    async fn ping(&self) -> StoreResult<()>;

    /// Short backend name for health output ("postgres", "memory")
    fn backend(&self) -> &'static str;
}

/// One unit of work against the store
///
/// Lookups return `Ok(None)` for missing rows. Updates and deletes return
/// `Ok(false)` when the target row does not exist.
#[async_trait]
pub trait StoreTx: Send {
    // Users
    async fn insert_user(&mut self, user: &User) -> StoreResult<()>;
    async fn find_user(&mut self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&mut self, email: &str) -> StoreResult<Option<User>>;
    async fn list_users(&mut self) -> StoreResult<Vec<User>>;
    async fn update_user(&mut self, user: &User) -> StoreResult<bool>;
    /// Removes the user's memberships, clears card assignments, then the user
    async fn delete_user(&mut self, id: Uuid) -> StoreResult<bool>;
    /// Owned boards + authored comments + activity entries as actor
    async fn count_user_references(&mut self, id: Uuid) -> StoreResult<i64>;

    // Boards
    async fn insert_board(&mut self, board: &Board) -> StoreResult<()>;
    async fn find_board(&mut self, id: Uuid) -> StoreResult<Option<Board>>;
    async fn list_boards_for_user(&mut self, user_id: Uuid) -> StoreResult<Vec<Board>>;
    async fn update_board(&mut self, board: &Board) -> StoreResult<bool>;
    /// Cascades to columns, cards, comments and memberships
    async fn delete_board(&mut self, id: Uuid) -> StoreResult<bool>;

    // Memberships
    /// Fails with `Conflict` if the pair already exists
    async fn insert_membership(&mut self, membership: &Membership) -> StoreResult<()>;
    async fn find_membership(
        &mut self,
        board_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Membership>>;
    async fn list_memberships(&mut self, board_id: Uuid) -> StoreResult<Vec<Membership>>;
    async fn delete_membership(&mut self, board_id: Uuid, user_id: Uuid) -> StoreResult<bool>;

    // Column types
    /// Fails with `Conflict` on a duplicate name
    async fn insert_column_type(&mut self, column_type: &ColumnType) -> StoreResult<()>;
    async fn find_column_type(&mut self, id: Uuid) -> StoreResult<Option<ColumnType>>;
    async fn list_column_types(&mut self) -> StoreResult<Vec<ColumnType>>;
    async fn update_column_type(&mut self, column_type: &ColumnType) -> StoreResult<bool>;
    async fn delete_column_type(&mut self, id: Uuid) -> StoreResult<bool>;
    async fn column_type_in_use(&mut self, id: Uuid) -> StoreResult<bool>;

    // Columns
    async fn insert_column(&mut self, column: &Column) -> StoreResult<()>;
    async fn find_column(&mut self, id: Uuid) -> StoreResult<Option<Column>>;
    async fn list_columns(&mut self, board_id: Uuid) -> StoreResult<Vec<Column>>;
    async fn update_column(&mut self, column: &Column) -> StoreResult<bool>;
    /// Cascades to cards and their comments
    async fn delete_column(&mut self, id: Uuid) -> StoreResult<bool>;

    // Cards
    async fn insert_card(&mut self, card: &Card) -> StoreResult<()>;
    async fn find_card(&mut self, id: Uuid) -> StoreResult<Option<Card>>;
    async fn list_cards_for_board(&mut self, board_id: Uuid) -> StoreResult<Vec<Card>>;
    async fn update_card(&mut self, card: &Card) -> StoreResult<bool>;
    /// Cascades to comments
    async fn delete_card(&mut self, id: Uuid) -> StoreResult<bool>;

    // Comments
    async fn insert_comment(&mut self, comment: &Comment) -> StoreResult<()>;
    async fn list_comments(&mut self, card_id: Uuid) -> StoreResult<Vec<Comment>>;

    // Activity log
    async fn append_activity(&mut self, entry: NewActivity) -> StoreResult<ActivityLogEntry>;
    async fn list_activity_for_board(&mut self, board_id: Uuid)
        -> StoreResult<Vec<ActivityLogEntry>>;
    async fn list_activity_for_card(&mut self, card_id: Uuid) -> StoreResult<Vec<ActivityLogEntry>>;

    /// Makes every change of this transaction visible
    async fn commit(self: Box<Self>) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referenced_entity_from_constraint() {
        assert_eq!(referenced_entity("cards_column_id_fkey"), "column");
        assert_eq!(referenced_entity("board_columns_column_type_id_fkey"), "column type");
        assert_eq!(referenced_entity("board_columns_board_id_fkey"), "board");
        assert_eq!(referenced_entity("comments_card_id_fkey"), "card");
        assert_eq!(referenced_entity("cards_assignee_id_fkey"), "user");
    }

    #[test]
    fn test_referenced_key_from_detail() {
        let id = "5b0c7d3e-0000-4000-8000-000000000042";
        let detail = format!(
            "Key (column_id)=({}) is not present in table \"board_columns\".",
            id
        );
        assert_eq!(referenced_key(&detail), Some(id));
        assert_eq!(referenced_key("no key here"), None);
    }
}
