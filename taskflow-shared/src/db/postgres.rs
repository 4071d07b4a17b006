/// PostgreSQL implementation of the persistence seam
///
/// Every [`StoreTx`] wraps one sqlx transaction. Uniqueness and cascades are
/// delegated to the schema: the `(board_id, user_id)` primary key serializes
/// concurrent invitations, and `ON DELETE CASCADE` removes a board's whole
/// subtree in one statement.
///
/// # Example
///
/// ```no_run
/// use taskflow_shared::db::pool::{create_pool, DatabaseConfig};
/// use taskflow_shared::db::postgres::PgStore;
/// use taskflow_shared::db::store::{Store, StoreTx};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// })
/// .await?;
///
/// let store = PgStore::new(pool);
/// let mut tx = store.begin().await?;
/// let users = tx.list_users().await?;
/// tx.commit().await?;
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::store::{Store, StoreResult, StoreTx};
use crate::models::{
    activity::{ActivityLogEntry, NewActivity},
    board::Board,
    card::Card,
    column::{Column, ColumnType},
    comment::Comment,
    membership::Membership,
    user::User,
};

/// Store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wraps an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTx { tx }))
    }

    async fn ping(&self) -> StoreResult<()> {
        super::pool::health_check(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

/// Open PostgreSQL transaction
pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgTx {
    async fn insert_user(&mut self, user: &User) -> StoreResult<()> {
        Ok(User::insert(&mut self.tx, user).await?)
    }

    async fn find_user(&mut self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&mut self.tx, id).await?)
    }

    async fn find_user_by_email(&mut self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&mut self.tx, email).await?)
    }

    async fn list_users(&mut self) -> StoreResult<Vec<User>> {
        Ok(User::list(&mut self.tx).await?)
    }

    async fn update_user(&mut self, user: &User) -> StoreResult<bool> {
        Ok(User::update(&mut self.tx, user).await?)
    }

    async fn delete_user(&mut self, id: Uuid) -> StoreResult<bool> {
        Ok(User::delete(&mut self.tx, id).await?)
    }

    async fn count_user_references(&mut self, id: Uuid) -> StoreResult<i64> {
        Ok(User::count_references(&mut self.tx, id).await?)
    }

    async fn insert_board(&mut self, board: &Board) -> StoreResult<()> {
        Ok(Board::insert(&mut self.tx, board).await?)
    }

    async fn find_board(&mut self, id: Uuid) -> StoreResult<Option<Board>> {
        Ok(Board::find_by_id(&mut self.tx, id).await?)
    }

    async fn list_boards_for_user(&mut self, user_id: Uuid) -> StoreResult<Vec<Board>> {
        Ok(Board::list_for_user(&mut self.tx, user_id).await?)
    }

    async fn update_board(&mut self, board: &Board) -> StoreResult<bool> {
        Ok(Board::update(&mut self.tx, board).await?)
    }

    async fn delete_board(&mut self, id: Uuid) -> StoreResult<bool> {
        Ok(Board::delete(&mut self.tx, id).await?)
    }

    async fn insert_membership(&mut self, membership: &Membership) -> StoreResult<()> {
        Ok(Membership::insert(&mut self.tx, membership).await?)
    }

    async fn find_membership(
        &mut self,
        board_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Membership>> {
        Ok(Membership::find(&mut self.tx, board_id, user_id).await?)
    }

    async fn list_memberships(&mut self, board_id: Uuid) -> StoreResult<Vec<Membership>> {
        Ok(Membership::list_by_board(&mut self.tx, board_id).await?)
    }

    async fn delete_membership(&mut self, board_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        Ok(Membership::delete(&mut self.tx, board_id, user_id).await?)
    }

    async fn insert_column_type(&mut self, column_type: &ColumnType) -> StoreResult<()> {
        Ok(ColumnType::insert(&mut self.tx, column_type).await?)
    }

    async fn find_column_type(&mut self, id: Uuid) -> StoreResult<Option<ColumnType>> {
        Ok(ColumnType::find_by_id(&mut self.tx, id).await?)
    }

    async fn list_column_types(&mut self) -> StoreResult<Vec<ColumnType>> {
        Ok(ColumnType::list(&mut self.tx).await?)
    }

    async fn update_column_type(&mut self, column_type: &ColumnType) -> StoreResult<bool> {
        Ok(ColumnType::update(&mut self.tx, column_type).await?)
    }

    async fn delete_column_type(&mut self, id: Uuid) -> StoreResult<bool> {
        Ok(ColumnType::delete(&mut self.tx, id).await?)
    }

    async fn column_type_in_use(&mut self, id: Uuid) -> StoreResult<bool> {
        Ok(ColumnType::in_use(&mut self.tx, id).await?)
    }

    async fn insert_column(&mut self, column: &Column) -> StoreResult<()> {
        Ok(Column::insert(&mut self.tx, column).await?)
    }

    async fn find_column(&mut self, id: Uuid) -> StoreResult<Option<Column>> {
        Ok(Column::find_by_id(&mut self.tx, id).await?)
    }

    async fn list_columns(&mut self, board_id: Uuid) -> StoreResult<Vec<Column>> {
        Ok(Column::list_by_board(&mut self.tx, board_id).await?)
    }

    async fn update_column(&mut self, column: &Column) -> StoreResult<bool> {
        Ok(Column::update(&mut self.tx, column).await?)
    }

    async fn delete_column(&mut self, id: Uuid) -> StoreResult<bool> {
        Ok(Column::delete(&mut self.tx, id).await?)
    }

    async fn insert_card(&mut self, card: &Card) -> StoreResult<()> {
        Ok(Card::insert(&mut self.tx, card).await?)
    }

    async fn find_card(&mut self, id: Uuid) -> StoreResult<Option<Card>> {
        Ok(Card::find_by_id(&mut self.tx, id).await?)
    }

    async fn list_cards_for_board(&mut self, board_id: Uuid) -> StoreResult<Vec<Card>> {
        Ok(Card::list_by_board(&mut self.tx, board_id).await?)
    }

    async fn update_card(&mut self, card: &Card) -> StoreResult<bool> {
        Ok(Card::update(&mut self.tx, card).await?)
    }

    async fn delete_card(&mut self, id: Uuid) -> StoreResult<bool> {
        Ok(Card::delete(&mut self.tx, id).await?)
    }

    async fn insert_comment(&mut self, comment: &Comment) -> StoreResult<()> {
        Ok(Comment::insert(&mut self.tx, comment).await?)
    }

    async fn list_comments(&mut self, card_id: Uuid) -> StoreResult<Vec<Comment>> {
        Ok(Comment::list_by_card(&mut self.tx, card_id).await?)
    }

    async fn append_activity(&mut self, entry: NewActivity) -> StoreResult<ActivityLogEntry> {
        Ok(ActivityLogEntry::append(&mut self.tx, entry).await?)
    }

    async fn list_activity_for_board(
        &mut self,
        board_id: Uuid,
    ) -> StoreResult<Vec<ActivityLogEntry>> {
        Ok(ActivityLogEntry::list_by_board(&mut self.tx, board_id).await?)
    }

    async fn list_activity_for_card(&mut self, card_id: Uuid) -> StoreResult<Vec<ActivityLogEntry>> {
        Ok(ActivityLogEntry::list_by_card(&mut self.tx, card_id).await?)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
