/// In-memory implementation of the persistence seam
///
/// Intended for tests and local development. Not optimized for performance.
///
/// The whole arena sits behind one async mutex. A transaction holds the lock
/// for its entire lifetime and works on a private copy of the arena, which
/// replaces the shared one on commit. Transactions are therefore fully
/// serialized, and dropping one without committing discards its changes.
///
/// The arena enforces the same constraints the PostgreSQL schema does:
/// unique emails, unique column type names, one membership per
/// `(board, user)` pair and cascading deletes.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::store::{Store, StoreError, StoreResult, StoreTx};
use crate::models::{
    activity::{ActivityLogEntry, NewActivity},
    board::Board,
    card::Card,
    column::{default_column_types, Column, ColumnType},
    comment::Comment,
    membership::Membership,
    user::User,
};

#[derive(Debug, Default, Clone)]
struct Arena {
    users: HashMap<Uuid, User>,
    boards: HashMap<Uuid, Board>,
    memberships: HashMap<(Uuid, Uuid), Membership>,
    column_types: HashMap<Uuid, ColumnType>,
    columns: HashMap<Uuid, Column>,
    cards: HashMap<Uuid, Card>,
    comments: HashMap<Uuid, Comment>,
    activity: Vec<ActivityLogEntry>,
    last_sequence: i64,
}

impl Arena {
    fn column_ids_of_board(&self, board_id: Uuid) -> Vec<Uuid> {
        self.columns
            .values()
            .filter(|c| c.board_id == board_id)
            .map(|c| c.id)
            .collect()
    }

    fn remove_card(&mut self, card_id: Uuid) -> bool {
        self.comments.retain(|_, c| c.card_id != card_id);
        self.cards.remove(&card_id).is_some()
    }

    fn remove_column(&mut self, column_id: Uuid) -> bool {
        let card_ids: Vec<Uuid> = self
            .cards
            .values()
            .filter(|c| c.column_id == column_id)
            .map(|c| c.id)
            .collect();
        for card_id in card_ids {
            self.remove_card(card_id);
        }
        self.columns.remove(&column_id).is_some()
    }
}

/// Shared in-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<Arena>>,
}

impl MemoryStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding the default column types, like a freshly migrated database
    pub fn seeded() -> Self {
        let mut arena = Arena::default();
        for column_type in default_column_types() {
            arena.column_types.insert(column_type.id, column_type);
        }
        Self {
            state: Arc::new(Mutex::new(arena)),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx { guard, working }))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

/// Open in-memory transaction
pub struct MemoryTx {
    guard: OwnedMutexGuard<Arena>,
    working: Arena,
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn insert_user(&mut self, user: &User) -> StoreResult<()> {
        let taken = self
            .working
            .users
            .values()
            .any(|u| u.id == user.id || u.email.eq_ignore_ascii_case(&user.email));
        if taken {
            return Err(StoreError::Conflict(format!(
                "Email already registered: {}",
                user.email
            )));
        }
        self.working.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user(&mut self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.working.users.get(&id).cloned())
    }

    async fn find_user_by_email(&mut self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .working
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list_users(&mut self) -> StoreResult<Vec<User>> {
        let mut users: Vec<User> = self.working.users.values().cloned().collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }

    async fn update_user(&mut self, user: &User) -> StoreResult<bool> {
        match self.working.users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_user(&mut self, id: Uuid) -> StoreResult<bool> {
        if self.working.users.remove(&id).is_none() {
            return Ok(false);
        }
        self.working.memberships.retain(|(_, user_id), _| *user_id != id);
        for card in self.working.cards.values_mut() {
            if card.assignee_id == Some(id) {
                card.assignee_id = None;
            }
        }
        Ok(true)
    }

    async fn count_user_references(&mut self, id: Uuid) -> StoreResult<i64> {
        let arena = &self.working;
        let boards = arena.boards.values().filter(|b| b.owner_id == id).count();
        let comments = arena.comments.values().filter(|c| c.user_id == id).count();
        let activity = arena.activity.iter().filter(|a| a.user_id == id).count();
        Ok((boards + comments + activity) as i64)
    }

    async fn insert_board(&mut self, board: &Board) -> StoreResult<()> {
        if self.working.boards.contains_key(&board.id) {
            return Err(StoreError::Conflict(format!("Board already exists: {}", board.id)));
        }
        self.working.boards.insert(board.id, board.clone());
        Ok(())
    }

    async fn find_board(&mut self, id: Uuid) -> StoreResult<Option<Board>> {
        Ok(self.working.boards.get(&id).cloned())
    }

    async fn list_boards_for_user(&mut self, user_id: Uuid) -> StoreResult<Vec<Board>> {
        let arena = &self.working;
        let mut boards: Vec<Board> = arena
            .boards
            .values()
            .filter(|b| b.owner_id == user_id || arena.memberships.contains_key(&(b.id, user_id)))
            .cloned()
            .collect();
        boards.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(boards)
    }

    async fn update_board(&mut self, board: &Board) -> StoreResult<bool> {
        match self.working.boards.get_mut(&board.id) {
            Some(existing) => {
                *existing = board.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_board(&mut self, id: Uuid) -> StoreResult<bool> {
        if self.working.boards.remove(&id).is_none() {
            return Ok(false);
        }
        for column_id in self.working.column_ids_of_board(id) {
            self.working.remove_column(column_id);
        }
        self.working.memberships.retain(|(board_id, _), _| *board_id != id);
        Ok(true)
    }

    async fn insert_membership(&mut self, membership: &Membership) -> StoreResult<()> {
        let key = (membership.board_id, membership.user_id);
        if self.working.memberships.contains_key(&key) {
            return Err(StoreError::Conflict(format!(
                "User {} is already a member of board {}",
                membership.user_id, membership.board_id
            )));
        }
        self.working.memberships.insert(key, membership.clone());
        Ok(())
    }

    async fn find_membership(
        &mut self,
        board_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Membership>> {
        Ok(self.working.memberships.get(&(board_id, user_id)).cloned())
    }

    async fn list_memberships(&mut self, board_id: Uuid) -> StoreResult<Vec<Membership>> {
        let mut members: Vec<Membership> = self
            .working
            .memberships
            .values()
            .filter(|m| m.board_id == board_id)
            .cloned()
            .collect();
        members.sort_by(|a, b| a.joined_at.cmp(&b.joined_at).then(a.user_id.cmp(&b.user_id)));
        Ok(members)
    }

    async fn delete_membership(&mut self, board_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        Ok(self.working.memberships.remove(&(board_id, user_id)).is_some())
    }

    async fn insert_column_type(&mut self, column_type: &ColumnType) -> StoreResult<()> {
        let taken = self
            .working
            .column_types
            .values()
            .any(|t| t.id == column_type.id || t.name == column_type.name);
        if taken {
            return Err(StoreError::Conflict(format!(
                "Column type already exists: {}",
                column_type.name
            )));
        }
        self.working.column_types.insert(column_type.id, column_type.clone());
        Ok(())
    }

    async fn find_column_type(&mut self, id: Uuid) -> StoreResult<Option<ColumnType>> {
        Ok(self.working.column_types.get(&id).cloned())
    }

    async fn list_column_types(&mut self) -> StoreResult<Vec<ColumnType>> {
        let mut types: Vec<ColumnType> = self.working.column_types.values().cloned().collect();
        types.sort_by(|a, b| a.display_order.cmp(&b.display_order).then(a.name.cmp(&b.name)));
        Ok(types)
    }

    async fn update_column_type(&mut self, column_type: &ColumnType) -> StoreResult<bool> {
        let clash = self
            .working
            .column_types
            .values()
            .any(|t| t.id != column_type.id && t.name == column_type.name);
        if clash {
            return Err(StoreError::Conflict(format!(
                "Column type already exists: {}",
                column_type.name
            )));
        }
        match self.working.column_types.get_mut(&column_type.id) {
            Some(existing) => {
                *existing = column_type.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_column_type(&mut self, id: Uuid) -> StoreResult<bool> {
        Ok(self.working.column_types.remove(&id).is_some())
    }

    async fn column_type_in_use(&mut self, id: Uuid) -> StoreResult<bool> {
        Ok(self.working.columns.values().any(|c| c.column_type_id == id))
    }

    async fn insert_column(&mut self, column: &Column) -> StoreResult<()> {
        if !self.working.boards.contains_key(&column.board_id) {
            return Err(StoreError::NotFound {
                entity: "board",
                id: column.board_id.to_string(),
            });
        }
        self.working.columns.insert(column.id, column.clone());
        Ok(())
    }

    async fn find_column(&mut self, id: Uuid) -> StoreResult<Option<Column>> {
        Ok(self.working.columns.get(&id).cloned())
    }

    async fn list_columns(&mut self, board_id: Uuid) -> StoreResult<Vec<Column>> {
        let mut columns: Vec<Column> = self
            .working
            .columns
            .values()
            .filter(|c| c.board_id == board_id)
            .cloned()
            .collect();
        columns.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        Ok(columns)
    }

    async fn update_column(&mut self, column: &Column) -> StoreResult<bool> {
        match self.working.columns.get_mut(&column.id) {
            Some(existing) => {
                *existing = column.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_column(&mut self, id: Uuid) -> StoreResult<bool> {
        Ok(self.working.remove_column(id))
    }

    async fn insert_card(&mut self, card: &Card) -> StoreResult<()> {
        if !self.working.columns.contains_key(&card.column_id) {
            return Err(StoreError::NotFound {
                entity: "column",
                id: card.column_id.to_string(),
            });
        }
        self.working.cards.insert(card.id, card.clone());
        Ok(())
    }

    async fn find_card(&mut self, id: Uuid) -> StoreResult<Option<Card>> {
        Ok(self.working.cards.get(&id).cloned())
    }

    async fn list_cards_for_board(&mut self, board_id: Uuid) -> StoreResult<Vec<Card>> {
        let arena = &self.working;
        let mut cards: Vec<(i32, Card)> = arena
            .cards
            .values()
            .filter_map(|card| {
                arena
                    .columns
                    .get(&card.column_id)
                    .filter(|col| col.board_id == board_id)
                    .map(|col| (col.display_order, card.clone()))
            })
            .collect();
        cards.sort_by(|(oa, a), (ob, b)| {
            oa.cmp(ob)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        Ok(cards.into_iter().map(|(_, card)| card).collect())
    }

    async fn update_card(&mut self, card: &Card) -> StoreResult<bool> {
        if !self.working.columns.contains_key(&card.column_id) {
            return Err(StoreError::NotFound {
                entity: "column",
                id: card.column_id.to_string(),
            });
        }
        match self.working.cards.get_mut(&card.id) {
            Some(existing) => {
                *existing = card.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_card(&mut self, id: Uuid) -> StoreResult<bool> {
        Ok(self.working.remove_card(id))
    }

    async fn insert_comment(&mut self, comment: &Comment) -> StoreResult<()> {
        if !self.working.cards.contains_key(&comment.card_id) {
            return Err(StoreError::NotFound {
                entity: "card",
                id: comment.card_id.to_string(),
            });
        }
        self.working.comments.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn list_comments(&mut self, card_id: Uuid) -> StoreResult<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .working
            .comments
            .values()
            .filter(|c| c.card_id == card_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(comments)
    }

    async fn append_activity(&mut self, entry: NewActivity) -> StoreResult<ActivityLogEntry> {
        self.working.last_sequence += 1;
        let stored = ActivityLogEntry {
            id: Uuid::new_v4(),
            sequence: self.working.last_sequence,
            event_type: entry.event_type,
            details: entry.details,
            user_id: entry.user_id,
            board_id: entry.board_id,
            card_id: entry.card_id,
            created_at: Utc::now(),
        };
        self.working.activity.push(stored.clone());
        Ok(stored)
    }

    async fn list_activity_for_board(
        &mut self,
        board_id: Uuid,
    ) -> StoreResult<Vec<ActivityLogEntry>> {
        // The vector is append-only, so it is already in sequence order.
        Ok(self
            .working
            .activity
            .iter()
            .filter(|a| a.board_id == Some(board_id))
            .cloned()
            .collect())
    }

    async fn list_activity_for_card(&mut self, card_id: Uuid) -> StoreResult<Vec<ActivityLogEntry>> {
        Ok(self
            .working
            .activity
            .iter()
            .filter(|a| a.card_id == Some(card_id))
            .cloned()
            .collect())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}
