/// Board hierarchy and identity operations
///
/// Every operation follows the same shape:
///
/// 1. open one [`StoreTx`]
/// 2. load the entities it touches and run the board authorization check
///    inside that transaction
/// 3. enforce the structural invariants and mutate
/// 4. append the activity entry
/// 5. commit, then send any notification
///
/// A failure anywhere before the commit drops the transaction and leaves no
/// trace, activity entry included.
///
/// Operations are grouped by resource across the submodules, each adding an
/// `impl Services` block.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskflow_shared::db::memory::MemoryStore;
/// use taskflow_shared::models::board::CreateBoard;
/// use taskflow_shared::notify::LogNotifier;
/// use taskflow_shared::services::Services;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let services = Services::new(Arc::new(MemoryStore::seeded()), Arc::new(LogNotifier));
///
/// let ada = services.register("ada@example.com", "s3cret-pass", "Ada", "Lovelace").await?;
/// let board = services
///     .create_board(ada.id, CreateBoard { name: "Launch".to_string(), description: None })
///     .await?;
/// assert!(board.columns.is_empty());
/// # Ok(())
/// # }
/// ```

pub mod activity;
pub mod boards;
pub mod cards;
pub mod column_types;
pub mod columns;
pub mod comments;
pub mod members;
pub mod users;

use std::sync::Arc;

use uuid::Uuid;

use crate::auth::authorization;
use crate::db::store::{Store, StoreTx};
use crate::error::{DomainError, DomainResult};
use crate::models::{card::Card, column::Column};
use crate::notify::Notifier;

pub use boards::BoardDetails;
pub use members::MemberView;

/// Entry point for all domain operations
#[derive(Clone)]
pub struct Services {
    store: Arc<dyn Store>,
    notifier: Arc<dyn Notifier>,
}

impl Services {
    pub fn new(store: Arc<dyn Store>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Underlying store
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    async fn begin(&self) -> DomainResult<Box<dyn StoreTx>> {
        Ok(self.store.begin().await?)
    }

    /// Sends a message; failures are logged and swallowed
    async fn notify(&self, to: &str, subject: &str, body: &str) {
        if let Err(e) = self.notifier.send_message(to, subject, body).await {
            tracing::warn!(to = %to, subject = %subject, error = %e, "Notification failed");
        }
    }
}

/// Loads a card together with the column that places it on a board
async fn card_with_column(tx: &mut dyn StoreTx, card_id: Uuid) -> DomainResult<(Card, Column)> {
    let card = tx
        .find_card(card_id)
        .await?
        .ok_or_else(|| DomainError::not_found("card", card_id))?;
    let column = tx
        .find_column(card.column_id)
        .await?
        .ok_or_else(|| DomainError::not_found("column", card.column_id))?;
    Ok((card, column))
}

/// Checks that `assignee_id` names an existing member of `board_id`
async fn ensure_assignable(tx: &mut dyn StoreTx, board_id: Uuid, assignee_id: Uuid) -> DomainResult<()> {
    if tx.find_user(assignee_id).await?.is_none() {
        return Err(DomainError::invalid(format!("Assignee {} does not exist", assignee_id)));
    }
    if !authorization::is_member(tx, assignee_id, board_id).await? {
        return Err(DomainError::invalid(format!(
            "Assignee {} is not a member of the board",
            assignee_id
        )));
    }
    Ok(())
}

/// Turns a write that matched no row into `NotFound`
///
/// The row can disappear between the lookup and the write when a concurrent
/// transaction deletes it. Returning the error drops the caller's transaction,
/// which rolls back any activity entry already appended.
fn ensure_written(found: bool, entity: &'static str, id: Uuid) -> DomainResult<()> {
    if found {
        Ok(())
    } else {
        Err(DomainError::not_found(entity, id))
    }
}

/// Trims `value` and rejects it if nothing remains
fn required(field: &str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::invalid(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}
