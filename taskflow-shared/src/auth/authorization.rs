/// Board-scoped authorization
///
/// Access to everything below a board is decided by two read-only
/// predicates and a policy table:
///
/// - [`is_owner`]: the caller is the board's owner
/// - [`is_member`]: the caller is the owner or holds a membership row
/// - [`BoardAction::requirement`]: which of the two an operation needs
///
/// [`authorize`] evaluates the table inside the caller's transaction so the
/// check and the mutation it guards see the same state. [`decide`] is the
/// pure core of that evaluation and is tested without any store.
///
/// # Deny mapping
///
/// | Caller | Requirement | Result |
/// |---|---|---|
/// | not a member (or board missing) | any | `NotFound("board")` |
/// | member | `Member` | allowed |
/// | member, not owner | `Owner` | `Forbidden` |
/// | owner | any | allowed |
///
/// Non-members get the same answer as for a board that does not exist, so
/// board existence is never revealed to outsiders.
///
/// # Example
///
/// ```
/// use taskflow_shared::auth::authorization::{decide, AccessLevel, BoardAction, Decision};
///
/// assert_eq!(decide(BoardAction::CreateCard, AccessLevel::Member), Decision::Allow);
/// assert_eq!(decide(BoardAction::DeleteBoard, AccessLevel::Member), Decision::Forbid);
/// assert_eq!(decide(BoardAction::ViewBoard, AccessLevel::None), Decision::Hide);
/// ```

use uuid::Uuid;

use crate::db::store::StoreTx;
use crate::error::{DomainError, DomainResult};
use crate::models::board::Board;

/// What an operation requires of the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Owner or explicit member
    Member,

    /// Board owner only
    Owner,
}

/// Board-scoped operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardAction {
    ViewBoard,
    ListMembers,
    ViewCards,
    ViewActivity,
    UpdateBoard,
    DeleteBoard,
    AddMember,
    RemoveMember,
    CreateColumn,
    UpdateColumn,
    DeleteColumn,
    CreateCard,
    UpdateCard,
    MoveCard,
    CompleteCard,
    DeleteCard,
    /// Assigning oneself to a card is reserved to the board owner
    AssignSelf,
    Comment,
}

impl BoardAction {
    /// Policy table
    pub fn requirement(self) -> Requirement {
        match self {
            BoardAction::ViewBoard
            | BoardAction::ListMembers
            | BoardAction::ViewCards
            | BoardAction::ViewActivity
            | BoardAction::CreateColumn
            | BoardAction::UpdateColumn
            | BoardAction::CreateCard
            | BoardAction::UpdateCard
            | BoardAction::MoveCard
            | BoardAction::CompleteCard
            | BoardAction::Comment => Requirement::Member,

            BoardAction::UpdateBoard
            | BoardAction::DeleteBoard
            | BoardAction::AddMember
            | BoardAction::RemoveMember
            | BoardAction::DeleteColumn
            | BoardAction::DeleteCard
            | BoardAction::AssignSelf => Requirement::Owner,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            BoardAction::UpdateBoard => "update this board",
            BoardAction::DeleteBoard => "delete this board",
            BoardAction::AddMember => "add members to this board",
            BoardAction::RemoveMember => "remove members from this board",
            BoardAction::DeleteColumn => "delete columns of this board",
            BoardAction::DeleteCard => "delete cards of this board",
            BoardAction::AssignSelf => "assign cards on this board",
            _ => "perform this action",
        }
    }
}

/// Caller's standing on a board
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AccessLevel {
    None,
    Member,
    Owner,
}

/// Outcome of a policy evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// Member lacking owner rights (403)
    Forbid,
    /// Outsider; reported as a missing board (404)
    Hide,
}

/// Evaluates the policy table for a caller's access level
pub fn decide(action: BoardAction, level: AccessLevel) -> Decision {
    match (level, action.requirement()) {
        (AccessLevel::None, _) => Decision::Hide,
        (AccessLevel::Owner, _) => Decision::Allow,
        (AccessLevel::Member, Requirement::Member) => Decision::Allow,
        (AccessLevel::Member, Requirement::Owner) => Decision::Forbid,
    }
}

async fn load_board(tx: &mut dyn StoreTx, board_id: Uuid) -> DomainResult<Board> {
    tx.find_board(board_id)
        .await?
        .ok_or_else(|| DomainError::not_found("board", board_id))
}

async fn access_level(tx: &mut dyn StoreTx, user_id: Uuid, board: &Board) -> DomainResult<AccessLevel> {
    if board.owner_id == user_id {
        return Ok(AccessLevel::Owner);
    }
    let membership = tx.find_membership(board.id, user_id).await?;
    Ok(if membership.is_some() {
        AccessLevel::Member
    } else {
        AccessLevel::None
    })
}

/// True iff `user_id` owns the board
///
/// # Errors
///
/// `NotFound` if the board does not exist.
pub async fn is_owner(tx: &mut dyn StoreTx, user_id: Uuid, board_id: Uuid) -> DomainResult<bool> {
    let board = load_board(tx, board_id).await?;
    Ok(board.owner_id == user_id)
}

/// True iff `user_id` owns the board or holds a membership on it
///
/// Ownership implies membership whether or not an owner row exists.
///
/// # Errors
///
/// `NotFound` if the board does not exist.
pub async fn is_member(tx: &mut dyn StoreTx, user_id: Uuid, board_id: Uuid) -> DomainResult<bool> {
    let board = load_board(tx, board_id).await?;
    Ok(access_level(tx, user_id, &board).await? != AccessLevel::None)
}

/// Checks `action` on `board_id` for `user_id` and returns the board
///
/// # Errors
///
/// - `NotFound` if the board is missing or the caller is not a member
/// - `Forbidden` if the caller is a member but the action is owner-only
pub async fn authorize(
    tx: &mut dyn StoreTx,
    user_id: Uuid,
    board_id: Uuid,
    action: BoardAction,
) -> DomainResult<Board> {
    let board = load_board(tx, board_id).await?;
    let level = access_level(tx, user_id, &board).await?;

    match decide(action, level) {
        Decision::Allow => Ok(board),
        Decision::Hide => {
            tracing::debug!(%user_id, %board_id, ?action, "Denied: not a board member");
            Err(DomainError::not_found("board", board_id))
        }
        Decision::Forbid => {
            tracing::debug!(%user_id, %board_id, ?action, "Denied: owner-only action");
            Err(DomainError::forbidden(format!(
                "Only the board owner may {}",
                action.describe()
            )))
        }
    }
}
