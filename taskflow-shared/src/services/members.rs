/// Board membership management
///
/// Only the owner invites and removes members. Ownership itself never moves
/// through this path: inviting with the OWNER role and removing the owner are
/// both rejected as invalid arguments.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::Services;
use crate::auth::authorization::{authorize, BoardAction};
use crate::error::{DomainError, DomainResult};
use crate::models::{
    activity::{EventType, NewActivity},
    membership::{AddMember, MemberRole, Membership},
    user::User,
};

/// A membership joined with the member's profile
#[derive(Debug, Clone, Serialize)]
pub struct MemberView {
    pub user_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
}

impl MemberView {
    fn new(membership: &Membership, user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: membership.role,
            joined_at: membership.joined_at,
        }
    }
}

impl Services {
    /// Invites a user to a board and notifies them
    ///
    /// # Errors
    ///
    /// - `NotFound` if the board or the user does not exist
    /// - `Forbidden` if `actor` is a member but not the owner
    /// - `InvalidArgument` for the OWNER role
    /// - `Conflict` if the user is already a member
    pub async fn add_member(
        &self,
        actor: Uuid,
        board_id: Uuid,
        data: AddMember,
    ) -> DomainResult<MemberView> {
        if data.role == MemberRole::Owner {
            return Err(DomainError::invalid("Members cannot be invited as OWNER"));
        }

        let mut tx = self.begin().await?;
        let board = authorize(&mut *tx, actor, board_id, BoardAction::AddMember).await?;

        let user = tx
            .find_user(data.user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", data.user_id))?;

        if board.owner_id == user.id || tx.find_membership(board.id, user.id).await?.is_some() {
            return Err(DomainError::conflict(format!(
                "{} is already a member of this board",
                user.email
            )));
        }

        let membership = Membership::new(board.id, user.id, data.role);
        tx.insert_membership(&membership).await?;
        tx.append_activity(NewActivity::board(
            EventType::MemberAdded,
            actor,
            board.id,
            format!("Member added: {}", user.email),
        ))
        .await?;
        tx.commit().await?;

        tracing::info!(
            board_id = %board.id,
            user_id = %user.id,
            role = membership.role.as_str(),
            "Member added"
        );

        self.notify(
            &user.email,
            "You have been invited to a board",
            &format!("You have been invited to the board: {}", board.name),
        )
        .await;

        Ok(MemberView::new(&membership, &user))
    }

    /// Removes a member from a board
    ///
    /// # Errors
    ///
    /// - `NotFound` if the board or the membership does not exist
    /// - `Forbidden` if `actor` is a member but not the owner
    /// - `InvalidArgument` when targeting the owner
    pub async fn remove_member(&self, actor: Uuid, board_id: Uuid, user_id: Uuid) -> DomainResult<()> {
        let mut tx = self.begin().await?;
        let board = authorize(&mut *tx, actor, board_id, BoardAction::RemoveMember).await?;

        if board.owner_id == user_id {
            return Err(DomainError::invalid("The board owner cannot be removed"));
        }
        if !tx.delete_membership(board.id, user_id).await? {
            return Err(DomainError::not_found("membership", user_id));
        }

        let email = tx
            .find_user(user_id)
            .await?
            .map(|u| u.email)
            .unwrap_or_else(|| user_id.to_string());
        tx.append_activity(NewActivity::board(
            EventType::MemberRemoved,
            actor,
            board.id,
            format!("Member removed: {}", email),
        ))
        .await?;
        tx.commit().await?;

        tracing::info!(board_id = %board.id, user_id = %user_id, "Member removed");
        Ok(())
    }

    /// Members of a board with their profiles, in join order
    pub async fn list_members(&self, actor: Uuid, board_id: Uuid) -> DomainResult<Vec<MemberView>> {
        let mut tx = self.begin().await?;
        let board = authorize(&mut *tx, actor, board_id, BoardAction::ListMembers).await?;

        let memberships = tx.list_memberships(board.id).await?;
        let mut members = Vec::with_capacity(memberships.len());
        for membership in &memberships {
            if let Some(user) = tx.find_user(membership.user_id).await? {
                members.push(MemberView::new(membership, &user));
            }
        }
        Ok(members)
    }
}
