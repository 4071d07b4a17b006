/// Board lifecycle
///
/// Creating a board materializes the creator's OWNER membership in the same
/// transaction. Deleting one appends `BOARD_DELETED` before the cascade so
/// the entry survives the board it describes.

use serde::Serialize;
use uuid::Uuid;

use super::{ensure_written, required, Services};
use crate::auth::authorization::{authorize, BoardAction};
use crate::error::DomainResult;
use crate::models::{
    activity::{EventType, NewActivity},
    board::{Board, CreateBoard, UpdateBoard},
    column::Column,
    membership::{MemberRole, Membership},
};

/// A board with its columns in display order
#[derive(Debug, Clone, Serialize)]
pub struct BoardDetails {
    #[serde(flatten)]
    pub board: Board,
    pub columns: Vec<Column>,
}

impl Services {
    /// Creates a board owned by `actor`
    pub async fn create_board(&self, actor: Uuid, data: CreateBoard) -> DomainResult<BoardDetails> {
        let name = required("name", &data.name)?;
        let board = Board::new(
            actor,
            CreateBoard {
                name,
                description: data.description,
            },
        );

        let mut tx = self.begin().await?;
        tx.insert_board(&board).await?;
        tx.insert_membership(&Membership::new(board.id, actor, MemberRole::Owner))
            .await?;
        tx.append_activity(NewActivity::board(
            EventType::BoardCreated,
            actor,
            board.id,
            format!("Board created: {}", board.name),
        ))
        .await?;
        tx.commit().await?;

        tracing::info!(board_id = %board.id, owner_id = %actor, "Board created");
        Ok(BoardDetails {
            board,
            columns: Vec::new(),
        })
    }

    /// Boards `actor` owns or is a member of, newest first
    pub async fn list_boards(&self, actor: Uuid) -> DomainResult<Vec<Board>> {
        let mut tx = self.begin().await?;
        Ok(tx.list_boards_for_user(actor).await?)
    }

    pub async fn get_board(&self, actor: Uuid, board_id: Uuid) -> DomainResult<BoardDetails> {
        let mut tx = self.begin().await?;
        let board = authorize(&mut *tx, actor, board_id, BoardAction::ViewBoard).await?;
        let columns = tx.list_columns(board.id).await?;
        Ok(BoardDetails { board, columns })
    }

    /// Renames or re-describes a board (owner only)
    pub async fn update_board(
        &self,
        actor: Uuid,
        board_id: Uuid,
        mut changes: UpdateBoard,
    ) -> DomainResult<Board> {
        if let Some(name) = changes.name.as_deref() {
            changes.name = Some(required("name", name)?);
        }

        let mut tx = self.begin().await?;
        let mut board = authorize(&mut *tx, actor, board_id, BoardAction::UpdateBoard).await?;

        board.apply(changes);
        ensure_written(tx.update_board(&board).await?, "board", board.id)?;
        tx.append_activity(NewActivity::board(
            EventType::BoardUpdated,
            actor,
            board.id,
            format!("Board updated: {}", board.name),
        ))
        .await?;
        tx.commit().await?;

        tracing::info!(board_id = %board.id, "Board updated");
        Ok(board)
    }

    /// Deletes a board and everything below it (owner only)
    pub async fn delete_board(&self, actor: Uuid, board_id: Uuid) -> DomainResult<()> {
        let mut tx = self.begin().await?;
        let board = authorize(&mut *tx, actor, board_id, BoardAction::DeleteBoard).await?;

        tx.append_activity(NewActivity::board(
            EventType::BoardDeleted,
            actor,
            board.id,
            format!("Board deleted: {}", board.name),
        ))
        .await?;
        ensure_written(tx.delete_board(board.id).await?, "board", board.id)?;
        tx.commit().await?;

        tracing::info!(board_id = %board.id, "Board deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{todo, Fixture};
    use super::*;
    use crate::db::store::Store;
    use crate::error::DomainError;
    use crate::models::column::CreateColumn;

    fn board(name: &str) -> CreateBoard {
        CreateBoard {
            name: name.to_string(),
            description: Some("Q3 work".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_board_materializes_owner_membership() {
        let fx = Fixture::new();
        let ada = fx.user("ada").await;

        let details = fx.services.create_board(ada.id, board("Launch")).await.unwrap();
        assert_eq!(details.board.owner_id, ada.id);

        let members = fx.services.list_members(ada.id, details.board.id).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].user_id, ada.id);
        assert_eq!(members[0].role, MemberRole::Owner);

        let log = fx.services.board_activity(ada.id, details.board.id).await.unwrap();
        assert_eq!(log[0].event_type, EventType::BoardCreated);
        assert_eq!(log[0].details, "Board created: Launch");
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected() {
        let fx = Fixture::new();
        let ada = fx.user("ada").await;

        let err = fx.services.create_board(ada.id, board("  ")).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_outsider_cannot_see_board() {
        let fx = Fixture::new();
        let ada = fx.user("ada").await;
        let bob = fx.user("bob").await;
        let details = fx.services.create_board(ada.id, board("Launch")).await.unwrap();

        let err = fx.services.get_board(bob.id, details.board.id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "board", .. }));
        assert!(fx.services.list_boards(bob.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_board_lists_columns() {
        let fx = Fixture::new();
        let ada = fx.user("ada").await;
        let details = fx.services.create_board(ada.id, board("Launch")).await.unwrap();

        fx.services
            .create_column(
                ada.id,
                CreateColumn {
                    board_id: details.board.id,
                    column_type_id: todo(),
                    display_order: 0,
                },
            )
            .await
            .unwrap();

        let details = fx.services.get_board(ada.id, details.board.id).await.unwrap();
        assert_eq!(details.columns.len(), 1);
    }

    #[tokio::test]
    async fn test_update_board() {
        let fx = Fixture::new();
        let ada = fx.user("ada").await;
        let details = fx.services.create_board(ada.id, board("Launch")).await.unwrap();

        let updated = fx
            .services
            .update_board(
                ada.id,
                details.board.id,
                UpdateBoard {
                    name: Some("Relaunch".to_string()),
                    description: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Relaunch");
        assert_eq!(updated.description.as_deref(), Some("Q3 work"));
    }

    #[tokio::test]
    async fn test_delete_board_keeps_its_activity() {
        let fx = Fixture::new();
        let ada = fx.user("ada").await;
        let details = fx.services.create_board(ada.id, board("Launch")).await.unwrap();

        fx.services.delete_board(ada.id, details.board.id).await.unwrap();

        let err = fx.services.get_board(ada.id, details.board.id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        let mut tx = fx.services.store().begin().await.unwrap();
        let log = tx.list_activity_for_board(details.board.id).await.unwrap();
        let events: Vec<EventType> = log.iter().map(|e| e.event_type).collect();
        assert_eq!(events, vec![EventType::BoardCreated, EventType::BoardDeleted]);
    }
}
