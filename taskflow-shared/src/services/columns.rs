/// Board columns
///
/// Columns place a shared column type on a board at a display position.
/// Positions need not be unique. Deleting a column takes its cards and their
/// comments with it.

use uuid::Uuid;

use super::{ensure_written, Services};
use crate::auth::authorization::{authorize, BoardAction};
use crate::db::store::StoreTx;
use crate::error::{DomainError, DomainResult};
use crate::models::{
    activity::{EventType, NewActivity},
    column::{Column, ColumnType, CreateColumn, UpdateColumn},
};

pub(super) async fn load_column_type(tx: &mut dyn StoreTx, id: Uuid) -> DomainResult<ColumnType> {
    tx.find_column_type(id)
        .await?
        .ok_or_else(|| DomainError::not_found("column type", id))
}

pub(super) async fn load_column(tx: &mut dyn StoreTx, id: Uuid) -> DomainResult<Column> {
    tx.find_column(id)
        .await?
        .ok_or_else(|| DomainError::not_found("column", id))
}

impl Services {
    pub async fn create_column(&self, actor: Uuid, data: CreateColumn) -> DomainResult<Column> {
        let mut tx = self.begin().await?;
        let board = authorize(&mut *tx, actor, data.board_id, BoardAction::CreateColumn).await?;
        let kind = load_column_type(&mut *tx, data.column_type_id).await?;

        let column = Column::new(data);
        tx.insert_column(&column).await?;
        tx.append_activity(NewActivity::board(
            EventType::ColumnCreated,
            actor,
            board.id,
            format!("Column created: {}", kind.name),
        ))
        .await?;
        tx.commit().await?;

        tracing::info!(board_id = %board.id, column_id = %column.id, "Column created");
        Ok(column)
    }

    /// Columns of a board ordered by display position
    pub async fn list_columns(&self, actor: Uuid, board_id: Uuid) -> DomainResult<Vec<Column>> {
        let mut tx = self.begin().await?;
        let board = authorize(&mut *tx, actor, board_id, BoardAction::ViewBoard).await?;
        Ok(tx.list_columns(board.id).await?)
    }

    /// Changes a column's type or position
    pub async fn update_column(
        &self,
        actor: Uuid,
        column_id: Uuid,
        changes: UpdateColumn,
    ) -> DomainResult<Column> {
        let mut tx = self.begin().await?;
        let mut column = load_column(&mut *tx, column_id).await?;
        authorize(&mut *tx, actor, column.board_id, BoardAction::UpdateColumn).await?;

        if let Some(column_type_id) = changes.column_type_id {
            load_column_type(&mut *tx, column_type_id).await?;
            column.column_type_id = column_type_id;
        }
        if let Some(display_order) = changes.display_order {
            column.display_order = display_order;
        }
        let kind = load_column_type(&mut *tx, column.column_type_id).await?;

        ensure_written(tx.update_column(&column).await?, "column", column.id)?;
        tx.append_activity(NewActivity::board(
            EventType::ColumnUpdated,
            actor,
            column.board_id,
            format!("Column updated: {}", kind.name),
        ))
        .await?;
        tx.commit().await?;

        tracing::info!(column_id = %column.id, "Column updated");
        Ok(column)
    }

    /// Deletes a column with its cards (owner only)
    pub async fn delete_column(&self, actor: Uuid, column_id: Uuid) -> DomainResult<()> {
        let mut tx = self.begin().await?;
        let column = load_column(&mut *tx, column_id).await?;
        authorize(&mut *tx, actor, column.board_id, BoardAction::DeleteColumn).await?;
        let kind = load_column_type(&mut *tx, column.column_type_id).await?;

        tx.append_activity(NewActivity::board(
            EventType::ColumnDeleted,
            actor,
            column.board_id,
            format!("Column deleted: {}", kind.name),
        ))
        .await?;
        ensure_written(tx.delete_column(column.id).await?, "column", column.id)?;
        tx.commit().await?;

        tracing::info!(column_id = %column.id, board_id = %column.board_id, "Column deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{done, todo, Fixture};
    use super::*;
    use crate::models::board::CreateBoard;
    use crate::models::card::CreateCard;
    use crate::models::membership::{AddMember, MemberRole};

    async fn board(fx: &Fixture, owner: Uuid) -> Uuid {
        fx.services
            .create_board(
                owner,
                CreateBoard {
                    name: "Launch".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap()
            .board
            .id
    }

    fn new_column(board_id: Uuid, column_type_id: Uuid, display_order: i32) -> CreateColumn {
        CreateColumn {
            board_id,
            column_type_id,
            display_order,
        }
    }

    #[tokio::test]
    async fn test_columns_are_listed_in_display_order() {
        let fx = Fixture::new();
        let ada = fx.user("ada").await;
        let board_id = board(&fx, ada.id).await;

        let later = fx.services.create_column(ada.id, new_column(board_id, done(), 5)).await.unwrap();
        let first = fx.services.create_column(ada.id, new_column(board_id, todo(), 1)).await.unwrap();

        let ids: Vec<Uuid> = fx
            .services
            .list_columns(ada.id, board_id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![first.id, later.id]);
    }

    #[tokio::test]
    async fn test_unknown_column_type_is_not_found() {
        let fx = Fixture::new();
        let ada = fx.user("ada").await;
        let board_id = board(&fx, ada.id).await;

        let err = fx
            .services
            .create_column(ada.id, new_column(board_id, Uuid::new_v4(), 0))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "column type", .. }));
    }

    #[tokio::test]
    async fn test_update_column() {
        let fx = Fixture::new();
        let ada = fx.user("ada").await;
        let board_id = board(&fx, ada.id).await;
        let column = fx.services.create_column(ada.id, new_column(board_id, todo(), 0)).await.unwrap();

        let updated = fx
            .services
            .update_column(
                ada.id,
                column.id,
                UpdateColumn {
                    column_type_id: Some(done()),
                    display_order: Some(3),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.column_type_id, done());
        assert_eq!(updated.display_order, 3);
    }

    #[tokio::test]
    async fn test_delete_column_is_owner_only_and_cascades() {
        let fx = Fixture::new();
        let ada = fx.user("ada").await;
        let bob = fx.user("bob").await;
        let board_id = board(&fx, ada.id).await;
        fx.services
            .add_member(
                ada.id,
                board_id,
                AddMember {
                    user_id: bob.id,
                    role: MemberRole::Editor,
                },
            )
            .await
            .unwrap();

        let column = fx.services.create_column(bob.id, new_column(board_id, todo(), 0)).await.unwrap();
        let card = fx
            .services
            .create_card(
                bob.id,
                CreateCard {
                    column_id: column.id,
                    title: "Write docs".to_string(),
                    description: None,
                    priority: Default::default(),
                    due_date: None,
                    completion_percentage: 0,
                    assignee_id: None,
                },
            )
            .await
            .unwrap();

        let err = fx.services.delete_column(bob.id, column.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        fx.services.delete_column(ada.id, column.id).await.unwrap();
        let err = fx.services.get_card(ada.id, card.id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "card", .. }));
    }
}
