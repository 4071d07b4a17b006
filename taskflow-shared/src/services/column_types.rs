/// Column type catalogue
///
/// Column types are shared by every board and are managed by any
/// authenticated identity. A type cannot be deleted while a column uses it.

use uuid::Uuid;

use super::columns::load_column_type;
use super::{ensure_written, required, Services};
use crate::error::{DomainError, DomainResult};
use crate::models::column::{ColumnType, CreateColumnType};

impl Services {
    /// Adds a column type; names are unique
    pub async fn create_column_type(&self, data: CreateColumnType) -> DomainResult<ColumnType> {
        let column_type = ColumnType::new(CreateColumnType {
            name: required("name", &data.name)?,
            display_order: data.display_order,
        });

        let mut tx = self.begin().await?;
        tx.insert_column_type(&column_type).await?;
        tx.commit().await?;

        tracing::info!(column_type_id = %column_type.id, name = %column_type.name, "Column type created");
        Ok(column_type)
    }

    pub async fn list_column_types(&self) -> DomainResult<Vec<ColumnType>> {
        let mut tx = self.begin().await?;
        Ok(tx.list_column_types().await?)
    }

    pub async fn get_column_type(&self, id: Uuid) -> DomainResult<ColumnType> {
        let mut tx = self.begin().await?;
        load_column_type(&mut *tx, id).await
    }

    /// Replaces a column type's name and position
    pub async fn update_column_type(&self, id: Uuid, data: CreateColumnType) -> DomainResult<ColumnType> {
        let name = required("name", &data.name)?;

        let mut tx = self.begin().await?;
        let mut column_type = load_column_type(&mut *tx, id).await?;
        column_type.name = name;
        column_type.display_order = data.display_order;

        ensure_written(tx.update_column_type(&column_type).await?, "column type", id)?;
        tx.commit().await?;

        tracing::info!(column_type_id = %id, "Column type updated");
        Ok(column_type)
    }

    /// Deletes an unused column type
    pub async fn delete_column_type(&self, id: Uuid) -> DomainResult<()> {
        let mut tx = self.begin().await?;
        load_column_type(&mut *tx, id).await?;

        if tx.column_type_in_use(id).await? {
            return Err(DomainError::conflict("Column type is in use by at least one column"));
        }

        ensure_written(tx.delete_column_type(id).await?, "column type", id)?;
        tx.commit().await?;

        tracing::info!(column_type_id = %id, "Column type deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{todo, Fixture};
    use super::*;
    use crate::models::board::CreateBoard;
    use crate::models::column::CreateColumn;

    fn named(name: &str) -> CreateColumnType {
        CreateColumnType {
            name: name.to_string(),
            display_order: 10,
        }
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let fx = Fixture::new();

        fx.services.create_column_type(named("Review")).await.unwrap();
        let err = fx.services.create_column_type(named("Review")).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let err = fx.services.create_column_type(named("To Do")).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_and_get() {
        let fx = Fixture::new();
        let created = fx.services.create_column_type(named("Review")).await.unwrap();

        fx.services
            .update_column_type(created.id, named("QA"))
            .await
            .unwrap();
        assert_eq!(fx.services.get_column_type(created.id).await.unwrap().name, "QA");
    }

    #[tokio::test]
    async fn test_delete_refused_while_in_use() {
        let fx = Fixture::new();
        let ada = fx.user("ada").await;
        let board = fx
            .services
            .create_board(
                ada.id,
                CreateBoard {
                    name: "Launch".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap();
        fx.services
            .create_column(
                ada.id,
                CreateColumn {
                    board_id: board.board.id,
                    column_type_id: todo(),
                    display_order: 0,
                },
            )
            .await
            .unwrap();

        let err = fx.services.delete_column_type(todo()).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let unused = fx.services.create_column_type(named("Review")).await.unwrap();
        fx.services.delete_column_type(unused.id).await.unwrap();
        let err = fx.services.get_column_type(unused.id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
