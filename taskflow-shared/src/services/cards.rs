/// Cards
///
/// A card belongs to exactly one column and, through it, to one board. It can
/// only ever move between columns of that board. Assignees must be members of
/// the board, and completion stays within 0..=100.

use uuid::Uuid;

use super::columns::{load_column, load_column_type};
use super::{card_with_column, ensure_assignable, ensure_written, required, Services};
use crate::auth::authorization::{authorize, BoardAction};
use crate::error::{DomainError, DomainResult};
use crate::models::{
    activity::{EventType, NewActivity},
    card::{valid_completion, Card, CreateCard, UpdateCard, COMPLETE},
};

fn check_completion(value: i32) -> DomainResult<()> {
    if valid_completion(value) {
        Ok(())
    } else {
        Err(DomainError::invalid(format!(
            "completion_percentage must be between 0 and {}, got {}",
            COMPLETE, value
        )))
    }
}

impl Services {
    pub async fn create_card(&self, actor: Uuid, data: CreateCard) -> DomainResult<Card> {
        let title = required("title", &data.title)?;
        check_completion(data.completion_percentage)?;

        let mut tx = self.begin().await?;
        let column = load_column(&mut *tx, data.column_id).await?;
        let board = authorize(&mut *tx, actor, column.board_id, BoardAction::CreateCard).await?;
        if let Some(assignee_id) = data.assignee_id {
            ensure_assignable(&mut *tx, board.id, assignee_id).await?;
        }

        let card = Card::new(CreateCard { title, ..data });
        tx.insert_card(&card).await?;
        tx.append_activity(NewActivity::card(
            EventType::CardCreated,
            actor,
            board.id,
            card.id,
            format!("Card created: {}", card.title),
        ))
        .await?;
        tx.commit().await?;

        tracing::info!(card_id = %card.id, column_id = %card.column_id, "Card created");
        Ok(card)
    }

    pub async fn get_card(&self, actor: Uuid, card_id: Uuid) -> DomainResult<Card> {
        let mut tx = self.begin().await?;
        let (card, column) = card_with_column(&mut *tx, card_id).await?;
        authorize(&mut *tx, actor, column.board_id, BoardAction::ViewCards).await?;
        Ok(card)
    }

    /// Every card of every column of a board
    pub async fn list_cards(&self, actor: Uuid, board_id: Uuid) -> DomainResult<Vec<Card>> {
        let mut tx = self.begin().await?;
        let board = authorize(&mut *tx, actor, board_id, BoardAction::ViewCards).await?;
        Ok(tx.list_cards_for_board(board.id).await?)
    }

    /// Applies the `Some` fields of `changes`
    ///
    /// # Errors
    ///
    /// - `NotFound` if the card or target column does not exist
    /// - `InvalidArgument` if the target column is on another board, the
    ///   completion is out of range or the assignee is not a member
    pub async fn update_card(&self, actor: Uuid, card_id: Uuid, changes: UpdateCard) -> DomainResult<Card> {
        let mut tx = self.begin().await?;
        let (mut card, column) = card_with_column(&mut *tx, card_id).await?;
        let board = authorize(&mut *tx, actor, column.board_id, BoardAction::UpdateCard).await?;

        if let Some(target_id) = changes.column_id {
            let target = load_column(&mut *tx, target_id).await?;
            if target.board_id != board.id {
                return Err(DomainError::invalid("Cards cannot move to a column of another board"));
            }
            card.column_id = target.id;
        }
        if let Some(title) = changes.title.as_deref() {
            card.title = required("title", title)?;
        }
        if let Some(description) = changes.description {
            card.description = Some(description);
        }
        if let Some(priority) = changes.priority {
            card.priority = priority;
        }
        if let Some(due_date) = changes.due_date {
            card.due_date = Some(due_date);
        }
        if let Some(completion) = changes.completion_percentage {
            check_completion(completion)?;
            card.completion_percentage = completion;
        }
        if let Some(assignee_id) = changes.assignee_id {
            ensure_assignable(&mut *tx, board.id, assignee_id).await?;
            card.assignee_id = Some(assignee_id);
        }
        card.touch();

        ensure_written(tx.update_card(&card).await?, "card", card.id)?;
        tx.append_activity(NewActivity::card(
            EventType::CardUpdated,
            actor,
            board.id,
            card.id,
            format!("Card updated: {}", card.title),
        ))
        .await?;
        tx.commit().await?;

        tracing::info!(card_id = %card.id, "Card updated");
        Ok(card)
    }

    /// Re-parents a card to another column of the same board
    ///
    /// # Errors
    ///
    /// - `NotFound` if the card or target column does not exist
    /// - `InvalidArgument` if the target column is on another board
    pub async fn move_card(&self, actor: Uuid, card_id: Uuid, column_id: Uuid) -> DomainResult<Card> {
        let mut tx = self.begin().await?;
        let (mut card, column) = card_with_column(&mut *tx, card_id).await?;
        let board = authorize(&mut *tx, actor, column.board_id, BoardAction::MoveCard).await?;

        let target = load_column(&mut *tx, column_id).await?;
        if target.board_id != board.id {
            return Err(DomainError::invalid("Cards cannot move to a column of another board"));
        }
        let kind = load_column_type(&mut *tx, target.column_type_id).await?;

        card.column_id = target.id;
        card.touch();
        ensure_written(tx.update_card(&card).await?, "card", card.id)?;
        tx.append_activity(NewActivity::card(
            EventType::CardMoved,
            actor,
            board.id,
            card.id,
            format!("Card '{}' moved to {}", card.title, kind.name),
        ))
        .await?;
        tx.commit().await?;

        tracing::info!(card_id = %card.id, from = %column.id, to = %target.id, "Card moved");
        Ok(card)
    }

    /// Marks a card 100% complete
    pub async fn complete_card(&self, actor: Uuid, card_id: Uuid) -> DomainResult<Card> {
        let mut tx = self.begin().await?;
        let (mut card, column) = card_with_column(&mut *tx, card_id).await?;
        let board = authorize(&mut *tx, actor, column.board_id, BoardAction::CompleteCard).await?;

        card.completion_percentage = COMPLETE;
        card.touch();
        ensure_written(tx.update_card(&card).await?, "card", card.id)?;
        tx.append_activity(NewActivity::card(
            EventType::CardCompleted,
            actor,
            board.id,
            card.id,
            format!("Card completed: {}", card.title),
        ))
        .await?;
        tx.commit().await?;

        tracing::info!(card_id = %card.id, "Card completed");
        Ok(card)
    }

    /// Assigns the card to the caller (board owner only)
    pub async fn assign_self(&self, actor: Uuid, card_id: Uuid) -> DomainResult<Card> {
        let mut tx = self.begin().await?;
        let (mut card, column) = card_with_column(&mut *tx, card_id).await?;
        let board = authorize(&mut *tx, actor, column.board_id, BoardAction::AssignSelf).await?;

        let email = tx
            .find_user(actor)
            .await?
            .map(|u| u.email)
            .ok_or_else(|| DomainError::not_found("user", actor))?;

        card.assignee_id = Some(actor);
        card.touch();
        ensure_written(tx.update_card(&card).await?, "card", card.id)?;
        tx.append_activity(NewActivity::card(
            EventType::MemberAssigned,
            actor,
            board.id,
            card.id,
            format!("Card '{}' assigned to {}", card.title, email),
        ))
        .await?;
        tx.commit().await?;

        tracing::info!(card_id = %card.id, assignee_id = %actor, "Card assigned");
        Ok(card)
    }

    /// Deletes a card and its comments (owner only)
    pub async fn delete_card(&self, actor: Uuid, card_id: Uuid) -> DomainResult<()> {
        let mut tx = self.begin().await?;
        let (card, column) = card_with_column(&mut *tx, card_id).await?;
        let board = authorize(&mut *tx, actor, column.board_id, BoardAction::DeleteCard).await?;

        tx.append_activity(NewActivity::card(
            EventType::CardDeleted,
            actor,
            board.id,
            card.id,
            format!("Card deleted: {}", card.title),
        ))
        .await?;
        ensure_written(tx.delete_card(card.id).await?, "card", card.id)?;
        tx.commit().await?;

        tracing::info!(card_id = %card.id, "Card deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{done, todo, Fixture};
    use super::*;
    use crate::models::board::CreateBoard;
    use crate::models::card::Priority;
    use crate::models::column::{Column, CreateColumn};
    use crate::models::membership::{AddMember, MemberRole};
    use crate::models::user::User;

    struct Setup {
        ada: User,
        bob: User,
        board_id: Uuid,
        todo: Column,
        done: Column,
    }

    async fn setup(fx: &Fixture) -> Setup {
        let ada = fx.user("ada").await;
        let bob = fx.user("bob").await;
        let board_id = fx
            .services
            .create_board(
                ada.id,
                CreateBoard {
                    name: "Launch".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap()
            .board
            .id;
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

        let mut columns = Vec::new();
        for (column_type_id, display_order) in [(todo(), 0), (done(), 1)] {
            let column = fx
                .services
                .create_column(
                    ada.id,
                    CreateColumn {
                        board_id,
                        column_type_id,
                        display_order,
                    },
                )
                .await
                .unwrap();
            columns.push(column);
        }
        let done = columns.pop().unwrap();
        let todo = columns.pop().unwrap();

        Setup {
            ada,
            bob,
            board_id,
            todo,
            done,
        }
    }

    fn card(column_id: Uuid, title: &str) -> CreateCard {
        CreateCard {
            column_id,
            title: title.to_string(),
            description: None,
            priority: Priority::High,
            due_date: None,
            completion_percentage: 0,
            assignee_id: None,
        }
    }

    #[tokio::test]
    async fn test_member_creates_card_but_cannot_delete_board() {
        let fx = Fixture::new();
        let s = setup(&fx).await;

        let created = fx.services.create_card(s.bob.id, card(s.todo.id, "Draft")).await.unwrap();
        assert_eq!(created.priority, Priority::High);

        let err = fx.services.delete_board(s.bob.id, s.board_id).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_assignee_must_be_member() {
        let fx = Fixture::new();
        let s = setup(&fx).await;
        let outsider = fx.user("cy").await;

        let mut data = card(s.todo.id, "Draft");
        data.assignee_id = Some(outsider.id);
        let err = fx.services.create_card(s.ada.id, data).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));

        let mut data = card(s.todo.id, "Draft");
        data.assignee_id = Some(s.bob.id);
        let created = fx.services.create_card(s.ada.id, data).await.unwrap();
        assert_eq!(created.assignee_id, Some(s.bob.id));
    }

    #[tokio::test]
    async fn test_completion_out_of_range() {
        let fx = Fixture::new();
        let s = setup(&fx).await;
        let created = fx.services.create_card(s.ada.id, card(s.todo.id, "Draft")).await.unwrap();

        let err = fx
            .services
            .update_card(
                s.ada.id,
                created.id,
                UpdateCard {
                    completion_percentage: Some(101),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));

        let completed = fx.services.complete_card(s.bob.id, created.id).await.unwrap();
        assert_eq!(completed.completion_percentage, COMPLETE);
    }

    #[tokio::test]
    async fn test_move_card_logs_column_type_name() {
        let fx = Fixture::new();
        let s = setup(&fx).await;
        let created = fx.services.create_card(s.bob.id, card(s.todo.id, "Draft")).await.unwrap();

        let moved = fx.services.move_card(s.bob.id, created.id, s.done.id).await.unwrap();
        assert_eq!(moved.column_id, s.done.id);
        assert!(moved.updated_at >= created.updated_at);

        let log = fx.services.card_activity(s.ada.id, created.id).await.unwrap();
        let last = log.last().unwrap();
        assert_eq!(last.event_type, EventType::CardMoved);
        assert_eq!(last.details, "Card 'Draft' moved to Done");
    }

    #[tokio::test]
    async fn test_move_to_other_board_is_invalid() {
        let fx = Fixture::new();
        let s = setup(&fx).await;
        let created = fx.services.create_card(s.ada.id, card(s.todo.id, "Draft")).await.unwrap();

        let other_board = fx
            .services
            .create_board(
                s.ada.id,
                CreateBoard {
                    name: "Other".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap();
        let foreign = fx
            .services
            .create_column(
                s.ada.id,
                CreateColumn {
                    board_id: other_board.board.id,
                    column_type_id: todo(),
                    display_order: 0,
                },
            )
            .await
            .unwrap();

        let err = fx.services.move_card(s.ada.id, created.id, foreign.id).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));

        let err = fx
            .services
            .update_card(
                s.ada.id,
                created.id,
                UpdateCard {
                    column_id: Some(foreign.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));

        let unchanged = fx.services.get_card(s.ada.id, created.id).await.unwrap();
        assert_eq!(unchanged.column_id, s.todo.id);
    }

    #[tokio::test]
    async fn test_move_to_missing_column_is_not_found() {
        let fx = Fixture::new();
        let s = setup(&fx).await;
        let created = fx.services.create_card(s.ada.id, card(s.todo.id, "Draft")).await.unwrap();

        let err = fx
            .services
            .move_card(s.ada.id, created.id, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "column", .. }));
    }

    #[tokio::test]
    async fn test_assign_self_is_owner_only() {
        let fx = Fixture::new();
        let s = setup(&fx).await;
        let created = fx.services.create_card(s.bob.id, card(s.todo.id, "Draft")).await.unwrap();

        let assigned = fx.services.assign_self(s.ada.id, created.id).await.unwrap();
        assert_eq!(assigned.assignee_id, Some(s.ada.id));

        let err = fx.services.assign_self(s.bob.id, created.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_delete_card_is_owner_only() {
        let fx = Fixture::new();
        let s = setup(&fx).await;
        let created = fx.services.create_card(s.bob.id, card(s.todo.id, "Draft")).await.unwrap();

        let err = fx.services.delete_card(s.bob.id, created.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        fx.services.delete_card(s.ada.id, created.id).await.unwrap();
        assert!(fx.services.list_cards(s.ada.id, s.board_id).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_update_racing_board_delete_completes_or_not_found() {
        let fx = Fixture::new();
        let s = setup(&fx).await;
        let card_id = fx.services.create_card(s.ada.id, card(s.todo.id, "Race")).await.unwrap().id;

        let mut updates = Vec::new();
        for i in 0..6 {
            let services = fx.services.clone();
            let actor = s.bob.id;
            updates.push(tokio::spawn(async move {
                let changes = UpdateCard {
                    title: Some(format!("Race {}", i)),
                    ..Default::default()
                };
                services.update_card(actor, card_id, changes).await
            }));
        }
        let deleter = {
            let services = fx.services.clone();
            let owner = s.ada.id;
            let board_id = s.board_id;
            tokio::spawn(async move { services.delete_board(owner, board_id).await })
        };

        deleter.await.unwrap().unwrap();
        for update in updates {
            match update.await.unwrap() {
                Ok(updated) => assert_eq!(updated.id, card_id),
                Err(DomainError::NotFound { .. }) => {}
                Err(other) => panic!("unexpected error: {:?}", other),
            }
        }
        assert!(matches!(
            fx.services.get_card(s.ada.id, card_id).await,
            Err(DomainError::NotFound { .. })
        ));
    }
}
