/// Activity log queries
///
/// Entries are returned in insertion order (`sequence`). Reading a board's log
/// requires membership; reading a card's log requires membership on the
/// card's board.

use uuid::Uuid;

use super::{card_with_column, Services};
use crate::auth::authorization::{authorize, BoardAction};
use crate::error::DomainResult;
use crate::models::activity::ActivityLogEntry;

impl Services {
    pub async fn board_activity(&self, actor: Uuid, board_id: Uuid) -> DomainResult<Vec<ActivityLogEntry>> {
        let mut tx = self.begin().await?;
        let board = authorize(&mut *tx, actor, board_id, BoardAction::ViewActivity).await?;
        Ok(tx.list_activity_for_board(board.id).await?)
    }

    pub async fn card_activity(&self, actor: Uuid, card_id: Uuid) -> DomainResult<Vec<ActivityLogEntry>> {
        let mut tx = self.begin().await?;
        let (card, column) = card_with_column(&mut *tx, card_id).await?;
        authorize(&mut *tx, actor, column.board_id, BoardAction::ViewActivity).await?;
        Ok(tx.list_activity_for_card(card.id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::Fixture;
    use crate::error::DomainError;
    use crate::models::activity::EventType;
    use crate::models::board::CreateBoard;
    use crate::models::membership::{AddMember, MemberRole};

    #[tokio::test]
    async fn test_board_activity_in_insertion_order() {
        let fx = Fixture::new();
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
        fx.services.remove_member(ada.id, board_id, bob.id).await.unwrap();

        let log = fx.services.board_activity(ada.id, board_id).await.unwrap();
        let events: Vec<EventType> = log.iter().map(|e| e.event_type).collect();
        assert_eq!(
            events,
            vec![EventType::BoardCreated, EventType::MemberAdded, EventType::MemberRemoved]
        );
        assert!(log.windows(2).all(|w| w[0].sequence < w[1].sequence));
        assert_eq!(log[1].details, "Member added: bob@example.com");
        assert_eq!(log[2].details, "Member removed: bob@example.com");

        let err = fx.services.board_activity(bob.id, board_id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
