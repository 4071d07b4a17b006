/// Card comments
///
/// Comments are immutable once written. The card's assignee hears about new
/// comments unless they wrote the comment themselves.

use uuid::Uuid;

use super::{card_with_column, required, Services};
use crate::auth::authorization::{authorize, BoardAction};
use crate::error::DomainResult;
use crate::models::{
    activity::{EventType, NewActivity},
    comment::Comment,
};

impl Services {
    /// Adds a comment authored by `actor`
    pub async fn add_comment(&self, actor: Uuid, card_id: Uuid, text: &str) -> DomainResult<Comment> {
        let text = required("text", text)?;

        let mut tx = self.begin().await?;
        let (card, column) = card_with_column(&mut *tx, card_id).await?;
        let board = authorize(&mut *tx, actor, column.board_id, BoardAction::Comment).await?;

        let recipient = match card.assignee_id {
            Some(assignee_id) if assignee_id != actor => {
                tx.find_user(assignee_id).await?.map(|u| u.email)
            }
            _ => None,
        };

        let comment = Comment::new(card.id, actor, text);
        tx.insert_comment(&comment).await?;
        tx.append_activity(NewActivity::card(
            EventType::CommentCreated,
            actor,
            board.id,
            card.id,
            format!("Comment added to card: {}", card.title),
        ))
        .await?;
        tx.commit().await?;

        tracing::info!(comment_id = %comment.id, card_id = %card.id, "Comment created");

        if let Some(to) = recipient {
            let body = format!(
                "A new comment was added to the task: \"{}\".\n\nComment: \"{}\"",
                card.title, comment.text
            );
            self.notify(&to, &format!("New Comment on Task: {}", card.title), &body)
                .await;
        }

        Ok(comment)
    }

    /// Comments of a card, oldest first
    pub async fn list_comments(&self, actor: Uuid, card_id: Uuid) -> DomainResult<Vec<Comment>> {
        let mut tx = self.begin().await?;
        let (card, column) = card_with_column(&mut *tx, card_id).await?;
        authorize(&mut *tx, actor, column.board_id, BoardAction::ViewCards).await?;
        Ok(tx.list_comments(card.id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{todo, Fixture};
    use super::*;
    use crate::error::DomainError;
    use crate::models::board::CreateBoard;
    use crate::models::card::CreateCard;
    use crate::models::column::CreateColumn;
    use crate::models::membership::{AddMember, MemberRole};

    #[tokio::test]
    async fn test_comment_notifies_assignee_but_not_author() {
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
                    role: MemberRole::Viewer,
                },
            )
            .await
            .unwrap();
        let column = fx
            .services
            .create_column(
                ada.id,
                CreateColumn {
                    board_id,
                    column_type_id: todo(),
                    display_order: 0,
                },
            )
            .await
            .unwrap();
        let card = fx
            .services
            .create_card(
                ada.id,
                CreateCard {
                    column_id: column.id,
                    title: "Ship it".to_string(),
                    description: None,
                    priority: Default::default(),
                    due_date: None,
                    completion_percentage: 0,
                    assignee_id: Some(ada.id),
                },
            )
            .await
            .unwrap();

        // The invitation is the only message so far
        assert_eq!(fx.notifier.sent().await.len(), 1);

        fx.services.add_comment(ada.id, card.id, "note to self").await.unwrap();
        assert_eq!(fx.notifier.sent().await.len(), 1);

        fx.services.add_comment(bob.id, card.id, "looks good").await.unwrap();
        let sent = fx.notifier.sent().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].to, "ada@example.com");
        assert_eq!(sent[1].subject, "New Comment on Task: Ship it");

        let comments = fx.services.list_comments(bob.id, card.id).await.unwrap();
        let texts: Vec<&str> = comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["note to self", "looks good"]);

        let err = fx.services.add_comment(bob.id, card.id, "   ").await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_comment_on_missing_card() {
        let fx = Fixture::new();
        let ada = fx.user("ada").await;

        let err = fx
            .services
            .add_comment(ada.id, Uuid::new_v4(), "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "card", .. }));
    }
}
