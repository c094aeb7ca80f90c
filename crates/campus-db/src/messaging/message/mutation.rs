use crate::util::now;
use campus_entity::messaging::message::{ActiveModel, Column, Entity, Model};
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use uuid::Uuid;

pub struct Mutation;

impl Mutation {
    pub async fn create_message<C: ConnectionTrait>(
        conn: &C,
        conversation_id: Uuid,
        sender_id: Uuid,
        content: String,
    ) -> Result<Model, DbErr> {
        ActiveModel {
            id: Set(Uuid::new_v4()),
            conversation_id: Set(conversation_id),
            sender_id: Set(sender_id),
            content: Set(content),
            created_at: Set(now()),
            is_read: Set(false),
        }
        .insert(conn)
        .await
    }

    /// Marks every message in the conversation that `reader_id` did not send as read. Returns the ids
    /// of the messages that changed.
    pub async fn mark_read_from_others<C: ConnectionTrait>(
        conn: &C,
        conversation_id: Uuid,
        reader_id: Uuid,
    ) -> Result<Vec<Uuid>, DbErr> {
        let unread: Vec<Uuid> = Entity::find()
            .filter(Column::ConversationId.eq(conversation_id))
            .filter(Column::SenderId.ne(reader_id))
            .filter(Column::IsRead.eq(false))
            .all(conn)
            .await?
            .into_iter()
            .map(|message| message.id)
            .collect();
        if unread.is_empty() {
            return Ok(unread);
        }

        Entity::update_many()
            .col_expr(Column::IsRead, Expr::value(true))
            .filter(Column::Id.is_in(unread.clone()))
            .exec(conn)
            .await?;
        Ok(unread)
    }

    pub async fn delete_message<C: ConnectionTrait>(conn: &C, message_id: Uuid) -> Result<(), DbErr> {
        Entity::delete_by_id(message_id).exec(conn).await?;
        Ok(())
    }
}
