use crate::util::now;
use campus_entity::assistant::message::{ActiveModel, MessageType, Model};
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr};
use uuid::Uuid;

pub struct Mutation;

impl Mutation {
    pub async fn create_message<C: ConnectionTrait>(
        conn: &C,
        conversation_id: Uuid,
        message_type: MessageType,
        content: String,
    ) -> Result<Model, DbErr> {
        ActiveModel {
            id: Set(Uuid::new_v4()),
            conversation_id: Set(conversation_id),
            message_type: Set(message_type),
            content: Set(content),
            created_at: Set(now()),
        }
        .insert(conn)
        .await
    }
}
