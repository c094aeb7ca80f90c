use crate::util::now;
use campus_entity::assistant::assistant::{ActiveModel, Entity, Model, Voice};
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait};
use std::error::Error;
use uuid::Uuid;

pub struct Mutation;

#[derive(Debug, Clone)]
pub struct NewAssistant {
    pub course_id: Uuid,
    pub name: String,
    pub voice: Voice,
    pub greeting_message: String,
    pub is_active: bool,
    pub agent_id: String,
    pub webhook_token: Option<String>,
}

impl Mutation {
    pub async fn create_assistant<C: ConnectionTrait>(conn: &C, assistant: NewAssistant) -> Result<Model, DbErr> {
        let timestamp = now();
        ActiveModel {
            id: Set(Uuid::new_v4()),
            course_id: Set(assistant.course_id),
            name: Set(assistant.name),
            voice: Set(assistant.voice),
            greeting_message: Set(assistant.greeting_message),
            is_active: Set(assistant.is_active),
            agent_id: Set(assistant.agent_id),
            webhook_token: Set(assistant.webhook_token),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        }
        .insert(conn)
        .await
        .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to store assistant"))
    }

    pub async fn update_assistant<C: ConnectionTrait>(conn: &C, mut assistant: ActiveModel) -> Result<Model, DbErr> {
        assistant.updated_at = Set(now());
        assistant.update(conn).await
    }

    pub async fn delete_assistant<C: ConnectionTrait>(conn: &C, assistant_id: Uuid) -> Result<(), DbErr> {
        Entity::delete_by_id(assistant_id).exec(conn).await?;
        Ok(())
    }
}
