use crate::util::now;
use campus_entity::forum::post::{ActiveModel, Entity, Model};
use sea_orm::ActiveValue::{Set, Unchanged};
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait};
use uuid::Uuid;

pub struct Mutation;

impl Mutation {
    pub async fn create_post<C: ConnectionTrait>(
        conn: &C,
        topic_id: Uuid,
        created_by: Uuid,
        content: String,
    ) -> Result<Model, DbErr> {
        let timestamp = now();
        ActiveModel {
            id: Set(Uuid::new_v4()),
            topic_id: Set(topic_id),
            content: Set(content),
            created_by: Set(created_by),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
            is_edited: Set(false),
        }
        .insert(conn)
        .await
    }

    pub async fn update_content<C: ConnectionTrait>(conn: &C, post_id: Uuid, content: String) -> Result<Model, DbErr> {
        ActiveModel {
            id: Unchanged(post_id),
            content: Set(content),
            updated_at: Set(now()),
            is_edited: Set(true),
            ..Default::default()
        }
        .update(conn)
        .await
    }

    pub async fn delete_post<C: ConnectionTrait>(conn: &C, post_id: Uuid) -> Result<(), DbErr> {
        Entity::delete_by_id(post_id).exec(conn).await?;
        Ok(())
    }
}
