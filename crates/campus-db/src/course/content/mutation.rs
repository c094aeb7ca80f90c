use crate::util::now;
use campus_entity::course::content::{ActiveModel, ContentType, Entity, Model};
use sea_orm::ActiveValue::{Set, Unchanged};
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait};
use uuid::Uuid;

pub struct Mutation;

#[derive(Debug, Clone)]
pub struct NewContent {
    pub title: String,
    pub position: i32,
    pub content_type: ContentType,
    pub text: Option<String>,
    pub url: Option<String>,
}

impl Mutation {
    pub async fn create_content<C: ConnectionTrait>(
        conn: &C,
        module_id: Uuid,
        content: NewContent,
    ) -> Result<Model, DbErr> {
        ActiveModel {
            id: Set(Uuid::new_v4()),
            module_id: Set(module_id),
            title: Set(content.title),
            position: Set(content.position),
            content_type: Set(content.content_type),
            text: Set(content.text),
            file_path: Set(None),
            url: Set(content.url),
            created_at: Set(now()),
        }
        .insert(conn)
        .await
    }

    pub async fn update_content<C: ConnectionTrait>(conn: &C, content: ActiveModel) -> Result<Model, DbErr> {
        content.update(conn).await
    }

    pub async fn set_file_path<C: ConnectionTrait>(conn: &C, content_id: Uuid, path: String) -> Result<Model, DbErr> {
        ActiveModel {
            id: Unchanged(content_id),
            file_path: Set(Some(path)),
            ..Default::default()
        }
        .update(conn)
        .await
    }

    pub async fn delete_content<C: ConnectionTrait>(conn: &C, content_id: Uuid) -> Result<(), DbErr> {
        Entity::delete_by_id(content_id).exec(conn).await?;
        Ok(())
    }
}
