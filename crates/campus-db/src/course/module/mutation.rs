use crate::util::now;
use campus_entity::course::module::{ActiveModel, Entity, Model};
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait};
use uuid::Uuid;

pub struct Mutation;

impl Mutation {
    pub async fn create_module<C: ConnectionTrait>(
        conn: &C,
        course_id: Uuid,
        title: String,
        description: String,
        position: i32,
    ) -> Result<Model, DbErr> {
        ActiveModel {
            id: Set(Uuid::new_v4()),
            course_id: Set(course_id),
            title: Set(title),
            description: Set(description),
            position: Set(position),
            created_at: Set(now()),
        }
        .insert(conn)
        .await
    }

    pub async fn update_module<C: ConnectionTrait>(conn: &C, module: ActiveModel) -> Result<Model, DbErr> {
        module.update(conn).await
    }

    pub async fn delete_module<C: ConnectionTrait>(conn: &C, module_id: Uuid) -> Result<(), DbErr> {
        Entity::delete_by_id(module_id).exec(conn).await?;
        Ok(())
    }
}
