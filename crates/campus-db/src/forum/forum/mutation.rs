use crate::util::now;
use campus_entity::forum::forum::{ActiveModel, Model};
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr};
use uuid::Uuid;

pub struct Mutation;

impl Mutation {
    pub async fn create_forum<C: ConnectionTrait>(
        conn: &C,
        title: String,
        slug: String,
        description: String,
        course_id: Option<Uuid>,
    ) -> Result<Model, DbErr> {
        ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(title),
            slug: Set(slug),
            description: Set(description),
            course_id: Set(course_id),
            is_active: Set(true),
            created_at: Set(now()),
        }
        .insert(conn)
        .await
    }

    pub async fn update_forum<C: ConnectionTrait>(conn: &C, forum: ActiveModel) -> Result<Model, DbErr> {
        forum.update(conn).await
    }
}
