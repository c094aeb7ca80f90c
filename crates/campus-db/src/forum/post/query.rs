use campus_entity::forum::post::{Column, Entity, Model};
use campus_entity::user;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

pub struct Query;

impl Query {
    pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(id).one(conn).await
    }

    /// Posts of a topic in creation order with their authors.
    pub async fn list_for_topic<C: ConnectionTrait>(
        conn: &C,
        topic_id: Uuid,
    ) -> Result<Vec<(Model, Option<user::Model>)>, DbErr> {
        Entity::find()
            .find_also_related(user::Entity)
            .filter(Column::TopicId.eq(topic_id))
            .order_by_asc(Column::CreatedAt)
            .all(conn)
            .await
    }
}
