use campus_entity::forum::subscription::{Column, Entity};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect};
use uuid::Uuid;

pub struct Query;

impl Query {
    pub async fn is_subscribed<C: ConnectionTrait>(conn: &C, user_id: Uuid, topic_id: Uuid) -> Result<bool, DbErr> {
        let count = Entity::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::TopicId.eq(topic_id))
            .count(conn)
            .await?;
        Ok(count > 0)
    }

    pub async fn list_subscriber_ids<C: ConnectionTrait>(conn: &C, topic_id: Uuid) -> Result<Vec<Uuid>, DbErr> {
        Entity::find()
            .select_only()
            .column(Column::UserId)
            .filter(Column::TopicId.eq(topic_id))
            .into_tuple()
            .all(conn)
            .await
    }
}
