use crate::util::now;
use campus_entity::forum::subscription::{ActiveModel, Column, Entity};
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use uuid::Uuid;

pub struct Mutation;

impl Mutation {
    /// Subscribing twice is a no-op.
    pub async fn subscribe<C: ConnectionTrait>(conn: &C, user_id: Uuid, topic_id: Uuid) -> Result<(), DbErr> {
        let subscription = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            topic_id: Set(topic_id),
            created_at: Set(now()),
        };
        Entity::insert(subscription)
            .on_conflict(
                OnConflict::columns([Column::UserId, Column::TopicId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;
        Ok(())
    }

    pub async fn unsubscribe<C: ConnectionTrait>(conn: &C, user_id: Uuid, topic_id: Uuid) -> Result<(), DbErr> {
        Entity::delete_many()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::TopicId.eq(topic_id))
            .exec(conn)
            .await?;
        Ok(())
    }
}
