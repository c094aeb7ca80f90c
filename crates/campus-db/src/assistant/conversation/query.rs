use campus_entity::assistant::conversation::{Column, Entity, Model};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

pub struct Query;

impl Query {
    pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(id).one(conn).await
    }

    pub async fn find_by_session<C: ConnectionTrait>(conn: &C, session_id: &str) -> Result<Option<Model>, DbErr> {
        Entity::find().filter(Column::SessionId.eq(session_id)).one(conn).await
    }

    pub async fn list_for_assistant_and_user<C: ConnectionTrait>(
        conn: &C,
        assistant_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::AssistantId.eq(assistant_id))
            .filter(Column::UserId.eq(user_id))
            .order_by_desc(Column::StartedAt)
            .all(conn)
            .await
    }
}
