use campus_entity::messaging::conversation::{Column, Entity, Model};
use campus_entity::messaging::participant::{self, Entity as Participant};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use std::error::Error;
use uuid::Uuid;

pub struct Query;

impl Query {
    pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(id).one(conn).await
    }

    /// Conversations the user takes part in, most recent activity first.
    pub async fn list_for_user<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .inner_join(Participant)
            .filter(participant::Column::UserId.eq(user_id))
            .order_by_desc(Column::UpdatedAt)
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "error loading conversations");
            })
    }

    pub async fn participant_ids<C: ConnectionTrait>(conn: &C, conversation_id: Uuid) -> Result<Vec<Uuid>, DbErr> {
        Participant::find()
            .select_only()
            .column(participant::Column::UserId)
            .filter(participant::Column::ConversationId.eq(conversation_id))
            .into_tuple()
            .all(conn)
            .await
    }

    pub async fn is_participant<C: ConnectionTrait>(
        conn: &C,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, DbErr> {
        let count = Participant::find()
            .filter(participant::Column::ConversationId.eq(conversation_id))
            .filter(participant::Column::UserId.eq(user_id))
            .count(conn)
            .await?;
        Ok(count > 0)
    }
}
