use campus_entity::messaging::message::{Column, Entity, Model};
use campus_entity::messaging::participant::{self, Entity as Participant};
use campus_entity::user;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait,
};
use sea_orm::sea_query::Condition;
use uuid::Uuid;

pub struct Query;

impl Query {
    pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(id).one(conn).await
    }

    /// Messages of a conversation in the order they were sent, with their senders.
    pub async fn list_for_conversation<C: ConnectionTrait>(
        conn: &C,
        conversation_id: Uuid,
    ) -> Result<Vec<(Model, Option<user::Model>)>, DbErr> {
        Entity::find()
            .find_also_related(user::Entity)
            .filter(Column::ConversationId.eq(conversation_id))
            .order_by_asc(Column::CreatedAt)
            .all(conn)
            .await
    }

    pub async fn latest_in_conversation<C: ConnectionTrait>(
        conn: &C,
        conversation_id: Uuid,
    ) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::ConversationId.eq(conversation_id))
            .order_by_desc(Column::CreatedAt)
            .one(conn)
            .await
    }

    /// Unread messages from others across all conversations of the user.
    pub async fn unread_count_for_user<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<u64, DbErr> {
        Entity::find()
            .join(
                JoinType::InnerJoin,
                campus_entity::messaging::message::Relation::Conversation.def(),
            )
            .join(
                JoinType::InnerJoin,
                campus_entity::messaging::conversation::Relation::Participant.def(),
            )
            .filter(participant::Column::UserId.eq(user_id))
            .filter(Column::SenderId.ne(user_id))
            .filter(Column::IsRead.eq(false))
            .count(conn)
            .await
    }

    pub async fn unread_in_conversation<C: ConnectionTrait>(
        conn: &C,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> Result<u64, DbErr> {
        Entity::find()
            .filter(
                Condition::all()
                    .add(Column::ConversationId.eq(conversation_id))
                    .add(Column::SenderId.ne(user_id))
                    .add(Column::IsRead.eq(false)),
            )
            .count(conn)
            .await
    }

    pub async fn participant_count<C: ConnectionTrait>(conn: &C, conversation_id: Uuid) -> Result<u64, DbErr> {
        Participant::find()
            .filter(participant::Column::ConversationId.eq(conversation_id))
            .count(conn)
            .await
    }
}
