use crate::util::{FlattenTransactionResultExt, now};
use campus_entity::messaging::conversation::{ActiveModel, Column, Entity, Model};
use campus_entity::messaging::participant::{self, Entity as Participant};
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, TransactionTrait,
};
use std::error::Error;
use uuid::Uuid;

pub struct Mutation;

impl Mutation {
    /// Creates the conversation and its participant rows. Duplicate ids are stored once.
    pub async fn create_conversation<C: TransactionTrait>(
        conn: &C,
        subject: String,
        mut participant_ids: Vec<Uuid>,
    ) -> Result<Model, DbErr> {
        participant_ids.sort_unstable();
        participant_ids.dedup();

        conn.transaction::<_, _, DbErr>(|txn| {
            Box::pin(async move {
                let timestamp = now();
                let conversation = ActiveModel {
                    id: Set(Uuid::new_v4()),
                    subject: Set(subject),
                    created_at: Set(timestamp),
                    updated_at: Set(timestamp),
                }
                .insert(txn)
                .await?;

                let participants = participant_ids.into_iter().map(|user_id| participant::ActiveModel {
                    conversation_id: Set(conversation.id),
                    user_id: Set(user_id),
                });
                Participant::insert_many(participants).exec_without_returning(txn).await?;

                Ok(conversation)
            })
        })
        .await
        .flatten_res()
        .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to create conversation"))
    }

    pub async fn touch<C: ConnectionTrait>(conn: &C, conversation_id: Uuid) -> Result<(), DbErr> {
        Entity::update_many()
            .col_expr(Column::UpdatedAt, Expr::value(now()))
            .filter(Column::Id.eq(conversation_id))
            .exec(conn)
            .await?;
        Ok(())
    }

    pub async fn remove_participant<C: ConnectionTrait>(
        conn: &C,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), DbErr> {
        Participant::delete_many()
            .filter(participant::Column::ConversationId.eq(conversation_id))
            .filter(participant::Column::UserId.eq(user_id))
            .exec(conn)
            .await?;
        Ok(())
    }

    pub async fn delete_conversation<C: ConnectionTrait>(conn: &C, conversation_id: Uuid) -> Result<(), DbErr> {
        Entity::delete_by_id(conversation_id).exec(conn).await?;
        Ok(())
    }
}
