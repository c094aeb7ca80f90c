use super::Query;
use crate::util::{RequireRecord, now};
use campus_entity::assistant::conversation::{ActiveModel, Column, Entity, Model};
use sea_orm::ActiveValue::{Set, Unchanged};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use uuid::Uuid;

pub struct Mutation;

impl Mutation {
    /// Returns the conversation of a vendor session, creating it on first contact.
    pub async fn get_or_create<C: ConnectionTrait>(
        conn: &C,
        assistant_id: Uuid,
        session_id: &str,
        user_id: Option<Uuid>,
        call_id: Option<String>,
    ) -> Result<Model, DbErr> {
        let conversation = ActiveModel {
            id: Set(Uuid::new_v4()),
            assistant_id: Set(assistant_id),
            user_id: Set(user_id),
            session_id: Set(session_id.to_owned()),
            call_id: Set(call_id),
            started_at: Set(now()),
            ended_at: Set(None),
        };
        Entity::insert(conversation)
            .on_conflict(OnConflict::column(Column::SessionId).do_nothing().to_owned())
            .exec_without_returning(conn)
            .await?;

        Query::find_by_session(conn, session_id).await.require()
    }

    pub async fn set_user<C: ConnectionTrait>(conn: &C, conversation_id: Uuid, user_id: Uuid) -> Result<Model, DbErr> {
        ActiveModel {
            id: Unchanged(conversation_id),
            user_id: Set(Some(user_id)),
            ..Default::default()
        }
        .update(conn)
        .await
    }

    /// Closes the open conversations of a call. Returns how many were closed.
    pub async fn mark_ended_by_call<C: ConnectionTrait>(conn: &C, call_id: &str) -> Result<u64, DbErr> {
        let result = Entity::update_many()
            .col_expr(Column::EndedAt, Expr::value(now()))
            .filter(Column::CallId.eq(call_id))
            .filter(Column::EndedAt.is_null())
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }
}
