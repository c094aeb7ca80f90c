use super::Query;
use crate::util::{RequireRecord, now};
use campus_entity::course::enrollment::{ActiveModel, Column, Entity, Model};
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use std::error::Error;
use uuid::Uuid;

pub struct Mutation;

impl Mutation {
    /// Enrolls the student, reactivating an earlier enrollment if one exists.
    pub async fn enroll<C: ConnectionTrait>(conn: &C, student_id: Uuid, course_id: Uuid) -> Result<Model, DbErr> {
        let enrollment = ActiveModel {
            id: Set(Uuid::new_v4()),
            student_id: Set(student_id),
            course_id: Set(course_id),
            enrolled_at: Set(now()),
            is_active: Set(true),
        };
        Entity::insert(enrollment)
            .on_conflict(
                OnConflict::columns([Column::StudentId, Column::CourseId])
                    .update_column(Column::IsActive)
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to enroll student"))?;

        Query::find(conn, student_id, course_id).await.require()
    }

    /// Returns `false` if there was no active enrollment to deactivate.
    pub async fn deactivate<C: ConnectionTrait>(conn: &C, student_id: Uuid, course_id: Uuid) -> Result<bool, DbErr> {
        let result = Entity::update_many()
            .col_expr(Column::IsActive, Expr::value(false))
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::IsActive.eq(true))
            .exec(conn)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
