use super::Query;
use crate::util::{RequireRecord, now};
use campus_entity::course::grade::{ActiveModel, Column, Entity, Model};
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait};
use uuid::Uuid;

pub struct Mutation;

impl Mutation {
    /// Stores the grade of a submission, replacing an earlier one.
    pub async fn upsert_grade<C: ConnectionTrait>(
        conn: &C,
        submission_id: Uuid,
        grader_id: Uuid,
        points: f64,
        feedback: Option<String>,
    ) -> Result<Model, DbErr> {
        let grade = ActiveModel {
            id: Set(Uuid::new_v4()),
            submission_id: Set(submission_id),
            points: Set(points),
            feedback: Set(feedback),
            grader_id: Set(grader_id),
            graded_at: Set(now()),
        };
        Entity::insert(grade)
            .on_conflict(
                OnConflict::column(Column::SubmissionId)
                    .update_columns([Column::Points, Column::Feedback, Column::GraderId, Column::GradedAt])
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;

        Query::find_for_submission(conn, submission_id).await.require()
    }
}
