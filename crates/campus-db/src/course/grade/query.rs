use campus_entity::course::grade::{Column, Entity, Model};
use campus_entity::course::submission::{self, Entity as Submission};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

pub struct Query;

impl Query {
    pub async fn find_for_submission<C: ConnectionTrait>(
        conn: &C,
        submission_id: Uuid,
    ) -> Result<Option<Model>, DbErr> {
        Entity::find().filter(Column::SubmissionId.eq(submission_id)).one(conn).await
    }

    /// The latest grades a student received, newest first.
    pub async fn list_recent_for_student<C: ConnectionTrait>(
        conn: &C,
        student_id: Uuid,
        limit: u64,
    ) -> Result<Vec<(Model, Option<submission::Model>)>, DbErr> {
        Entity::find()
            .find_also_related(Submission)
            .filter(submission::Column::StudentId.eq(student_id))
            .order_by_desc(Column::GradedAt)
            .limit(limit)
            .all(conn)
            .await
    }
}
