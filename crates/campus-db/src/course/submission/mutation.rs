use crate::util::now;
use campus_entity::course::submission::{ActiveModel, Model, SubmissionStatus};
use sea_orm::ActiveValue::{Set, Unchanged};
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr};
use std::error::Error;
use uuid::Uuid;

pub struct Mutation;

impl Mutation {
    pub async fn create_submission<C: ConnectionTrait>(
        conn: &C,
        assignment_id: Uuid,
        student_id: Uuid,
        text: Option<String>,
        file_path: Option<String>,
    ) -> Result<Model, DbErr> {
        let timestamp = now();
        ActiveModel {
            id: Set(Uuid::new_v4()),
            assignment_id: Set(assignment_id),
            student_id: Set(student_id),
            text: Set(text),
            file_path: Set(file_path),
            status: Set(SubmissionStatus::Submitted),
            submitted_at: Set(timestamp),
            updated_at: Set(timestamp),
        }
        .insert(conn)
        .await
        .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to create submission"))
    }

    /// Replaces the submitted work and puts the submission back into the grading queue. A new file
    /// replaces the stored one, `None` keeps it.
    pub async fn resubmit<C: ConnectionTrait>(
        conn: &C,
        submission_id: Uuid,
        text: Option<String>,
        file_path: Option<String>,
    ) -> Result<Model, DbErr> {
        let timestamp = now();
        let mut submission = ActiveModel {
            id: Unchanged(submission_id),
            text: Set(text),
            status: Set(SubmissionStatus::Submitted),
            submitted_at: Set(timestamp),
            updated_at: Set(timestamp),
            ..Default::default()
        };
        if file_path.is_some() {
            submission.file_path = Set(file_path);
        }
        submission.update(conn).await
    }

    pub async fn set_status<C: ConnectionTrait>(
        conn: &C,
        submission_id: Uuid,
        status: SubmissionStatus,
    ) -> Result<Model, DbErr> {
        ActiveModel {
            id: Unchanged(submission_id),
            status: Set(status),
            updated_at: Set(now()),
            ..Default::default()
        }
        .update(conn)
        .await
    }
}
