use campus_db::course::{enrollment, grade, submission};
use campus_db::util::FlattenTransactionResultExt;
use campus_entity::course::assignment::Model as Assignment;
use campus_entity::course::grade::Model as Grade;
use campus_entity::course::submission::{Model as Submission, SubmissionStatus};
use campus_model::course::assignment::GradeSubmission;
use campus_model::validation::FieldErrors;
use sea_orm::{ConnectionTrait, DbErr, TransactionTrait};
use std::error::Error;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Db(#[from] DbErr),
    #[error("An active enrollment is required to submit")]
    NotEnrolled,
    #[error("The submission has been graded and can no longer be changed")]
    Locked,
    #[error("A submission needs a text or a file")]
    Empty,
}

#[derive(Debug, Error)]
pub enum GradingError {
    #[error(transparent)]
    Db(#[from] DbErr),
    #[error("Invalid grade")]
    Validation(FieldErrors),
}

/// Checked permission to write the submission of one student for one assignment.
///
/// Obtained before any uploaded file is stored so a rejected submission leaves nothing behind.
#[derive(Debug)]
pub struct SubmissionSlot {
    assignment_id: Uuid,
    student_id: Uuid,
    existing: Option<Submission>,
}

impl SubmissionSlot {
    pub async fn open<C: ConnectionTrait>(
        conn: &C,
        course_id: Uuid,
        assignment_id: Uuid,
        student_id: Uuid,
    ) -> Result<Self, SubmissionError> {
        if !enrollment::Query::is_active_student(conn, student_id, course_id).await? {
            return Err(SubmissionError::NotEnrolled);
        }
        let existing = submission::Query::find_for_student(conn, assignment_id, student_id)
            .await?
            .map(|(submission, _)| submission);
        if existing
            .as_ref()
            .is_some_and(|submission| !submission.status.accepts_resubmission())
        {
            return Err(SubmissionError::Locked);
        }
        Ok(Self {
            assignment_id,
            student_id,
            existing,
        })
    }

    #[must_use]
    pub fn is_resubmission(&self) -> bool {
        self.existing.is_some()
    }

    /// Creates the submission or replaces the earlier one. A resubmission without a new file keeps
    /// the stored file.
    pub async fn submit<C: ConnectionTrait>(
        self,
        conn: &C,
        text: Option<String>,
        file_path: Option<String>,
    ) -> Result<Submission, SubmissionError> {
        let text = text.filter(|text| !text.trim().is_empty());
        if text.is_none() && file_path.is_none() {
            return Err(SubmissionError::Empty);
        }
        let submission = match self.existing {
            Some(existing) => submission::Mutation::resubmit(conn, existing.id, text, file_path).await?,
            None => {
                submission::Mutation::create_submission(conn, self.assignment_id, self.student_id, text, file_path)
                    .await?
            }
        };
        tracing::info!(submission_id = %submission.id, assignment_id = %self.assignment_id, "stored submission");
        Ok(submission)
    }
}

/// Writes the single grade of a submission and moves the submission to `graded`, or to `returned`
/// when the student should revise it. Both happen in one transaction.
pub async fn grade_submission<C: TransactionTrait>(
    conn: &C,
    submission_id: Uuid,
    assignment: &Assignment,
    grader_id: Uuid,
    input: GradeSubmission,
) -> Result<(Submission, Grade), GradingError> {
    input
        .validate_against(assignment.points)
        .map_err(GradingError::Validation)?;

    let status = if input.return_for_revision {
        SubmissionStatus::Returned
    } else {
        SubmissionStatus::Graded
    };

    conn.transaction::<_, _, GradingError>(|txn| {
        Box::pin(async move {
            let grade = grade::Mutation::upsert_grade(txn, submission_id, grader_id, input.points, input.feedback).await?;
            let submission = submission::Mutation::set_status(txn, submission_id, status).await?;
            Ok((submission, grade))
        })
    })
    .await
    .flatten_res()
    .inspect_err(|error| tracing::error!(error = error as &dyn Error, %submission_id, "failed to grade submission"))
}
