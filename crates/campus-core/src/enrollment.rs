use campus_db::course::enrollment;
use campus_entity::course::course::Model as Course;
use campus_entity::course::enrollment::Model as Enrollment;
use campus_entity::user::{Model as User, Role};
use sea_orm::{ConnectionTrait, DbErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnrollmentError {
    #[error(transparent)]
    Db(#[from] DbErr),
    #[error("Only students can enroll in courses")]
    NotAStudent,
    #[error("Course is not open for enrollment")]
    Inactive,
}

/// Enrolls `student` in `course`, reactivating an earlier enrollment instead of adding a second one.
pub async fn enroll<C: ConnectionTrait>(
    conn: &C,
    course: &Course,
    student: &User,
) -> Result<Enrollment, EnrollmentError> {
    if student.role != Role::Student {
        return Err(EnrollmentError::NotAStudent);
    }
    let enrollment = enrollment::Mutation::enroll(conn, student.id, course.id).await?;
    tracing::info!(course_id = %course.id, student_id = %student.id, "enrolled student");
    Ok(enrollment)
}

/// A student enrolling on their own can only join active courses.
pub async fn enroll_self<C: ConnectionTrait>(
    conn: &C,
    course: &Course,
    student: &User,
) -> Result<Enrollment, EnrollmentError> {
    if !course.is_active {
        return Err(EnrollmentError::Inactive);
    }
    enroll(conn, course, student).await
}

/// Returns `false` when there was no active enrollment to end.
pub async fn unenroll<C: ConnectionTrait>(conn: &C, course: &Course, student_id: uuid::Uuid) -> Result<bool, DbErr> {
    let was_active = enrollment::Query::is_active_student(conn, student_id, course.id).await?;
    if was_active {
        enrollment::Mutation::deactivate(conn, student_id, course.id).await?;
        tracing::info!(course_id = %course.id, %student_id, "ended enrollment");
    }
    Ok(was_active)
}
