mod common;

use crate::common::{connect, create_test_assignment, create_test_course, create_test_user};
use campus_core::access::CourseAccess;
use campus_core::enrollment::{self, EnrollmentError};
use campus_core::grading::{GradingError, SubmissionError, SubmissionSlot, grade_submission};
use campus_db::course::{course, grade, submission};
use campus_entity::course::submission::SubmissionStatus;
use campus_entity::user::Role;
use campus_model::course::assignment::GradeSubmission;
use test_log::test;

#[test(tokio::test)]
async fn test_enroll_twice_keeps_one_enrollment() {
    let db = &connect().await;
    let teacher = create_test_user(db, "teacher", Role::Teacher).await;
    let student = create_test_user(db, "student", Role::Student).await;
    let (course, _) = create_test_course(db, &teacher, "rust-101").await;

    let first = enrollment::enroll_self(db, &course, &student).await.unwrap();
    let second = enrollment::enroll_self(db, &course, &student).await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(course::Query::count_active_students(db, course.id).await.unwrap(), 1);

    assert!(enrollment::unenroll(db, &course, student.id).await.unwrap());
    assert!(!enrollment::unenroll(db, &course, student.id).await.unwrap());
    let again = enrollment::enroll_self(db, &course, &student).await.unwrap();
    assert_eq!(again.id, first.id);
    assert!(again.is_active);
}

#[test(tokio::test)]
async fn test_only_students_enroll() {
    let db = &connect().await;
    let teacher = create_test_user(db, "teacher", Role::Teacher).await;
    let other = create_test_user(db, "other", Role::Teacher).await;
    let (course, _) = create_test_course(db, &teacher, "rust-101").await;

    let result = enrollment::enroll_self(db, &course, &other).await;
    assert!(matches!(result, Err(EnrollmentError::NotAStudent)));
}

#[test(tokio::test)]
async fn test_content_access() {
    let db = &connect().await;
    let teacher = create_test_user(db, "teacher", Role::Teacher).await;
    let student = create_test_user(db, "student", Role::Student).await;
    let stranger = create_test_user(db, "stranger", Role::Student).await;
    let (course, _) = create_test_course(db, &teacher, "rust-101").await;
    enrollment::enroll_self(db, &course, &student).await.unwrap();

    let access = CourseAccess::load(db, &course, &teacher).await.unwrap();
    assert!(access.can_read_content());
    assert!(access.can_edit());

    let access = CourseAccess::load(db, &course, &student).await.unwrap();
    assert!(access.can_read_content());
    assert!(!access.can_edit());

    let access = CourseAccess::load(db, &course, &stranger).await.unwrap();
    assert!(!access.can_read_content());
    assert!(access.can_view(&course));

    enrollment::unenroll(db, &course, student.id).await.unwrap();
    let access = CourseAccess::load(db, &course, &student).await.unwrap();
    assert!(!access.can_read_content());
}

#[test(tokio::test)]
async fn test_submit_requires_enrollment() {
    let db = &connect().await;
    let teacher = create_test_user(db, "teacher", Role::Teacher).await;
    let student = create_test_user(db, "student", Role::Student).await;
    let (course, module) = create_test_course(db, &teacher, "rust-101").await;
    let assignment = create_test_assignment(db, &module, "Ownership", 7).await;

    let result = SubmissionSlot::open(db, course.id, assignment.id, student.id).await;
    assert!(matches!(result, Err(SubmissionError::NotEnrolled)));

    enrollment::enroll_self(db, &course, &student).await.unwrap();
    let slot = SubmissionSlot::open(db, course.id, assignment.id, student.id).await.unwrap();
    let result = slot.submit(db, Some("   ".to_owned()), None).await;
    assert!(matches!(result, Err(SubmissionError::Empty)));
}

#[test(tokio::test)]
async fn test_resubmission_and_grading() {
    let db = &connect().await;
    let teacher = create_test_user(db, "teacher", Role::Teacher).await;
    let student = create_test_user(db, "student", Role::Student).await;
    let (course, module) = create_test_course(db, &teacher, "rust-101").await;
    let assignment = create_test_assignment(db, &module, "Ownership", 7).await;
    enrollment::enroll_self(db, &course, &student).await.unwrap();

    let slot = SubmissionSlot::open(db, course.id, assignment.id, student.id).await.unwrap();
    assert!(!slot.is_resubmission());
    let first = slot.submit(db, Some("draft".to_owned()), None).await.unwrap();
    assert_eq!(first.status, SubmissionStatus::Submitted);

    let slot = SubmissionSlot::open(db, course.id, assignment.id, student.id).await.unwrap();
    assert!(slot.is_resubmission());
    let second = slot.submit(db, Some("final".to_owned()), None).await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.text.as_deref(), Some("final"));
    assert_eq!(submission::Query::count_for_assignment(db, assignment.id).await.unwrap(), 1);

    let too_many = GradeSubmission {
        points: 11.0,
        feedback: None,
        return_for_revision: false,
    };
    let result = grade_submission(db, second.id, &assignment, teacher.id, too_many).await;
    assert!(matches!(result, Err(GradingError::Validation(_))));

    let returned = GradeSubmission {
        points: 4.0,
        feedback: Some("Try again".to_owned()),
        return_for_revision: true,
    };
    let (submission, _) = grade_submission(db, second.id, &assignment, teacher.id, returned).await.unwrap();
    assert_eq!(submission.status, SubmissionStatus::Returned);
    SubmissionSlot::open(db, course.id, assignment.id, student.id).await.unwrap();

    let graded = GradeSubmission {
        points: 9.5,
        feedback: Some("Well done".to_owned()),
        return_for_revision: false,
    };
    let (submission, grade) = grade_submission(db, second.id, &assignment, teacher.id, graded).await.unwrap();
    assert_eq!(submission.status, SubmissionStatus::Graded);
    assert!((grade.points - 9.5).abs() < f64::EPSILON);

    let stored = grade::Query::find_for_submission(db, second.id).await.unwrap().unwrap();
    assert_eq!(stored.id, grade.id);

    let result = SubmissionSlot::open(db, course.id, assignment.id, student.id).await;
    assert!(matches!(result, Err(SubmissionError::Locked)));
}
