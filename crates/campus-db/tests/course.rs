mod common;

use crate::common::setup_schema;
use crate::common::user::{create_test_course, create_test_user};
use campus_db::course::{assignment, course, enrollment, grade, module, submission};
use campus_entity::course::submission::SubmissionStatus;
use campus_entity::user::Role;
use chrono::{Duration, Utc};
use sea_orm::Database;
use test_log::test;

#[test(tokio::test)]
async fn test_enroll_is_idempotent() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();
    let teacher = create_test_user(db, "teacher", Role::Teacher).await;
    let student = create_test_user(db, "student", Role::Student).await;
    let (course, _) = create_test_course(db, &teacher, "rust-101").await;

    let first = enrollment::Mutation::enroll(db, student.id, course.id).await.unwrap();
    let second = enrollment::Mutation::enroll(db, student.id, course.id).await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(course::Query::count_active_students(db, course.id).await.unwrap(), 1);

    assert!(enrollment::Mutation::deactivate(db, student.id, course.id).await.unwrap());
    assert!(!enrollment::Mutation::deactivate(db, student.id, course.id).await.unwrap());
    assert!(!enrollment::Query::is_active_student(db, student.id, course.id).await.unwrap());
    assert!(course::Query::list_enrolled(db, student.id).await.unwrap().is_empty());

    let reactivated = enrollment::Mutation::enroll(db, student.id, course.id).await.unwrap();
    assert_eq!(reactivated.id, first.id);
    assert!(reactivated.is_active);
    assert_eq!(course::Query::list_enrolled(db, student.id).await.unwrap().len(), 1);
}

#[test(tokio::test)]
async fn test_list_available() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();
    let teacher = create_test_user(db, "teacher", Role::Teacher).await;
    let student = create_test_user(db, "student", Role::Student).await;
    let (enrolled, _) = create_test_course(db, &teacher, "enrolled").await;
    let (open, _) = create_test_course(db, &teacher, "open").await;
    enrollment::Mutation::enroll(db, student.id, enrolled.id).await.unwrap();

    let available = course::Query::list_available(db, student.id).await.unwrap();
    assert_eq!(available.into_iter().map(|course| course.id).collect::<Vec<_>>(), vec![open.id]);
    assert!(course::Query::list_available(db, teacher.id).await.unwrap().is_empty());
}

#[test(tokio::test)]
async fn test_module_positions() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();
    let teacher = create_test_user(db, "teacher", Role::Teacher).await;
    let (course, first) = create_test_course(db, &teacher, "positions").await;

    let position = module::Query::next_position(db, course.id).await.unwrap();
    assert_eq!(position, first.position + 1);
    module::Mutation::create_module(db, course.id, "Week 2".to_owned(), String::new(), position)
        .await
        .unwrap();

    let titles: Vec<_> = module::Query::list_for_course(db, course.id)
        .await
        .unwrap()
        .into_iter()
        .map(|module| module.title)
        .collect();
    assert_eq!(titles, ["Week 1", "Week 2"]);
}

#[test(tokio::test)]
async fn test_submission_and_grade() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();
    let teacher = create_test_user(db, "teacher", Role::Teacher).await;
    let student = create_test_user(db, "student", Role::Student).await;
    let (course, module) = create_test_course(db, &teacher, "grading").await;
    let due_date = (Utc::now() + Duration::days(7)).fixed_offset();
    let assignment = assignment::Mutation::create_assignment(
        db,
        module.id,
        "Essay".to_owned(),
        String::new(),
        Some(due_date),
        50,
    )
    .await
    .unwrap();

    let (found, course_id) = assignment::Query::find_with_course_id(db, assignment.id).await.unwrap().unwrap();
    assert_eq!(found.id, assignment.id);
    assert_eq!(course_id, course.id);

    let created = submission::Mutation::create_submission(db, assignment.id, student.id, Some("v1".to_owned()), None)
        .await
        .unwrap();
    assert_eq!(created.status, SubmissionStatus::Submitted);
    assert!(!created.is_late(assignment.due_date));

    let ungraded = submission::Query::list_ungraded_for_courses(db, vec![course.id], 10).await.unwrap();
    assert_eq!(ungraded.len(), 1);

    grade::Mutation::upsert_grade(db, created.id, teacher.id, 40.0, Some("good".to_owned()))
        .await
        .unwrap();
    let regraded = grade::Mutation::upsert_grade(db, created.id, teacher.id, 45.0, None).await.unwrap();
    assert!((regraded.points - 45.0).abs() < f64::EPSILON);
    assert_eq!(regraded.feedback, None);
    submission::Mutation::set_status(db, created.id, SubmissionStatus::Graded).await.unwrap();

    let (stored, grade) = submission::Query::find_for_student(db, assignment.id, student.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, SubmissionStatus::Graded);
    assert_eq!(grade.map(|grade| grade.id), Some(regraded.id));
    assert!(submission::Query::list_ungraded_for_courses(db, vec![course.id], 10).await.unwrap().is_empty());
    assert_eq!(submission::Query::count_for_course(db, course.id).await.unwrap(), 1);

    let rows = submission::Query::list_for_assignment(db, assignment.id).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].1.id, student.id);
    assert!(rows[0].2.is_some());
}

#[test(tokio::test)]
async fn test_resubmit_keeps_file_when_none_given() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();
    let teacher = create_test_user(db, "teacher", Role::Teacher).await;
    let student = create_test_user(db, "student", Role::Student).await;
    let (_, module) = create_test_course(db, &teacher, "resubmit").await;
    let assignment =
        assignment::Mutation::create_assignment(db, module.id, "Lab".to_owned(), String::new(), None, 10)
            .await
            .unwrap();

    let created = submission::Mutation::create_submission(
        db,
        assignment.id,
        student.id,
        None,
        Some("submissions/resubmit/lab.pdf".to_owned()),
    )
    .await
    .unwrap();
    submission::Mutation::set_status(db, created.id, SubmissionStatus::Returned).await.unwrap();

    let resubmitted = submission::Mutation::resubmit(db, created.id, Some("fixed".to_owned()), None)
        .await
        .unwrap();
    assert_eq!(resubmitted.status, SubmissionStatus::Submitted);
    assert_eq!(resubmitted.text.as_deref(), Some("fixed"));
    assert_eq!(resubmitted.file_path.as_deref(), Some("submissions/resubmit/lab.pdf"));
}

#[test(tokio::test)]
async fn test_upcoming_assignments() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();
    let teacher = create_test_user(db, "teacher", Role::Teacher).await;
    let (course, module) = create_test_course(db, &teacher, "upcoming").await;
    let past = (Utc::now() - Duration::days(1)).fixed_offset();
    let soon = (Utc::now() + Duration::days(1)).fixed_offset();
    let later = (Utc::now() + Duration::days(10)).fixed_offset();
    for (title, due_date) in [("past", Some(past)), ("later", Some(later)), ("soon", Some(soon)), ("none", None)] {
        assignment::Mutation::create_assignment(db, module.id, title.to_owned(), String::new(), due_date, 10)
            .await
            .unwrap();
    }

    let upcoming: Vec<_> = assignment::Query::list_upcoming_for_courses(db, vec![course.id], 5)
        .await
        .unwrap()
        .into_iter()
        .map(|assignment| assignment.title)
        .collect();
    assert_eq!(upcoming, ["soon", "later"]);
}
