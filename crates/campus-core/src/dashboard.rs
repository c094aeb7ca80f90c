use campus_db::course::{assignment, course, grade, submission};
use campus_db::messaging::message;
use campus_db::{notification, user};
use campus_entity::course::assignment::Model as AssignmentModel;
use campus_entity::course::course::Model as CourseModel;
use campus_entity::user::{Model as UserModel, Role};
use campus_model::course::Course;
use campus_model::course::assignment::Submission;
use campus_model::dashboard::{Dashboard, DashboardView, StudentDashboard, TaughtCourse, TeacherDashboard};
use campus_model_tools::convert::course::SubmissionParts;
use campus_model_tools::convert::{FromDbModel, IntoModel};
use sea_orm::{ConnectionTrait, DbErr};
use std::collections::{HashMap, HashSet};
use tracing::instrument;

const UPCOMING_LIMIT: u64 = 5;
const RECENT_LIMIT: u64 = 5;
const UNGRADED_LIMIT: u64 = 10;

/// Students get their study overview, everyone else the teaching overview.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn load<C: ConnectionTrait>(conn: &C, user: &UserModel) -> Result<Dashboard, DbErr> {
    let view = if user.role == Role::Student {
        DashboardView::Student(student_view(conn, user).await?)
    } else {
        DashboardView::Teacher(teacher_view(conn, user).await?)
    };
    Ok(Dashboard {
        view,
        unread_notifications: notification::Query::unread_count(conn, user.id).await?,
        unread_messages: message::Query::unread_count_for_user(conn, user.id).await?,
    })
}

async fn teacher_view<C: ConnectionTrait>(conn: &C, teacher: &UserModel) -> Result<TeacherDashboard, DbErr> {
    let taught = course::Query::list_teaching(conn, teacher.id).await?;
    let course_ids: Vec<_> = taught.iter().map(|course| course.id).collect();

    let mut courses = Vec::with_capacity(taught.len());
    for model in taught {
        let student_count = course::Query::count_active_students(conn, model.id).await?;
        let assignment_count = assignment::Query::list_for_course(conn, model.id).await?.len() as u64;
        let submission_count = submission::Query::count_for_course(conn, model.id).await?;
        courses.push(TaughtCourse {
            course: Course::from_db_model((model, teacher)),
            student_count,
            assignment_count,
            submission_count,
        });
    }

    let ungraded = submission::Query::list_ungraded_for_courses(conn, course_ids.clone(), UNGRADED_LIMIT).await?;
    let students = users_by_id(conn, ungraded.iter().map(|(submission, _)| submission.student_id)).await?;
    let ungraded_submissions = ungraded
        .into_iter()
        .filter_map(|(submission, assignment)| {
            let student = students.get(&submission.student_id)?;
            Some(Submission::from_db_model(SubmissionParts {
                submission,
                student,
                grade: None,
                due_date: assignment.and_then(|assignment| assignment.due_date),
            }))
        })
        .collect();

    let upcoming_assignments = assignment::Query::list_upcoming_for_courses(conn, course_ids, UPCOMING_LIMIT)
        .await?
        .into_iter()
        .map(IntoModel::into_model)
        .collect();

    Ok(TeacherDashboard {
        courses,
        ungraded_submissions,
        upcoming_assignments,
    })
}

async fn student_view<C: ConnectionTrait>(conn: &C, student: &UserModel) -> Result<StudentDashboard, DbErr> {
    let enrolled = course::Query::list_enrolled(conn, student.id).await?;
    let course_ids: Vec<_> = enrolled.iter().map(|course| course.id).collect();

    let upcoming_assignments = assignment::Query::list_upcoming_for_courses(conn, course_ids, UPCOMING_LIMIT)
        .await?
        .into_iter()
        .map(IntoModel::into_model)
        .collect();

    let mut recent_submissions = vec![];
    for (model, assignment) in submission::Query::list_recent_for_student(conn, student.id, RECENT_LIMIT).await? {
        let grade = grade::Query::find_for_submission(conn, model.id).await?;
        recent_submissions.push(Submission::from_db_model(SubmissionParts {
            submission: model,
            student,
            grade,
            due_date: assignment.and_then(|assignment| assignment.due_date),
        }));
    }

    let mut recent_grades = vec![];
    for (grade, model) in grade::Query::list_recent_for_student(conn, student.id, RECENT_LIMIT).await? {
        let Some(model) = model else { continue };
        let due_date = assignment::Query::find_by_id(conn, model.assignment_id)
            .await?
            .and_then(|assignment| assignment.due_date);
        recent_grades.push(Submission::from_db_model(SubmissionParts {
            submission: model,
            student,
            grade: Some(grade),
            due_date,
        }));
    }

    let missing_assignments = missing_assignments(conn, student, &enrolled)
        .await?
        .into_iter()
        .map(IntoModel::into_model)
        .collect();

    Ok(StudentDashboard {
        courses: courses_with_instructors(conn, enrolled).await?,
        upcoming_assignments,
        recent_submissions,
        recent_grades,
        missing_assignments,
    })
}

/// Past-due assignments of the given courses the student never handed anything in for.
async fn missing_assignments<C: ConnectionTrait>(
    conn: &C,
    student: &UserModel,
    courses: &[CourseModel],
) -> Result<Vec<AssignmentModel>, DbErr> {
    let submitted: HashSet<_> = submission::Query::submitted_assignment_ids(conn, student.id)
        .await?
        .into_iter()
        .collect();
    let mut missing = vec![];
    for course in courses {
        missing.extend(
            assignment::Query::list_for_course(conn, course.id)
                .await?
                .into_iter()
                .filter(|assignment| assignment.is_past_due() && !submitted.contains(&assignment.id)),
        );
    }
    Ok(missing)
}

/// Converts courses, loading their instructors in one query.
pub async fn courses_with_instructors<C: ConnectionTrait>(
    conn: &C,
    courses: Vec<CourseModel>,
) -> Result<Vec<Course>, DbErr> {
    let instructors = users_by_id(conn, courses.iter().map(|course| course.instructor_id)).await?;
    Ok(courses
        .into_iter()
        .filter_map(|course| {
            let instructor = instructors.get(&course.instructor_id)?;
            Some(Course::from_db_model((course, instructor)))
        })
        .collect())
}

async fn users_by_id<C: ConnectionTrait>(
    conn: &C,
    ids: impl Iterator<Item = uuid::Uuid>,
) -> Result<HashMap<uuid::Uuid, UserModel>, DbErr> {
    let mut ids: Vec<_> = ids.collect();
    ids.sort_unstable();
    ids.dedup();
    Ok(user::Query::find_users_by_ids(conn, ids)
        .await?
        .into_iter()
        .map(|user| (user.id, user))
        .collect())
}
