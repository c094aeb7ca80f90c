use crate::AppConfig;
use crate::permissions::Permission;
use crate::routes::api::v0::courses::error::CourseError;
use crate::routes::api::v0::courses::{load_course, load_course_content, load_taught_course};
use crate::routes::upload::Form;
use crate::user::ExtractUser;
use axum::extract::{Multipart, Path};
use axum::response::IntoResponse;
use axum::routing::{Router, get, post};
use axum::{Extension, Json};
use campus_core::grading::{SubmissionSlot, grade_submission};
use campus_db::course::{
    assignment as assignment_db, grade as grade_db, module as module_db, submission as submission_db,
};
use campus_db::sea_orm::ActiveValue::{Set, Unchanged};
use campus_db::sea_orm::DatabaseConnection;
use campus_db::user;
use campus_db::util::to_utc;
use campus_entity::course::assignment::{ActiveModel as AssignmentActiveModel, Model as AssignmentModel};
use campus_entity::course::submission::Model as SubmissionModel;
use campus_model::course::assignment::{
    Assignment, AssignmentDetail, GradeSubmission, NewAssignment, Submission, UpdateAssignment,
};
use campus_model::validation::Validate;
use campus_model_tools::convert::FromDbModel;
use campus_model_tools::convert::course::SubmissionParts;
use campus_utils::media::MediaKind;
use http::StatusCode;
use protect_axum::protect;
use std::error::Error;
use utoipa::ToSchema;
use uuid::Uuid;

pub(super) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/{course}/modules/{module}/assignments", post(create_assignment))
        .route(
            "/{course}/assignments/{assignment}",
            get(get_assignment).patch(update_assignment).delete(delete_assignment),
        )
        .route("/{course}/assignments/{assignment}/submit", post(submit_assignment))
        .route("/{course}/submissions/{submission}", get(get_submission))
        .route("/{course}/submissions/{submission}/grade", post(grade))
        .with_state(())
}

async fn load_assignment(
    conn: &DatabaseConnection,
    course_id: Uuid,
    assignment_id: Uuid,
) -> Result<AssignmentModel, CourseError> {
    assignment_db::Query::find_with_course_id(conn, assignment_id)
        .await?
        .filter(|(_, assignment_course_id)| *assignment_course_id == course_id)
        .map(|(assignment, _)| assignment)
        .ok_or(CourseError::NotFound)
}

async fn load_submission(
    conn: &DatabaseConnection,
    course_id: Uuid,
    submission_id: Uuid,
) -> Result<(SubmissionModel, AssignmentModel), CourseError> {
    let submission = submission_db::Query::find_by_id(conn, submission_id)
        .await?
        .ok_or(CourseError::NotFound)?;
    let assignment = load_assignment(conn, course_id, submission.assignment_id).await?;
    Ok((submission, assignment))
}

#[utoipa::path(
    post,
    path = "/api/v0/courses/{course}/modules/{module}/assignments",
    request_body = NewAssignment,
    responses(
        (status = CREATED, description = "Created assignment", body = Assignment),
        (status = FORBIDDEN, description = "Caller is not the instructor"),
    ),
    params(
        ("course" = String, Path, description = "Course slug"),
        ("module" = Uuid, Path, description = "Module id"),
    ),
    tag = "v0/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn create_assignment(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path((slug, module_id)): Path<(String, Uuid)>,
    Json(body): Json<NewAssignment>,
) -> Result<impl IntoResponse, CourseError> {
    let course = load_taught_course(&conn, &slug, &user).await?;
    let module = module_db::Query::find_by_id(&conn, module_id)
        .await?
        .filter(|module| module.course_id == course.id)
        .ok_or(CourseError::NotFound)?;
    body.validate().map_err(CourseError::Validation)?;

    let assignment = assignment_db::Mutation::create_assignment(
        &conn,
        module.id,
        body.title,
        body.description,
        body.due_date.map(to_utc),
        body.points,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(Assignment::from_db_model(assignment))))
}

#[utoipa::path(
    get,
    path = "/api/v0/courses/{course}/assignments/{assignment}",
    responses(
        (status = OK, description = "Assignment with the caller's submission, or every submission for the instructor", body = AssignmentDetail),
        (status = FORBIDDEN, description = "Caller is neither instructor nor enrolled"),
    ),
    params(
        ("course" = String, Path, description = "Course slug"),
        ("assignment" = Uuid, Path, description = "Assignment id"),
    ),
    tag = "v0/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn get_assignment(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path((slug, assignment_id)): Path<(String, Uuid)>,
) -> Result<impl IntoResponse, CourseError> {
    let (course, access) = load_course_content(&conn, &slug, &user).await?;
    let assignment = load_assignment(&conn, course.id, assignment_id).await?;
    let due_date = assignment.due_date;

    let (submission, submissions) = if access.is_instructor {
        let submissions = submission_db::Query::list_for_assignment(&conn, assignment.id)
            .await?
            .into_iter()
            .map(|(submission, student, grade)| {
                Submission::from_db_model(SubmissionParts {
                    submission,
                    student: &student,
                    grade,
                    due_date,
                })
            })
            .collect();
        (None, Some(submissions))
    } else {
        let submission = submission_db::Query::find_for_student(&conn, assignment.id, user.id)
            .await?
            .map(|(submission, grade)| {
                Submission::from_db_model(SubmissionParts {
                    submission,
                    student: &user,
                    grade,
                    due_date,
                })
            });
        (submission, None)
    };

    Ok(Json(AssignmentDetail {
        assignment: Assignment::from_db_model(assignment),
        submission,
        submissions,
    }))
}

#[utoipa::path(
    patch,
    path = "/api/v0/courses/{course}/assignments/{assignment}",
    request_body = UpdateAssignment,
    responses(
        (status = OK, description = "Updated assignment", body = Assignment),
    ),
    params(
        ("course" = String, Path, description = "Course slug"),
        ("assignment" = Uuid, Path, description = "Assignment id"),
    ),
    tag = "v0/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn update_assignment(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path((slug, assignment_id)): Path<(String, Uuid)>,
    Json(body): Json<UpdateAssignment>,
) -> Result<impl IntoResponse, CourseError> {
    let course = load_taught_course(&conn, &slug, &user).await?;
    let assignment = load_assignment(&conn, course.id, assignment_id).await?;
    body.validate().map_err(CourseError::Validation)?;

    let mut active = AssignmentActiveModel {
        id: Unchanged(assignment.id),
        ..Default::default()
    };
    if let Some(title) = body.title {
        active.title = Set(title);
    }
    if let Some(description) = body.description {
        active.description = Set(description);
    }
    if let Some(due_date) = body.due_date {
        active.due_date = Set(due_date.map(to_utc));
    }
    if let Some(points) = body.points {
        active.points = Set(points);
    }
    let assignment = assignment_db::Mutation::update_assignment(&conn, active).await?;
    Ok(Json(Assignment::from_db_model(assignment)))
}

#[utoipa::path(
    delete,
    path = "/api/v0/courses/{course}/assignments/{assignment}",
    responses(
        (status = NO_CONTENT, description = "Assignment deleted with its submissions"),
    ),
    params(
        ("course" = String, Path, description = "Course slug"),
        ("assignment" = Uuid, Path, description = "Assignment id"),
    ),
    tag = "v0/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn delete_assignment(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path((slug, assignment_id)): Path<(String, Uuid)>,
) -> Result<impl IntoResponse, CourseError> {
    let course = load_taught_course(&conn, &slug, &user).await?;
    let assignment = load_assignment(&conn, course.id, assignment_id).await?;
    assignment_db::Mutation::delete_assignment(&conn, assignment.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub(crate) struct SubmissionUpload {
    text: Option<String>,
    #[schema(format = Binary)]
    file: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v0/courses/{course}/assignments/{assignment}/submit",
    request_body(content = SubmissionUpload, content_type = "multipart/form-data"),
    responses(
        (status = CREATED, description = "First submission", body = Submission),
        (status = OK, description = "Earlier submission replaced", body = Submission),
        (status = BAD_REQUEST, description = "Neither text nor file"),
        (status = FORBIDDEN, description = "Caller is not actively enrolled"),
        (status = CONFLICT, description = "The submission is graded and can no longer change"),
    ),
    params(
        ("course" = String, Path, description = "Course slug"),
        ("assignment" = Uuid, Path, description = "Assignment id"),
    ),
    tag = "v0/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn submit_assignment(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Extension(app_config): Extension<AppConfig>,
    Path((slug, assignment_id)): Path<(String, Uuid)>,
    multipart: Multipart,
) -> Result<impl IntoResponse, CourseError> {
    let (course, _) = load_course(&conn, &slug, &user).await?;
    let assignment = load_assignment(&conn, course.id, assignment_id).await?;
    let mut form = Form::read(multipart).await?;

    let slot = SubmissionSlot::open(&conn, course.id, assignment.id, user.id).await?;
    let status = if slot.is_resubmission() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };

    let file_path = match form.take_file("file") {
        Some(upload) => Some(
            app_config
                .media()
                .store(
                    MediaKind::Submission {
                        course_slug: &course.slug,
                        assignment_id: assignment.id,
                        username: &user.username,
                    },
                    &upload.file_name,
                    &upload.data,
                )
                .await?,
        ),
        None => None,
    };

    let submission = match slot.submit(&conn, form.take_text("text"), file_path.clone()).await {
        Ok(submission) => submission,
        Err(error) => {
            if let Some(file_path) = file_path {
                if let Err(error) = app_config.media().remove(&file_path).await {
                    tracing::warn!(error = &error as &dyn Error, %file_path, "failed to remove rejected upload");
                }
            }
            return Err(error.into());
        }
    };
    let grade = grade_db::Query::find_for_submission(&conn, submission.id).await?;

    Ok((
        status,
        Json(Submission::from_db_model(SubmissionParts {
            submission,
            student: &user,
            grade,
            due_date: assignment.due_date,
        })),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v0/courses/{course}/submissions/{submission}",
    responses(
        (status = OK, description = "Submission with its grade", body = Submission),
        (status = FORBIDDEN, description = "Caller neither owns the submission nor teaches the course"),
    ),
    params(
        ("course" = String, Path, description = "Course slug"),
        ("submission" = Uuid, Path, description = "Submission id"),
    ),
    tag = "v0/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn get_submission(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path((slug, submission_id)): Path<(String, Uuid)>,
) -> Result<impl IntoResponse, CourseError> {
    let (course, access) = load_course(&conn, &slug, &user).await?;
    let (submission, assignment) = load_submission(&conn, course.id, submission_id).await?;

    let student = if submission.student_id == user.id {
        user
    } else if access.is_instructor {
        user::Query::find_user_by_id(&conn, submission.student_id)
            .await?
            .ok_or(CourseError::NotFound)?
    } else {
        return Err(CourseError::Forbidden);
    };
    let grade = grade_db::Query::find_for_submission(&conn, submission.id).await?;

    Ok(Json(Submission::from_db_model(SubmissionParts {
        submission,
        student: &student,
        grade,
        due_date: assignment.due_date,
    })))
}

#[utoipa::path(
    post,
    path = "/api/v0/courses/{course}/submissions/{submission}/grade",
    request_body = GradeSubmission,
    responses(
        (status = OK, description = "Graded or returned submission", body = Submission),
        (status = BAD_REQUEST, description = "Points outside of the allowed range"),
        (status = FORBIDDEN, description = "Caller is not the instructor"),
    ),
    params(
        ("course" = String, Path, description = "Course slug"),
        ("submission" = Uuid, Path, description = "Submission id"),
    ),
    tag = "v0/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn grade(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path((slug, submission_id)): Path<(String, Uuid)>,
    Json(body): Json<GradeSubmission>,
) -> Result<impl IntoResponse, CourseError> {
    let course = load_taught_course(&conn, &slug, &user).await?;
    let (submission, assignment) = load_submission(&conn, course.id, submission_id).await?;
    let student = user::Query::find_user_by_id(&conn, submission.student_id)
        .await?
        .ok_or(CourseError::NotFound)?;

    let (submission, grade) = grade_submission(&conn, submission.id, &assignment, user.id, body).await?;
    tracing::info!(submission_id = %submission.id, status = ?submission.status, "graded submission");

    Ok(Json(Submission::from_db_model(SubmissionParts {
        submission,
        student: &student,
        grade: Some(grade),
        due_date: assignment.due_date,
    })))
}
