pub(crate) mod assignments;
pub(crate) mod error;
pub(crate) mod modules;

use crate::permissions::Permission;
use crate::routes::api::v0::courses::error::CourseError;
use crate::user::ExtractUser;
use axum::extract::Path;
use axum::response::IntoResponse;
use axum::routing::{Router, delete, get, post};
use axum::{Extension, Json};
use campus_core::access::CourseAccess;
use campus_core::dashboard::courses_with_instructors;
use campus_core::enrollment;
use campus_db::assistant::assistant as assistant_db;
use campus_db::course::{course as course_db, enrollment as enrollment_db, module as module_db};
use campus_db::sea_orm::ActiveValue::{Set, Unchanged};
use campus_db::sea_orm::{ConnectionTrait, DatabaseConnection, DbErr};
use campus_db::user;
use campus_entity::course::course::{ActiveModel as CourseActiveModel, Model as CourseModel};
use campus_entity::course::enrollment::Model as EnrollmentModel;
use campus_entity::user::Model as UserModel;
use campus_model::course::module::Module;
use campus_model::course::{Course, CourseDetail, CourseList, EnrollStudent, Enrollment, NewCourse, UpdateCourse};
use campus_model::validation::Validate;
use campus_model_tools::convert::{FromDbModel, TryIntoModel};
use campus_utils::slug::{slugify_or, with_suffix};
use chrono::Utc;
use http::StatusCode;
use protect_axum::protect;
use uuid::Uuid;

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_courses).post(create_course))
        .route("/{course}", get(get_course).patch(update_course).delete(delete_course))
        .route("/{course}/enroll", post(enroll))
        .route("/{course}/unenroll", post(unenroll))
        .route("/{course}/students", get(list_students).post(add_student))
        .route("/{course}/students/{student}", delete(remove_student))
        .merge(modules::create_router())
        .merge(assignments::create_router())
        .with_state(())
}

/// Loads a course by slug together with the access the user has to it.
///
/// Courses the user may not see are reported as missing.
pub(crate) async fn load_course(
    conn: &DatabaseConnection,
    slug: &str,
    user: &UserModel,
) -> Result<(CourseModel, CourseAccess), CourseError> {
    let course = course_db::Query::find_by_slug(conn, slug)
        .await?
        .ok_or(CourseError::NotFound)?;
    let access = CourseAccess::load(conn, &course, user).await?;
    if !access.can_view(&course) {
        return Err(CourseError::NotFound);
    }
    Ok((course, access))
}

pub(crate) async fn load_course_content(
    conn: &DatabaseConnection,
    slug: &str,
    user: &UserModel,
) -> Result<(CourseModel, CourseAccess), CourseError> {
    let (course, access) = load_course(conn, slug, user).await?;
    if !access.can_read_content() {
        return Err(CourseError::Forbidden);
    }
    Ok((course, access))
}

pub(crate) async fn load_taught_course(
    conn: &DatabaseConnection,
    slug: &str,
    user: &UserModel,
) -> Result<CourseModel, CourseError> {
    let (course, access) = load_course(conn, slug, user).await?;
    if !access.can_edit() {
        return Err(CourseError::Forbidden);
    }
    Ok(course)
}

async fn unique_course_slug<C: ConnectionTrait>(conn: &C, title: &str) -> Result<String, DbErr> {
    let base = slugify_or(title, "course");
    let mut slug = base.clone();
    let mut n = 1;
    while course_db::Query::find_by_slug(conn, &slug).await?.is_some() {
        n += 1;
        slug = with_suffix(&base, n);
    }
    Ok(slug)
}

fn enrollment_model(enrollment: &EnrollmentModel, student: &UserModel) -> Enrollment {
    Enrollment {
        student: FromDbModel::from_db_model(student),
        enrolled_at: enrollment.enrolled_at.with_timezone(&Utc),
    }
}

#[utoipa::path(
    get,
    path = "/api/v0/courses",
    responses(
        (status = OK, description = "Courses taught by, attended by and open to the user", body = CourseList),
    ),
    tag = "v0/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn list_courses(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
) -> Result<impl IntoResponse, CourseError> {
    let teaching = course_db::Query::list_teaching(&conn, user.id).await?;
    let enrolled = course_db::Query::list_enrolled(&conn, user.id).await?;
    let available = course_db::Query::list_available(&conn, user.id).await?;

    Ok(Json(CourseList {
        teaching: courses_with_instructors(&conn, teaching).await?,
        enrolled: courses_with_instructors(&conn, enrolled).await?,
        available: courses_with_instructors(&conn, available).await?,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v0/courses",
    request_body = NewCourse,
    responses(
        (status = CREATED, description = "Created course, the caller is its instructor", body = Course),
        (status = BAD_REQUEST, description = "Invalid input"),
        (status = CONFLICT, description = "Slug already taken"),
    ),
    tag = "v0/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Teacher", ty = "Permission")]
pub(crate) async fn create_course(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Json(body): Json<NewCourse>,
) -> Result<impl IntoResponse, CourseError> {
    body.validate().map_err(CourseError::Validation)?;
    let slug = match body.slug {
        Some(slug) => {
            if course_db::Query::find_by_slug(&conn, &slug).await?.is_some() {
                return Err(CourseError::SlugTaken);
            }
            slug
        }
        None => unique_course_slug(&conn, &body.title).await?,
    };

    let course = course_db::Mutation::create_course(
        &conn,
        user.id,
        body.title,
        slug,
        body.description,
        (body.start_date, body.end_date),
    )
    .await?;
    tracing::info!(course_id = %course.id, slug = %course.slug, "created course");

    Ok((StatusCode::CREATED, Json(Course::from_db_model((course, &user)))))
}

#[utoipa::path(
    get,
    path = "/api/v0/courses/{course}",
    responses(
        (status = OK, description = "Course with the caller's relation to it", body = CourseDetail),
        (status = NOT_FOUND, description = "Unknown or inactive course"),
    ),
    params(
        ("course" = String, Path, description = "Course slug"),
    ),
    tag = "v0/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn get_course(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, CourseError> {
    let (course, access) = load_course(&conn, &slug, &user).await?;
    let student_count = course_db::Query::count_active_students(&conn, course.id).await?;
    let has_assistant = assistant_db::Query::find_by_course(&conn, course.id).await?.is_some();
    let modules = if access.can_read_content() {
        let modules = module_db::Query::list_for_course(&conn, course.id).await?;
        Some(modules.into_iter().map(Module::from_db_model).collect())
    } else {
        None
    };
    let instructor = user::Query::find_user_by_id(&conn, course.instructor_id).await?;

    Ok(Json(CourseDetail {
        course: (course, instructor).try_into_model()?,
        student_count,
        is_instructor: access.is_instructor,
        is_enrolled: access.is_enrolled,
        has_assistant,
        modules,
    }))
}

#[utoipa::path(
    patch,
    path = "/api/v0/courses/{course}",
    request_body = UpdateCourse,
    responses(
        (status = OK, description = "Updated course", body = Course),
        (status = BAD_REQUEST, description = "Invalid input"),
        (status = FORBIDDEN, description = "Caller is not the instructor"),
    ),
    params(
        ("course" = String, Path, description = "Course slug"),
    ),
    tag = "v0/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn update_course(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(slug): Path<String>,
    Json(body): Json<UpdateCourse>,
) -> Result<impl IntoResponse, CourseError> {
    let course = load_taught_course(&conn, &slug, &user).await?;
    body.validate_against(course.start_date, course.end_date)
        .map_err(CourseError::Validation)?;

    let mut active = CourseActiveModel {
        id: Unchanged(course.id),
        ..Default::default()
    };
    if let Some(title) = body.title {
        active.title = Set(title);
    }
    if let Some(description) = body.description {
        active.description = Set(description);
    }
    if let Some(start_date) = body.start_date {
        active.start_date = Set(start_date);
    }
    if let Some(end_date) = body.end_date {
        active.end_date = Set(end_date);
    }
    if let Some(is_active) = body.is_active {
        active.is_active = Set(is_active);
    }
    let course = course_db::Mutation::update_course(&conn, active).await?;
    Ok(Json(Course::from_db_model((course, &user))))
}

#[utoipa::path(
    delete,
    path = "/api/v0/courses/{course}",
    responses(
        (status = NO_CONTENT, description = "Course and everything in it deleted"),
        (status = FORBIDDEN, description = "Caller is not the instructor"),
    ),
    params(
        ("course" = String, Path, description = "Course slug"),
    ),
    tag = "v0/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn delete_course(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, CourseError> {
    let course = load_taught_course(&conn, &slug, &user).await?;
    course_db::Mutation::delete_course(&conn, course.id).await?;
    tracing::info!(course_id = %course.id, "deleted course");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v0/courses/{course}/enroll",
    responses(
        (status = OK, description = "Caller is enrolled, enrolling again reactivates", body = Enrollment),
        (status = FORBIDDEN, description = "Caller is not a student"),
    ),
    params(
        ("course" = String, Path, description = "Course slug"),
    ),
    tag = "v0/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn enroll(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, CourseError> {
    let (course, _) = load_course(&conn, &slug, &user).await?;
    let enrollment = enrollment::enroll_self(&conn, &course, &user).await?;
    Ok(Json(enrollment_model(&enrollment, &user)))
}

#[utoipa::path(
    post,
    path = "/api/v0/courses/{course}/unenroll",
    responses(
        (status = NO_CONTENT, description = "Enrollment ended"),
    ),
    params(
        ("course" = String, Path, description = "Course slug"),
    ),
    tag = "v0/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn unenroll(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, CourseError> {
    let (course, _) = load_course(&conn, &slug, &user).await?;
    enrollment::unenroll(&conn, &course, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v0/courses/{course}/students",
    responses(
        (status = OK, description = "Active enrollments of the course", body = [Enrollment]),
        (status = FORBIDDEN, description = "Caller is not the instructor"),
    ),
    params(
        ("course" = String, Path, description = "Course slug"),
    ),
    tag = "v0/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn list_students(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, CourseError> {
    let course = load_taught_course(&conn, &slug, &user).await?;
    let students = enrollment_db::Query::list_for_course(&conn, course.id).await?;
    Ok(Json(
        students
            .iter()
            .map(|(enrollment, student)| enrollment_model(enrollment, student))
            .collect::<Vec<_>>(),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v0/courses/{course}/students",
    request_body = EnrollStudent,
    responses(
        (status = CREATED, description = "Student enrolled", body = Enrollment),
        (status = NOT_FOUND, description = "Unknown user"),
        (status = FORBIDDEN, description = "Caller is not the instructor or the user is not a student"),
    ),
    params(
        ("course" = String, Path, description = "Course slug"),
    ),
    tag = "v0/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn add_student(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(slug): Path<String>,
    Json(body): Json<EnrollStudent>,
) -> Result<impl IntoResponse, CourseError> {
    let course = load_taught_course(&conn, &slug, &user).await?;
    let student = user::Query::find_by_username(&conn, &body.username)
        .await?
        .ok_or(CourseError::NotFound)?;
    let enrollment = enrollment::enroll(&conn, &course, &student).await?;
    Ok((StatusCode::CREATED, Json(enrollment_model(&enrollment, &student))))
}

#[utoipa::path(
    delete,
    path = "/api/v0/courses/{course}/students/{student}",
    responses(
        (status = NO_CONTENT, description = "Enrollment ended"),
        (status = NOT_FOUND, description = "The user is not enrolled"),
    ),
    params(
        ("course" = String, Path, description = "Course slug"),
        ("student" = Uuid, Path, description = "User id of the student"),
    ),
    tag = "v0/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn remove_student(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path((slug, student_id)): Path<(String, Uuid)>,
) -> Result<impl IntoResponse, CourseError> {
    let course = load_taught_course(&conn, &slug, &user).await?;
    if !enrollment::unenroll(&conn, &course, student_id).await? {
        return Err(CourseError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
