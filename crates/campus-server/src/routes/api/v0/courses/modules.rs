use crate::AppConfig;
use crate::permissions::Permission;
use crate::routes::api::v0::courses::error::CourseError;
use crate::routes::api::v0::courses::{load_course_content, load_taught_course};
use crate::routes::upload::Form;
use crate::user::ExtractUser;
use axum::extract::{Multipart, Path};
use axum::response::IntoResponse;
use axum::routing::{Router, get, patch, post, put};
use axum::{Extension, Json};
use campus_db::course::content::{self as content_db, NewContent as NewContentRecord};
use campus_db::course::{assignment as assignment_db, module as module_db, submission as submission_db};
use campus_db::sea_orm::ActiveValue::{Set, Unchanged};
use campus_db::sea_orm::DatabaseConnection;
use campus_entity::course::content::{ActiveModel as ContentActiveModel, ContentType as ContentTypeModel, Model as ContentModel};
use campus_entity::course::module::{ActiveModel as ModuleActiveModel, Model as ModuleModel};
use campus_model::course::assignment::{Assignment, Submission};
use campus_model::course::content::{Content, NewContent, UpdateContent};
use campus_model::course::module::{Module, ModuleAssignment, ModuleDetail, NewModule, UpdateModule};
use campus_model::validation::Validate;
use campus_model_tools::convert::course::SubmissionParts;
use campus_model_tools::convert::{FromDbModel, IntoDbModel};
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
        .route("/{course}/modules", post(create_module))
        .route(
            "/{course}/modules/{module}",
            get(get_module).patch(update_module).delete(delete_module),
        )
        .route("/{course}/modules/{module}/contents", post(create_content))
        .route(
            "/{course}/modules/{module}/contents/{content}",
            patch(update_content).delete(delete_content),
        )
        .route("/{course}/modules/{module}/contents/{content}/file", put(upload_content_file))
        .with_state(())
}

async fn load_module(conn: &DatabaseConnection, course_id: Uuid, module_id: Uuid) -> Result<ModuleModel, CourseError> {
    module_db::Query::find_by_id(conn, module_id)
        .await?
        .filter(|module| module.course_id == course_id)
        .ok_or(CourseError::NotFound)
}

async fn load_content(conn: &DatabaseConnection, module_id: Uuid, content_id: Uuid) -> Result<ContentModel, CourseError> {
    content_db::Query::find_by_id(conn, content_id)
        .await?
        .filter(|content| content.module_id == module_id)
        .ok_or(CourseError::NotFound)
}

async fn remove_file(app_config: &AppConfig, key: &str) {
    if let Err(error) = app_config.media().remove(key).await {
        tracing::warn!(error = &error as &dyn Error, %key, "failed to remove stored file");
    }
}

#[utoipa::path(
    post,
    path = "/api/v0/courses/{course}/modules",
    request_body = NewModule,
    responses(
        (status = CREATED, description = "Created module", body = Module),
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
pub(crate) async fn create_module(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(slug): Path<String>,
    Json(body): Json<NewModule>,
) -> Result<impl IntoResponse, CourseError> {
    let course = load_taught_course(&conn, &slug, &user).await?;
    body.validate().map_err(CourseError::Validation)?;
    let position = match body.position {
        Some(position) => position,
        None => module_db::Query::next_position(&conn, course.id).await?,
    };
    let module = module_db::Mutation::create_module(&conn, course.id, body.title, body.description, position).await?;
    Ok((StatusCode::CREATED, Json(Module::from_db_model(module))))
}

#[utoipa::path(
    get,
    path = "/api/v0/courses/{course}/modules/{module}",
    responses(
        (status = OK, description = "Module with its contents and assignments", body = ModuleDetail),
        (status = FORBIDDEN, description = "Caller is neither instructor nor enrolled"),
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
pub(crate) async fn get_module(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path((slug, module_id)): Path<(String, Uuid)>,
) -> Result<impl IntoResponse, CourseError> {
    let (course, access) = load_course_content(&conn, &slug, &user).await?;
    let module = load_module(&conn, course.id, module_id).await?;
    let contents = content_db::Query::list_for_module(&conn, module.id).await?;

    let mut assignments = Vec::new();
    for assignment in assignment_db::Query::list_for_module(&conn, module.id).await? {
        let submission = if access.is_enrolled {
            submission_db::Query::find_for_student(&conn, assignment.id, user.id)
                .await?
                .map(|(submission, grade)| {
                    Submission::from_db_model(SubmissionParts {
                        submission,
                        student: &user,
                        grade,
                        due_date: assignment.due_date,
                    })
                })
        } else {
            None
        };
        assignments.push(ModuleAssignment {
            assignment: Assignment::from_db_model(assignment),
            submission,
        });
    }

    Ok(Json(ModuleDetail {
        module: Module::from_db_model(module),
        contents: contents.into_iter().map(Content::from_db_model).collect(),
        assignments,
    }))
}

#[utoipa::path(
    patch,
    path = "/api/v0/courses/{course}/modules/{module}",
    request_body = UpdateModule,
    responses(
        (status = OK, description = "Updated module", body = Module),
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
pub(crate) async fn update_module(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path((slug, module_id)): Path<(String, Uuid)>,
    Json(body): Json<UpdateModule>,
) -> Result<impl IntoResponse, CourseError> {
    let course = load_taught_course(&conn, &slug, &user).await?;
    let module = load_module(&conn, course.id, module_id).await?;
    body.validate().map_err(CourseError::Validation)?;

    let mut active = ModuleActiveModel {
        id: Unchanged(module.id),
        ..Default::default()
    };
    if let Some(title) = body.title {
        active.title = Set(title);
    }
    if let Some(description) = body.description {
        active.description = Set(description);
    }
    if let Some(position) = body.position {
        active.position = Set(position);
    }
    let module = module_db::Mutation::update_module(&conn, active).await?;
    Ok(Json(Module::from_db_model(module)))
}

#[utoipa::path(
    delete,
    path = "/api/v0/courses/{course}/modules/{module}",
    responses(
        (status = NO_CONTENT, description = "Module deleted with its contents and assignments"),
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
pub(crate) async fn delete_module(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path((slug, module_id)): Path<(String, Uuid)>,
) -> Result<impl IntoResponse, CourseError> {
    let course = load_taught_course(&conn, &slug, &user).await?;
    let module = load_module(&conn, course.id, module_id).await?;
    module_db::Mutation::delete_module(&conn, module.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v0/courses/{course}/modules/{module}/contents",
    request_body = NewContent,
    responses(
        (status = CREATED, description = "Created content item", body = Content),
        (status = BAD_REQUEST, description = "The field matching the content type is missing"),
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
pub(crate) async fn create_content(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path((slug, module_id)): Path<(String, Uuid)>,
    Json(body): Json<NewContent>,
) -> Result<impl IntoResponse, CourseError> {
    let course = load_taught_course(&conn, &slug, &user).await?;
    let module = load_module(&conn, course.id, module_id).await?;
    body.validate().map_err(CourseError::Validation)?;

    let position = match body.position {
        Some(position) => position,
        None => content_db::Query::list_for_module(&conn, module.id)
            .await?
            .iter()
            .map(|content| content.position + 1)
            .max()
            .unwrap_or(0),
    };
    let content = content_db::Mutation::create_content(
        &conn,
        module.id,
        NewContentRecord {
            title: body.title,
            position,
            content_type: body.content_type.into_db_model(),
            text: body.text,
            url: body.url,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(Content::from_db_model(content))))
}

#[utoipa::path(
    patch,
    path = "/api/v0/courses/{course}/modules/{module}/contents/{content}",
    request_body = UpdateContent,
    responses(
        (status = OK, description = "Updated content item", body = Content),
    ),
    params(
        ("course" = String, Path, description = "Course slug"),
        ("module" = Uuid, Path, description = "Module id"),
        ("content" = Uuid, Path, description = "Content id"),
    ),
    tag = "v0/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn update_content(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path((slug, module_id, content_id)): Path<(String, Uuid, Uuid)>,
    Json(body): Json<UpdateContent>,
) -> Result<impl IntoResponse, CourseError> {
    let course = load_taught_course(&conn, &slug, &user).await?;
    let module = load_module(&conn, course.id, module_id).await?;
    let content = load_content(&conn, module.id, content_id).await?;
    body.validate().map_err(CourseError::Validation)?;

    let mut active = ContentActiveModel {
        id: Unchanged(content.id),
        ..Default::default()
    };
    if let Some(title) = body.title {
        active.title = Set(title);
    }
    if let Some(position) = body.position {
        active.position = Set(position);
    }
    if let Some(text) = body.text {
        active.text = Set(Some(text));
    }
    if let Some(url) = body.url {
        active.url = Set(Some(url));
    }
    let content = content_db::Mutation::update_content(&conn, active).await?;
    Ok(Json(Content::from_db_model(content)))
}

#[utoipa::path(
    delete,
    path = "/api/v0/courses/{course}/modules/{module}/contents/{content}",
    responses(
        (status = NO_CONTENT, description = "Content item deleted"),
    ),
    params(
        ("course" = String, Path, description = "Course slug"),
        ("module" = Uuid, Path, description = "Module id"),
        ("content" = Uuid, Path, description = "Content id"),
    ),
    tag = "v0/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn delete_content(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Extension(app_config): Extension<AppConfig>,
    Path((slug, module_id, content_id)): Path<(String, Uuid, Uuid)>,
) -> Result<impl IntoResponse, CourseError> {
    let course = load_taught_course(&conn, &slug, &user).await?;
    let module = load_module(&conn, course.id, module_id).await?;
    let content = load_content(&conn, module.id, content_id).await?;
    content_db::Mutation::delete_content(&conn, content.id).await?;
    if let Some(file_path) = content.file_path {
        remove_file(&app_config, &file_path).await;
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub(crate) struct FileUpload {
    #[schema(format = Binary)]
    file: String,
}

#[utoipa::path(
    put,
    path = "/api/v0/courses/{course}/modules/{module}/contents/{content}/file",
    request_body(content = FileUpload, content_type = "multipart/form-data"),
    responses(
        (status = OK, description = "Content item with the stored file", body = Content),
        (status = BAD_REQUEST, description = "No file or not a file content"),
    ),
    params(
        ("course" = String, Path, description = "Course slug"),
        ("module" = Uuid, Path, description = "Module id"),
        ("content" = Uuid, Path, description = "Content id"),
    ),
    tag = "v0/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn upload_content_file(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Extension(app_config): Extension<AppConfig>,
    Path((slug, module_id, content_id)): Path<(String, Uuid, Uuid)>,
    multipart: Multipart,
) -> Result<impl IntoResponse, CourseError> {
    let course = load_taught_course(&conn, &slug, &user).await?;
    let module = load_module(&conn, course.id, module_id).await?;
    let content = load_content(&conn, module.id, content_id).await?;
    if content.content_type != ContentTypeModel::File {
        return Err(CourseError::NotAFileContent);
    }

    let mut form = Form::read(multipart).await?;
    let upload = form.take_file("file").ok_or(CourseError::MissingFile)?;
    let key = app_config
        .media()
        .store(
            MediaKind::Content {
                course_slug: &course.slug,
                module_id: module.id,
            },
            &upload.file_name,
            &upload.data,
        )
        .await?;
    let updated = content_db::Mutation::set_file_path(&conn, content.id, key.clone()).await?;

    if let Some(previous) = content.file_path.filter(|previous| *previous != key) {
        remove_file(&app_config, &previous).await;
    }
    Ok(Json(Content::from_db_model(updated)))
}
