pub(crate) mod error;

use crate::AppConfig;
use crate::permissions::Permission;
use crate::routes::api::v0::accounts::error::AccountError;
use crate::routes::upload::Form;
use crate::user::{ExtractUser, ExtractUserId};
use axum::extract::{Multipart, Path};
use axum::response::IntoResponse;
use axum::routing::{Router, get, post, put};
use axum::{Extension, Json};
use campus_db::access_tokens;
use campus_db::sea_orm::ActiveValue::{Set, Unchanged};
use campus_db::sea_orm::DatabaseConnection;
use campus_db::user::{self, NewUser};
use campus_db::util::RequireRecord;
use campus_entity::profile;
use campus_entity::user::{ActiveModel as UserActiveModel, Role};
use campus_model::user::{Profile, PublicProfile, PublicUser, Register, Registered, UpdateProfile, UpdateUser, User};
use campus_model::validation::{FieldErrors, Validate};
use campus_model_tools::convert::{FromDbModel, IntoDbModel};
use campus_utils::media::MediaKind;
use http::StatusCode;
use protect_axum::protect;
use std::error::Error;
use utoipa::ToSchema;

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/register", post(register))
        .route("/logout", post(logout))
        .route("/me", get(get_me).patch(update_me))
        .route("/me/profile", get(get_profile).patch(update_profile))
        .route("/me/avatar", put(upload_avatar))
        .route("/users/{username}", get(get_public_profile))
        .with_state(())
}

#[utoipa::path(
    post,
    path = "/api/v0/accounts/register",
    request_body = Register,
    responses(
        (status = CREATED, description = "Account created, the token authenticates further requests", body = Registered),
        (status = BAD_REQUEST, description = "Invalid input"),
        (status = CONFLICT, description = "Username or email already taken"),
    ),
    tag = "v0/accounts"
)]
pub(crate) async fn register(
    Extension(conn): Extension<DatabaseConnection>,
    Json(body): Json<Register>,
) -> Result<impl IntoResponse, AccountError> {
    body.validate().map_err(AccountError::Validation)?;
    if user::Query::find_by_username(&conn, &body.username).await?.is_some() {
        return Err(AccountError::UsernameTaken);
    }

    let (created, _) = user::Mutation::create_user(
        &conn,
        NewUser {
            username: body.username,
            email: body.email,
            first_name: body.first_name,
            last_name: body.last_name,
            role: body.role.into_db_model(),
            accept_terms: body.accept_terms,
            accept_privacy: body.accept_privacy,
        },
    )
    .await?;
    let token = access_tokens::Mutation::create_access_token(&conn, created.id).await?;
    tracing::info!(user_id = %created.id, "registered user");

    Ok((
        StatusCode::CREATED,
        Json(Registered {
            user: User::from_db_model(created),
            access_token: token.access_token,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v0/accounts/logout",
    responses(
        (status = NO_CONTENT, description = "Access token revoked"),
    ),
    tag = "v0/accounts",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn logout(
    ExtractUserId(user_id): ExtractUserId,
    Extension(conn): Extension<DatabaseConnection>,
) -> Result<impl IntoResponse, AccountError> {
    access_tokens::Mutation::delete_access_token(&conn, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v0/accounts/me",
    responses(
        (status = OK, description = "The signed in account", body = User),
    ),
    tag = "v0/accounts",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn get_me(ExtractUser(user): ExtractUser) -> impl IntoResponse {
    Json(User::from_db_model(user))
}

#[utoipa::path(
    patch,
    path = "/api/v0/accounts/me",
    request_body = UpdateUser,
    responses(
        (status = OK, description = "Updated account", body = User),
        (status = BAD_REQUEST, description = "Invalid input"),
        (status = CONFLICT, description = "Email already taken"),
    ),
    tag = "v0/accounts",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn update_me(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Json(body): Json<UpdateUser>,
) -> Result<impl IntoResponse, AccountError> {
    body.validate().map_err(AccountError::Validation)?;
    let mut active = UserActiveModel {
        id: Unchanged(user.id),
        ..Default::default()
    };
    if let Some(first_name) = body.first_name {
        active.first_name = Set(first_name);
    }
    if let Some(last_name) = body.last_name {
        active.last_name = Set(last_name);
    }
    if let Some(email) = body.email {
        active.email = Set(email);
    }
    let updated = user::Mutation::update_user(&conn, active).await?;
    Ok(Json(User::from_db_model(updated)))
}

#[utoipa::path(
    get,
    path = "/api/v0/accounts/me/profile",
    responses(
        (status = OK, description = "Profile of the signed in account", body = Profile),
    ),
    tag = "v0/accounts",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn get_profile(
    ExtractUserId(user_id): ExtractUserId,
    Extension(conn): Extension<DatabaseConnection>,
) -> Result<impl IntoResponse, AccountError> {
    let profile = user::Query::find_profile(&conn, user_id).await.require()?;
    Ok(Json(Profile::from_db_model(profile)))
}

#[utoipa::path(
    patch,
    path = "/api/v0/accounts/me/profile",
    request_body = UpdateProfile,
    responses(
        (status = OK, description = "Updated profile", body = Profile),
        (status = BAD_REQUEST, description = "Invalid input or teaching fields set by a non teacher"),
    ),
    tag = "v0/accounts",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn update_profile(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Json(body): Json<UpdateProfile>,
) -> Result<impl IntoResponse, AccountError> {
    body.validate().map_err(AccountError::Validation)?;
    if body.touches_teacher_fields() && user.role != Role::Teacher {
        let mut errors = FieldErrors::new();
        for (field, present) in [
            ("title", body.title.is_some()),
            ("department", body.department.is_some()),
            ("office_hours", body.office_hours.is_some()),
        ] {
            if present {
                errors.add(field, "Only teachers can set this field.");
            }
        }
        return Err(AccountError::Validation(errors));
    }

    let mut active = profile::ActiveModel {
        user_id: Unchanged(user.id),
        ..Default::default()
    };
    if let Some(bio) = body.bio {
        active.bio = Set(Some(bio));
    }
    if let Some(title) = body.title {
        active.title = Set(Some(title));
    }
    if let Some(department) = body.department {
        active.department = Set(Some(department));
    }
    if let Some(office_hours) = body.office_hours {
        active.office_hours = Set(Some(office_hours));
    }
    if let Some(accept_terms) = body.accept_terms {
        active.accept_terms = Set(accept_terms);
    }
    if let Some(accept_privacy) = body.accept_privacy {
        active.accept_privacy = Set(accept_privacy);
    }
    let profile = user::Mutation::update_profile(&conn, active).await?;
    Ok(Json(Profile::from_db_model(profile)))
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub(crate) struct AvatarUpload {
    #[schema(format = Binary)]
    avatar: String,
}

#[utoipa::path(
    put,
    path = "/api/v0/accounts/me/avatar",
    request_body(content = AvatarUpload, content_type = "multipart/form-data"),
    responses(
        (status = OK, description = "Profile with the new avatar", body = Profile),
        (status = BAD_REQUEST, description = "No file in the `avatar` field"),
    ),
    tag = "v0/accounts",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn upload_avatar(
    ExtractUserId(user_id): ExtractUserId,
    Extension(conn): Extension<DatabaseConnection>,
    Extension(app_config): Extension<AppConfig>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AccountError> {
    let mut form = Form::read(multipart).await?;
    let upload = form.take_file("avatar").ok_or(AccountError::MissingFile)?;

    let previous = user::Query::find_profile(&conn, user_id).await.require()?.avatar;
    let key = app_config
        .media()
        .store(MediaKind::Avatar { user_id }, &upload.file_name, &upload.data)
        .await?;
    let profile = user::Mutation::update_profile_avatar(&conn, user_id, Some(key.clone())).await?;

    if let Some(previous) = previous.filter(|previous| *previous != key) {
        if let Err(error) = app_config.media().remove(&previous).await {
            tracing::warn!(error = &error as &dyn Error, %previous, "failed to remove old avatar");
        }
    }
    Ok(Json(Profile::from_db_model(profile)))
}

#[utoipa::path(
    get,
    path = "/api/v0/accounts/users/{username}",
    responses(
        (status = OK, description = "Public profile of a user", body = PublicProfile),
        (status = NOT_FOUND, description = "Unknown user"),
    ),
    params(
        ("username" = String, Path, description = "Username"),
    ),
    tag = "v0/accounts",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn get_public_profile(
    Path(username): Path<String>,
    Extension(conn): Extension<DatabaseConnection>,
) -> Result<impl IntoResponse, AccountError> {
    let (found, profile) = user::Query::find_user_with_profile(&conn, &username)
        .await?
        .ok_or(AccountError::NotFound)?;
    Ok(Json(PublicProfile {
        user: PublicUser::from_db_model(&found),
        profile: profile.map(Profile::from_db_model).unwrap_or_default(),
    }))
}
