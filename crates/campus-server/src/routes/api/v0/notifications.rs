pub(crate) mod error;

use crate::permissions::Permission;
use crate::routes::api::v0::notifications::error::NotificationError;
use crate::user::ExtractUserId;
use axum::extract::{Path, Query};
use axum::response::IntoResponse;
use axum::routing::{Router, delete, get, post};
use axum::{Extension, Json};
use campus_db::notification;
use campus_db::sea_orm::DatabaseConnection;
use campus_model::messaging::UnreadCount;
use campus_model::notification::{Notification, NotificationFilter};
use campus_model_tools::convert::FromDbModel;
use http::StatusCode;
use protect_axum::protect;
use serde_derive::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_notifications))
        .route("/unread", get(unread_count))
        .route("/read-all", post(mark_all_read))
        .route("/{notification}", delete(delete_notification))
        .route("/{notification}/read", post(mark_read))
        .with_state(())
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct MarkedRead {
    updated: u64,
}

#[utoipa::path(
    get,
    path = "/api/v0/notifications",
    params(
        ("unread" = Option<bool>, Query, description = "Only unread notifications"),
    ),
    responses(
        (status = OK, description = "Notifications of the user, newest first", body = [Notification]),
    ),
    tag = "v0/notifications",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn list_notifications(
    ExtractUserId(user_id): ExtractUserId,
    Extension(conn): Extension<DatabaseConnection>,
    Query(filter): Query<NotificationFilter>,
) -> Result<impl IntoResponse, NotificationError> {
    let notifications = notification::Query::list_for_user(&conn, user_id, filter.unread).await?;
    Ok(Json(
        notifications
            .into_iter()
            .map(Notification::from_db_model)
            .collect::<Vec<_>>(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v0/notifications/unread",
    responses(
        (status = OK, description = "Number of unread notifications", body = UnreadCount),
    ),
    tag = "v0/notifications",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn unread_count(
    ExtractUserId(user_id): ExtractUserId,
    Extension(conn): Extension<DatabaseConnection>,
) -> Result<impl IntoResponse, NotificationError> {
    let count = notification::Query::unread_count(&conn, user_id).await?;
    Ok(Json(UnreadCount { count }))
}

#[utoipa::path(
    post,
    path = "/api/v0/notifications/{notification}/read",
    responses(
        (status = OK, description = "The notification, follow `related_link` to open what it is about", body = Notification),
        (status = NOT_FOUND, description = "No such notification of the user"),
    ),
    params(
        ("notification" = Uuid, Path, description = "Notification id"),
    ),
    tag = "v0/notifications",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn mark_read(
    ExtractUserId(user_id): ExtractUserId,
    Extension(conn): Extension<DatabaseConnection>,
    Path(notification_id): Path<Uuid>,
) -> Result<impl IntoResponse, NotificationError> {
    if !notification::Mutation::mark_read(&conn, user_id, notification_id).await? {
        return Err(NotificationError::NotFound);
    }
    let notification = notification::Query::find_by_id(&conn, notification_id)
        .await?
        .ok_or(NotificationError::NotFound)?;
    Ok(Json(Notification::from_db_model(notification)))
}

#[utoipa::path(
    post,
    path = "/api/v0/notifications/read-all",
    responses(
        (status = OK, description = "Every notification of the user is read", body = MarkedRead),
    ),
    tag = "v0/notifications",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn mark_all_read(
    ExtractUserId(user_id): ExtractUserId,
    Extension(conn): Extension<DatabaseConnection>,
) -> Result<impl IntoResponse, NotificationError> {
    let updated = notification::Mutation::mark_all_read(&conn, user_id).await?;
    Ok(Json(MarkedRead { updated }))
}

#[utoipa::path(
    delete,
    path = "/api/v0/notifications/{notification}",
    responses(
        (status = NO_CONTENT, description = "Notification deleted"),
        (status = NOT_FOUND, description = "No such notification of the user"),
    ),
    params(
        ("notification" = Uuid, Path, description = "Notification id"),
    ),
    tag = "v0/notifications",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn delete_notification(
    ExtractUserId(user_id): ExtractUserId,
    Extension(conn): Extension<DatabaseConnection>,
    Path(notification_id): Path<Uuid>,
) -> Result<impl IntoResponse, NotificationError> {
    if !notification::Mutation::delete_notification(&conn, user_id, notification_id).await? {
        return Err(NotificationError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
