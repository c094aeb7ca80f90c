pub(crate) mod error;

use crate::permissions::Permission;
use crate::routes::api::v0::dashboard::error::DashboardError;
use crate::user::ExtractUser;
use axum::response::IntoResponse;
use axum::routing::{Router, get};
use axum::{Extension, Json};
use campus_core::dashboard;
use campus_db::sea_orm::DatabaseConnection;
use campus_model::dashboard::Dashboard;
use protect_axum::protect;

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/", get(get_dashboard)).with_state(())
}

#[utoipa::path(
    get,
    path = "/api/v0/dashboard",
    responses(
        (status = OK, description = "Study overview for students, teaching overview for everyone else", body = Dashboard),
    ),
    tag = "v0/dashboard",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn get_dashboard(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
) -> Result<impl IntoResponse, DashboardError> {
    Ok(Json(dashboard::load(&conn, &user).await?))
}
