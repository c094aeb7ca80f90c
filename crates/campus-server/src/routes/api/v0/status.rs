use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use campus_core::status::get_sea_orm_db_status;
use campus_model::status::Status;
use http::StatusCode;
use sea_orm::DatabaseConnection;
use serde_json::json;
use tracing::instrument;

pub fn create_router<S>() -> Router<S> {
    Router::new().route("/", get(get_status)).with_state(())
}

#[utoipa::path(
    get,
    path = "/api/v0/status",
    responses(
        (status = OK, description = "Server is ok", body = Status, example = json!({"database": "ok", "version": "0.4.0"})),
        (status = SERVICE_UNAVAILABLE, description = "The database does not answer", body = Status),
    ),
    tag = "util"
)]
#[instrument(skip_all)]
pub(crate) async fn get_status(Extension(conn): Extension<DatabaseConnection>) -> impl IntoResponse {
    let database = get_sea_orm_db_status(&conn, None).await;
    let status_code = if database.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let status = Status {
        database: database.into_message(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
    };
    (status_code, Json(status))
}
