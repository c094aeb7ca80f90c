use campus_model::status::ComponentStatus;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::Query;
use sea_orm::{ConnectionTrait, DatabaseConnection};
use std::error::Error;
use std::time::Duration;
use tokio::time::timeout;
use tracing::instrument;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs `SELECT CURRENT_TIMESTAMP` against the pool and reports whether it answered in time.
#[instrument(skip_all)]
pub async fn get_sea_orm_db_status(conn: &DatabaseConnection, duration: Option<Duration>) -> ComponentStatus {
    let mut query = Query::select();
    query.expr(Expr::current_timestamp());
    let statement = conn.get_database_backend().build(&query);

    match timeout(duration.unwrap_or(DEFAULT_TIMEOUT), conn.execute(statement)).await {
        Ok(Ok(_)) => ComponentStatus::Ok,
        Ok(Err(error)) => {
            tracing::error!(error = &error as &dyn Error, "db error during health check");
            ComponentStatus::Failed(None)
        }
        Err(_) => {
            tracing::error!("db health check timed out");
            ComponentStatus::failed_with("timeout")
        }
    }
}
