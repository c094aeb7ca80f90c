use sea_orm::{ConnectionTrait, DbErr, Statement};

/// Names of all user tables in a sqlite database, sorted.
pub async fn table_names<C: ConnectionTrait>(conn: &C) -> Result<Vec<String>, DbErr> {
    let rows = conn
        .query_all(Statement::from_string(
            conn.get_database_backend(),
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        ))
        .await?;
    rows.iter().map(|row| row.try_get::<String>("", "name")).collect()
}
