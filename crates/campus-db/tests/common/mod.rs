pub mod user;

use sea_orm::{ConnectionTrait, DbConn, DbErr};

pub async fn setup_schema(db: &DbConn) -> Result<(), DbErr> {
    let migration = match db.get_database_backend() {
        sea_orm::DatabaseBackend::Sqlite => {
            include_str!("../../../campus-server/migrations/sqlite/2025-02-03-101500_create_campus/up.sql")
        }
        sea_orm::DatabaseBackend::Postgres => {
            include_str!("../../../campus-server/migrations/postgres/2025-02-03-101500_create_campus/up.sql")
        }
        #[allow(clippy::unimplemented)]
        sea_orm::DatabaseBackend::MySql => unimplemented!(),
    };

    db.execute_unprepared(migration).await?;
    Ok(())
}
