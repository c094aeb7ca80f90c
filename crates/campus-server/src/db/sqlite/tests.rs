use super::MIGRATIONS;

use crate::db::error::DbError;
use diesel::migration::MigrationVersion;
use diesel::prelude::*;
use diesel::sql_query;
use diesel_migrations::MigrationHarness;

use campus_test_helpers::{SqliteDb, TestDb};

use crate::db;
use test_log::test;
use url::Url;

pub(crate) fn revert_all_migrations(conn: &'_ mut SqliteConnection) -> Result<Vec<MigrationVersion<'_>>, DbError> {
    tracing::debug!("reverting all migrations");
    conn.revert_all_migrations(MIGRATIONS)
        .map_err(|err| DbError::Migration(format!("{err}")))
}

#[test]
fn test_migrations() {
    let db = SqliteDb::new().unwrap();
    let db_uri = db.db_uri();
    let db_uri = db_uri.as_ref();
    let mut conn = SqliteConnection::establish(db_uri).unwrap();
    // Twice, so reverting leaves nothing behind that breaks the next run
    for _ in 0..2 {
        let migrations = db::run_migrations(&mut conn, MIGRATIONS).unwrap();
        assert!(!migrations.is_empty());

        let mut conn = SqliteConnection::establish(db_uri).unwrap();
        let query = sql_query("SELECT id FROM users WHERE username = 'test'");
        query.clone().execute(&mut conn).unwrap();
        sql_query("SELECT id FROM ai_assistant_messages").execute(&mut conn).unwrap();

        let mut reverted_migrations = revert_all_migrations(&mut conn).unwrap();
        reverted_migrations.reverse();
        assert_eq!(migrations, reverted_migrations);

        query.execute(&mut conn).unwrap_err();
    }
}

#[test(tokio::test)]
async fn test_migration_by_url() {
    let db = SqliteDb::new().unwrap();
    let url = Url::parse(&db.db_uri()).unwrap();
    let applied = db::migration(&url).await.unwrap();
    assert_eq!(applied.len(), 1);
    assert!(db::migration(&url).await.unwrap().is_empty());

    let unknown = Url::parse("mysql://localhost/campus").unwrap();
    assert!(matches!(
        db::migration(&unknown).await,
        Err(DbError::UnsupportedBackend(db_type)) if db_type == "mysql"
    ));
}
