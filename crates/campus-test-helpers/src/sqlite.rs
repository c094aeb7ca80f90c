use crate::TestDb;
use std::borrow::Cow;
use tempfile::TempDir;
use thiserror::Error;

/// A sqlite file in a temporary directory, removed on drop.
pub struct SqliteDb {
    // Kept so the directory lives as long as the database
    #[allow(dead_code)]
    temp_dir: TempDir,
    uri: String,
}

#[derive(Error, Debug)]
pub enum SqliteError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SqliteDb {
    pub fn new() -> Result<Self, SqliteError> {
        let temp_dir = TempDir::with_prefix("campus-sqlite-db")?;
        let path = temp_dir.path().join("db.sqlite");
        let path = path
            .to_str()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidData, "Invalid path"))?;
        let uri = format!("sqlite://{path}?mode=rwc");

        tracing::info!(?uri, "created sqlite test database");
        Ok(Self { temp_dir, uri })
    }
}

impl TestDb for SqliteDb {
    fn db_uri(&self) -> Cow<'_, str> {
        self.uri.as_str().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_uri() {
        let db = SqliteDb::new().unwrap();
        let uri = db.db_uri().into_owned();
        assert!(uri.starts_with("sqlite://"));
        assert!(uri.ends_with("db.sqlite?mode=rwc"));
    }

    #[test(tokio::test)]
    async fn test_connect() {
        let db = SqliteDb::new().unwrap();
        let conn = sea_orm::Database::connect(db.db_uri().as_ref()).await.unwrap();
        assert!(crate::util::table_names(&conn).await.unwrap().is_empty());
    }
}
