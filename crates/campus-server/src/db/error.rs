use thiserror::Error;

/// Failures while applying the embedded schema migrations.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("migration failed: {0}")]
    Migration(String),

    #[error("could not open the database for migrating")]
    Connection(#[from] diesel::result::ConnectionError),

    #[error("no migrations for database backend {0:?}")]
    UnsupportedBackend(String),
}
