use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{DbErr, SqlErr, TransactionError};
use std::error::Error;

pub trait FlattenTransactionResultExt<T> {
    fn flatten_res(self) -> T;
}

impl<T, E> FlattenTransactionResultExt<Result<T, E>> for Result<T, TransactionError<E>>
where
    E: From<DbErr> + Error,
{
    fn flatten_res(self) -> Result<T, E> {
        self.map_err(|err| match err {
            TransactionError::Connection(err) => err.into(),
            TransactionError::Transaction(err) => err,
        })
    }
}

pub trait RequireRecord<T> {
    fn require(self) -> Result<T, DbErr>;
}

impl<T> RequireRecord<T> for Result<Option<T>, DbErr> {
    fn require(self) -> Result<T, DbErr> {
        self?.ok_or_else(|| DbErr::RecordNotFound("record not found".to_string()))
    }
}

pub trait UniqueViolation {
    /// `true` if the statement failed on a unique constraint.
    fn is_unique_violation(&self) -> bool;
}

impl UniqueViolation for DbErr {
    fn is_unique_violation(&self) -> bool {
        matches!(self.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
    }
}

/// Timestamps are stored in UTC so they order the same way on every backend.
#[must_use]
pub fn now() -> DateTime<FixedOffset> {
    Utc::now().fixed_offset()
}

#[must_use]
pub fn to_utc(date: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    date.with_timezone(&Utc).fixed_offset()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require() {
        let found: Result<Option<u8>, DbErr> = Ok(Some(3));
        assert_eq!(found.require().unwrap(), 3);
        let missing: Result<Option<u8>, DbErr> = Ok(None);
        assert!(matches!(missing.require(), Err(DbErr::RecordNotFound(_))));
    }

    #[test]
    fn test_to_utc() {
        let date = DateTime::parse_from_rfc3339("2025-05-01T14:00:00+02:00").unwrap();
        let utc = to_utc(date);
        assert_eq!(utc, date);
        assert_eq!(utc.offset().local_minus_utc(), 0);
        assert_eq!(utc.to_rfc3339(), "2025-05-01T12:00:00+00:00");
    }
}
