use crate::routes::error::{ErrorData, ErrorDataProvider, ErrorType, db_error_data, error_response};
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum NotificationError {
    #[error("Database error.")]
    SeaOrmError(#[from] DbErr),

    #[error("Notification not found")]
    NotFound,
}

impl ErrorDataProvider<ErrorType> for NotificationError {
    fn error_data(self) -> Option<ErrorData<ErrorType>> {
        match self {
            Self::SeaOrmError(error) => db_error_data(&error),
            Self::NotFound => Some(ErrorData::not_found()),
        }
    }
}

error_response!(NotificationError);
