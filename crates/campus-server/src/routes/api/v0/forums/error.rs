use crate::routes::error::{ErrorData, ErrorDataProvider, ErrorType, db_error_data, error_response};
use campus_core::forum::ForumError as TopicError;
use campus_model::validation::FieldErrors;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum ForumError {
    #[error("Database error.")]
    SeaOrmError(#[from] DbErr),

    #[error("Invalid input")]
    Validation(FieldErrors),

    #[error("Not found")]
    NotFound,

    #[error("Forbidden")]
    Forbidden,

    #[error(transparent)]
    Topic(#[from] TopicError),
}

impl ErrorDataProvider<ErrorType> for ForumError {
    fn error_data(self) -> Option<ErrorData<ErrorType>> {
        match self {
            Self::SeaOrmError(error) => db_error_data(&error),
            Self::Validation(errors) => Some(ErrorData::invalid(errors)),
            Self::NotFound => Some(ErrorData::not_found()),
            Self::Forbidden => Some(ErrorData::forbidden()),
            Self::Topic(error) => match error {
                TopicError::Db(error) => db_error_data(&error),
                TopicError::Closed => Some(ErrorData::new(ErrorType::Forbidden, error.to_string())),
                TopicError::FirstPost => Some(ErrorData::new(ErrorType::Conflict, error.to_string())),
            },
        }
    }
}

error_response!(ForumError);
