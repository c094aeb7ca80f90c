use crate::routes::error::{ErrorData, ErrorDataProvider, ErrorType, db_error_data, error_response};
use campus_core::messaging::MessagingError;
use campus_model::validation::FieldErrors;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum MessageError {
    #[error("Database error.")]
    SeaOrmError(#[from] DbErr),

    #[error("Invalid input")]
    Validation(FieldErrors),

    #[error("Not found")]
    NotFound,

    #[error(transparent)]
    Messaging(#[from] MessagingError),
}

impl ErrorDataProvider<ErrorType> for MessageError {
    fn error_data(self) -> Option<ErrorData<ErrorType>> {
        match self {
            Self::SeaOrmError(error) => db_error_data(&error),
            Self::Validation(errors) => Some(ErrorData::invalid(errors)),
            Self::NotFound => Some(ErrorData::not_found()),
            Self::Messaging(error) => match error {
                MessagingError::Db(error) => db_error_data(&error),
                MessagingError::NotParticipant | MessagingError::NotSender => {
                    Some(ErrorData::new(ErrorType::Forbidden, error.to_string()))
                }
                MessagingError::UnknownRecipient(_) => Some(ErrorData::invalid(FieldErrors::single(
                    "participants",
                    error.to_string(),
                ))),
            },
        }
    }
}

error_response!(MessageError);
