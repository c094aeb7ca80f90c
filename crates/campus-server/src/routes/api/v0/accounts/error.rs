use crate::routes::error::{
    ErrorData, ErrorDataProvider, ErrorType, db_error_data, error_response, media_error_data, multipart_error_data,
};
use axum::extract::multipart::MultipartError;
use campus_model::validation::FieldErrors;
use campus_utils::media::MediaError;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum AccountError {
    #[error("Database error.")]
    SeaOrmError(#[from] DbErr),

    #[error("Invalid input")]
    Validation(FieldErrors),

    #[error("A user with that username already exists")]
    UsernameTaken,

    #[error("User not found")]
    NotFound,

    #[error("No avatar uploaded")]
    MissingFile,

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Multipart(#[from] MultipartError),
}

impl ErrorDataProvider<ErrorType> for AccountError {
    fn error_data(self) -> Option<ErrorData<ErrorType>> {
        match self {
            Self::SeaOrmError(error) => db_error_data(&error),
            Self::Validation(errors) => Some(ErrorData::invalid(errors)),
            Self::UsernameTaken => Some(ErrorData::with_field_errors(
                ErrorType::Conflict,
                "username taken",
                FieldErrors::single("username", "A user with that username already exists."),
            )),
            Self::NotFound => Some(ErrorData::not_found()),
            Self::MissingFile => Some(ErrorData::invalid(FieldErrors::single("avatar", "No file was submitted."))),
            Self::Media(error) => media_error_data(&error),
            Self::Multipart(error) => Some(multipart_error_data(&error)),
        }
    }
}

error_response!(AccountError);
