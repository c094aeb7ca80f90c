use crate::routes::error::{ErrorData, ErrorDataProvider, ErrorType, db_error_data, error_response};
use campus_core::assistant::AssistantError as BridgeError;
use campus_model::validation::FieldErrors;
use sea_orm::DbErr;
use std::error::Error;
use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum AssistantError {
    #[error("Database error.")]
    SeaOrmError(#[from] DbErr),

    #[error("Invalid input")]
    Validation(FieldErrors),

    #[error("Not found")]
    NotFound,

    #[error("Forbidden")]
    Forbidden,

    #[error("No voice vendor configured")]
    VoiceUnavailable,

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

fn bridge_error_data(error: BridgeError) -> Option<ErrorData<ErrorType>> {
    match error {
        BridgeError::Db(error) => db_error_data(&error),
        BridgeError::Vendor(error) if error.is_not_found() => Some(ErrorData::not_found()),
        BridgeError::Vendor(error) => {
            tracing::error!(error = &error as &dyn Error, "voice vendor request failed");
            Some(ErrorData::new(ErrorType::VendorError, error.to_string()))
        }
        BridgeError::AlreadyExists | BridgeError::SessionConflict => Some(ErrorData::new(ErrorType::Conflict, error.to_string())),
        BridgeError::UnknownAgent | BridgeError::UnknownUser => Some(ErrorData::not_found()),
        BridgeError::InvalidToken => Some(ErrorData::forbidden()),
        BridgeError::Url(error) => {
            tracing::error!(error = &error as &dyn Error, "invalid webhook url");
            None
        }
    }
}

impl ErrorDataProvider<ErrorType> for AssistantError {
    fn error_data(self) -> Option<ErrorData<ErrorType>> {
        match self {
            Self::SeaOrmError(error) => db_error_data(&error),
            Self::Validation(errors) => Some(ErrorData::invalid(errors)),
            Self::NotFound => Some(ErrorData::not_found()),
            Self::Forbidden => Some(ErrorData::forbidden()),
            Self::VoiceUnavailable => Some(ErrorData::new(
                ErrorType::VendorUnavailable,
                "the voice assistant service is not configured",
            )),
            Self::Bridge(error) => bridge_error_data(error),
        }
    }
}

error_response!(AssistantError);
