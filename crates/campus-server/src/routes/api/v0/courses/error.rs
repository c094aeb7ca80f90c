use crate::routes::error::{
    ErrorData, ErrorDataProvider, ErrorType, db_error_data, error_response, media_error_data, multipart_error_data,
};
use axum::extract::multipart::MultipartError;
use campus_core::enrollment::EnrollmentError;
use campus_core::grading::{GradingError, SubmissionError};
use campus_model::validation::FieldErrors;
use campus_utils::media::MediaError;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum CourseError {
    #[error("Database error.")]
    SeaOrmError(#[from] DbErr),

    #[error("Invalid input")]
    Validation(FieldErrors),

    #[error("Not found")]
    NotFound,

    #[error("Forbidden")]
    Forbidden,

    #[error("A course with that slug already exists")]
    SlugTaken,

    #[error("Only file contents take an upload")]
    NotAFileContent,

    #[error("No file uploaded")]
    MissingFile,

    #[error(transparent)]
    Enrollment(#[from] EnrollmentError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error(transparent)]
    Grading(#[from] GradingError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Conversion(#[from] campus_model_tools::error::Error),
}

impl ErrorDataProvider<ErrorType> for CourseError {
    fn error_data(self) -> Option<ErrorData<ErrorType>> {
        match self {
            Self::SeaOrmError(error) => db_error_data(&error),
            Self::Validation(errors) => Some(ErrorData::invalid(errors)),
            Self::NotFound => Some(ErrorData::not_found()),
            Self::Forbidden => Some(ErrorData::forbidden()),
            Self::SlugTaken => Some(ErrorData::with_field_errors(
                ErrorType::Conflict,
                "slug taken",
                FieldErrors::single("slug", "A course with this slug already exists."),
            )),
            Self::NotAFileContent => Some(ErrorData::new(
                ErrorType::InvalidInput,
                "files can only be uploaded to file contents",
            )),
            Self::MissingFile => Some(ErrorData::invalid(FieldErrors::single("file", "No file was submitted."))),
            Self::Enrollment(error) => match error {
                EnrollmentError::Db(error) => db_error_data(&error),
                EnrollmentError::NotAStudent => Some(ErrorData::new(ErrorType::Forbidden, error.to_string())),
                EnrollmentError::Inactive => Some(ErrorData::new(ErrorType::InvalidInput, error.to_string())),
            },
            Self::Submission(error) => match error {
                SubmissionError::Db(error) => db_error_data(&error),
                SubmissionError::NotEnrolled => Some(ErrorData::new(ErrorType::Forbidden, error.to_string())),
                SubmissionError::Locked => Some(ErrorData::new(ErrorType::Conflict, error.to_string())),
                SubmissionError::Empty => Some(ErrorData::invalid(FieldErrors::single(
                    "text",
                    "Provide a text or a file.",
                ))),
            },
            Self::Grading(error) => match error {
                GradingError::Db(error) => db_error_data(&error),
                GradingError::Validation(errors) => Some(ErrorData::invalid(errors)),
            },
            Self::Media(error) => media_error_data(&error),
            Self::Multipart(error) => Some(multipart_error_data(&error)),
            Self::Conversion(error) => {
                tracing::error!(error = &error as &dyn std::error::Error, "inconsistent course record");
                None
            }
        }
    }
}

error_response!(CourseError);
