use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::response::{IntoResponse, Response};
use campus_db::util::UniqueViolation;
use campus_model::validation::FieldErrors;
use campus_utils::media::MediaError;
use sea_orm::DbErr;
use std::borrow::Cow;

use serde_derive::Serialize;
use serde_json::{Map, Value, json};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ErrorType {
    NotFound,
    Forbidden,
    InvalidInput,
    Conflict,
    VendorError,
    VendorUnavailable,
}

pub(crate) trait GetStatusCode {
    fn status_code(&self) -> http::StatusCode;
}

impl GetStatusCode for ErrorType {
    fn status_code(&self) -> http::StatusCode {
        match self {
            Self::NotFound => http::StatusCode::NOT_FOUND,
            Self::Forbidden => http::StatusCode::FORBIDDEN,
            Self::InvalidInput => http::StatusCode::BAD_REQUEST,
            Self::Conflict => http::StatusCode::CONFLICT,
            Self::VendorError => http::StatusCode::BAD_GATEWAY,
            Self::VendorUnavailable => http::StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ErrorData<T> {
    pub(crate) error: T,
    pub(crate) error_description: Cow<'static, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) data: Option<Map<String, Value>>,
}

impl<T> ErrorData<T> {
    pub fn new<A: Into<Cow<'static, str>>>(error: T, error_description: A) -> Self {
        Self {
            error,
            error_description: error_description.into(),
            data: None,
        }
    }
}

impl ErrorData<ErrorType> {
    /// Carries the problems per field in `data`.
    pub fn with_field_errors<A: Into<Cow<'static, str>>>(error: ErrorType, error_description: A, errors: FieldErrors) -> Self {
        Self {
            error,
            error_description: error_description.into(),
            data: Some(errors.into_inner().into_iter().map(|(field, messages)| (field, json!(messages))).collect()),
        }
    }

    pub fn invalid(errors: FieldErrors) -> Self {
        Self::with_field_errors(ErrorType::InvalidInput, "invalid input", errors)
    }

    pub fn not_found() -> Self {
        Self::new(ErrorType::NotFound, "not found")
    }

    pub fn forbidden() -> Self {
        Self::new(ErrorType::Forbidden, "you do not have permission to perform this action")
    }
}

pub(crate) trait ErrorDataProvider<T: GetStatusCode> {
    fn error_data(self) -> Option<ErrorData<T>>;
}

/// Missing rows become 404 and unique violations 409. Anything else is an internal error.
pub(crate) fn db_error_data(error: &DbErr) -> Option<ErrorData<ErrorType>> {
    if matches!(error, DbErr::RecordNotFound(_)) {
        return Some(ErrorData::not_found());
    }
    if error.is_unique_violation() {
        return Some(ErrorData::new(ErrorType::Conflict, "the record already exists"));
    }
    tracing::error!(error = error as &dyn std::error::Error, "database error");
    None
}

pub(crate) fn media_error_data(error: &MediaError) -> Option<ErrorData<ErrorType>> {
    match error {
        MediaError::Empty => Some(ErrorData::invalid(FieldErrors::single("file", "The submitted file is empty."))),
        MediaError::Io(error) => {
            tracing::error!(error = error as &dyn std::error::Error, "failed to store upload");
            None
        }
    }
}

pub(crate) fn multipart_error_data(error: &MultipartError) -> ErrorData<ErrorType> {
    ErrorData::new(ErrorType::InvalidInput, error.body_text())
}

pub(crate) fn error_to_axum_response<E, T>(error: T) -> Response
where
    E: GetStatusCode + serde::Serialize,
    T: GetStatusCode + ErrorDataProvider<E>,
{
    let status_code = GetStatusCode::status_code(&error);
    let error_data = error.error_data();
    match error_data {
        Some(data) => {
            let status_code = GetStatusCode::status_code(&data.error);
            let json = Json(data);
            (status_code, json).into_response()
        }
        None => status_code.into_response(),
    }
}

/// Implements the response conversion of a route error through its [`ErrorDataProvider`].
macro_rules! error_response {
    ($error:ty) => {
        impl crate::routes::error::GetStatusCode for $error {
            fn status_code(&self) -> http::StatusCode {
                http::StatusCode::INTERNAL_SERVER_ERROR
            }
        }

        impl axum::response::IntoResponse for $error {
            fn into_response(self) -> axum::response::Response {
                crate::routes::error::error_to_axum_response(self)
            }
        }
    };
}

pub(crate) use error_response;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_error_data() {
        let mut errors = FieldErrors::new();
        errors.add("title", "This field is required.");
        let data = ErrorData::invalid(errors);
        assert_eq!(data.error.status_code(), http::StatusCode::BAD_REQUEST);
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!({
                "error": "invalid_input",
                "error_description": "invalid input",
                "data": {"title": ["This field is required."]}
            })
        );
    }

    #[test]
    fn test_db_error_data() {
        let data = db_error_data(&DbErr::RecordNotFound("course".to_owned())).unwrap();
        assert_eq!(data.error, ErrorType::NotFound);
        assert!(db_error_data(&DbErr::Custom("boom".to_owned())).is_none());
    }
}
