use crate::routes::error::{ErrorData, ErrorDataProvider, ErrorType, db_error_data, error_response};
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum DashboardError {
    #[error("Database error.")]
    SeaOrmError(#[from] DbErr),
}

impl ErrorDataProvider<ErrorType> for DashboardError {
    fn error_data(self) -> Option<ErrorData<ErrorType>> {
        match self {
            Self::SeaOrmError(error) => db_error_data(&error),
        }
    }
}

error_response!(DashboardError);
