use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error(transparent)]
    Db(#[from] DbErr),

    #[error("Voice vendor error: {0}")]
    Vendor(#[from] campus_voice::Error),

    #[error("The course already has an assistant")]
    AlreadyExists,

    #[error("Assistant not found")]
    UnknownAgent,

    #[error("User not found")]
    UnknownUser,

    #[error("Session belongs to another assistant")]
    SessionConflict,

    #[error("Invalid webhook token")]
    InvalidToken,

    #[error("Invalid webhook url: {0}")]
    Url(#[from] url::ParseError),
}
