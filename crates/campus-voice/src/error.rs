use http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Reqwest client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Request middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    #[error("Vendor responded with status {status}: {body}")]
    StatusCode { status: StatusCode, body: String },

    #[error("Invalid vendor url: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// `true` if the vendor does not know the requested object.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::StatusCode { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}
