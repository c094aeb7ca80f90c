pub(crate) mod api;
pub(crate) mod error;
pub(crate) mod swagger;
pub(crate) mod upload;
