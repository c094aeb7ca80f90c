use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("related {0} record is missing")]
    MissingRelation(&'static str),
}
