use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::openapi::{RefOr, Schema};
use utoipa::{PartialSchema, ToSchema, schema};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Status {
    pub database: Value,
    pub version: String,
}

/// Health of one backing component.
///
/// Serializes as `"ok"`, as `"error"` or as the failure detail when there is one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentStatus {
    Ok,
    Failed(Option<String>),
}

impl PartialSchema for ComponentStatus {
    fn schema() -> RefOr<Schema> {
        schema!(String).into()
    }
}

impl ToSchema for ComponentStatus {}

impl Serialize for ComponentStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Ok => serializer.serialize_str("ok"),
            Self::Failed(None) => serializer.serialize_str("error"),
            Self::Failed(Some(detail)) => serializer.serialize_str(detail),
        }
    }
}

impl ComponentStatus {
    #[must_use]
    pub fn failed_with(detail: &str) -> Self {
        Self::Failed(Some(detail.to_owned()))
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    #[must_use]
    pub fn into_message(self) -> Value {
        json!(self)
    }
}
