use crate::validation::{FieldErrors, Validate, max_length, require_text};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use url::Url;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ContentType {
    Text,
    File,
    Url,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Content {
    pub id: Uuid,
    pub module_id: Uuid,
    pub title: String,
    pub position: i32,
    pub content_type: ContentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// File contents are uploaded separately once the item exists.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewContent {
    pub title: String,
    pub position: Option<i32>,
    pub content_type: ContentType,
    pub text: Option<String>,
    pub url: Option<String>,
}

impl Validate for NewContent {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        require_text(&mut errors, "title", &self.title);
        max_length(&mut errors, "title", &self.title, 200);
        match self.content_type {
            ContentType::Text if self.text.as_deref().is_none_or(|text| text.trim().is_empty()) => {
                errors.add("text", "Text content is required.");
            }
            ContentType::Url => match &self.url {
                Some(url) => validate_url(&mut errors, url),
                None => errors.add("url", "A URL is required."),
            },
            _ => {}
        }
        errors.into_result()
    }
}

#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct UpdateContent {
    pub title: Option<String>,
    pub position: Option<i32>,
    pub text: Option<String>,
    pub url: Option<String>,
}

impl Validate for UpdateContent {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(title) = &self.title {
            require_text(&mut errors, "title", title);
        }
        if let Some(url) = &self.url {
            validate_url(&mut errors, url);
        }
        errors.into_result()
    }
}

fn validate_url(errors: &mut FieldErrors, url: &str) {
    match Url::parse(url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => errors.add("url", "Enter a valid URL."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_requires_matching_field() {
        let content = NewContent {
            title: "Slides".to_owned(),
            position: None,
            content_type: ContentType::Url,
            text: Some("ignored".to_owned()),
            url: None,
        };
        assert!(content.validate().unwrap_err().get("url").is_some());

        let content = NewContent {
            url: Some("ftp://example.org/slides".to_owned()),
            ..content
        };
        assert!(content.validate().is_err());

        let content = NewContent {
            url: Some("https://example.org/slides".to_owned()),
            ..content
        };
        assert!(content.validate().is_ok());

        let content = NewContent {
            content_type: ContentType::Text,
            text: None,
            ..content
        };
        assert!(content.validate().unwrap_err().get("text").is_some());
    }
}
