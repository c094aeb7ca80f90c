pub mod assignment;
pub mod content;
pub mod module;

use crate::course::module::Module;
use crate::user::PublicUser;
use crate::validation::{FieldErrors, Validate, max_length, require_text};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    #[schema(example = "intro-to-rust")]
    pub slug: String,
    pub description: String,
    pub instructor: PublicUser,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: bool,
    pub is_ongoing: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema)]
pub struct CourseList {
    pub teaching: Vec<Course>,
    pub enrolled: Vec<Course>,
    pub available: Vec<Course>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub student_count: u64,
    pub is_instructor: bool,
    pub is_enrolled: bool,
    pub has_assistant: bool,
    /// Only present for callers with access to the course content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modules: Option<Vec<Module>>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewCourse {
    pub title: String,
    /// Derived from the title when missing.
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Validate for NewCourse {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        require_text(&mut errors, "title", &self.title);
        max_length(&mut errors, "title", &self.title, 200);
        if let Some(slug) = &self.slug {
            validate_slug(&mut errors, slug);
        }
        validate_dates(&mut errors, self.start_date, self.end_date);
        errors.into_result()
    }
}

#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct UpdateCourse {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

impl UpdateCourse {
    /// Checks the fields on their own and against the dates already stored.
    pub fn validate_against(&self, start_date: NaiveDate, end_date: NaiveDate) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(title) = &self.title {
            require_text(&mut errors, "title", title);
            max_length(&mut errors, "title", title, 200);
        }
        validate_dates(
            &mut errors,
            self.start_date.unwrap_or(start_date),
            self.end_date.unwrap_or(end_date),
        );
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EnrollStudent {
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Enrollment {
    pub student: PublicUser,
    pub enrolled_at: DateTime<Utc>,
}

fn validate_slug(errors: &mut FieldErrors, slug: &str) {
    if slug.is_empty() || !slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
        errors.add("slug", "Enter a valid slug of lowercase letters, numbers and hyphens.");
    }
}

fn validate_dates(errors: &mut FieldErrors, start_date: NaiveDate, end_date: NaiveDate) {
    if end_date < start_date {
        errors.add("end_date", "End date cannot be before start date.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_course_validation() {
        let course = NewCourse {
            title: "Rust".to_owned(),
            slug: Some("Not A Slug".to_owned()),
            description: String::new(),
            start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        };
        let errors = course.validate().unwrap_err();
        assert!(errors.get("slug").is_some());
        assert!(errors.get("end_date").is_some());
        assert!(errors.get("title").is_none());
    }

    #[test]
    fn test_update_course_uses_stored_dates() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let update = UpdateCourse {
            end_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            ..Default::default()
        };
        assert!(update.validate_against(start, end).is_err());
        assert!(UpdateCourse::default().validate_against(start, end).is_ok());
    }
}
