use crate::course::assignment::{Assignment, Submission};
use crate::course::content::Content;
use crate::validation::{FieldErrors, Validate, max_length, require_text};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Module {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModuleAssignment {
    #[serde(flatten)]
    pub assignment: Assignment,
    /// The caller's own submission. Always empty for instructors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission: Option<Submission>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModuleDetail {
    #[serde(flatten)]
    pub module: Module,
    pub contents: Vec<Content>,
    pub assignments: Vec<ModuleAssignment>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewModule {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Appended after the last module when missing.
    pub position: Option<i32>,
}

impl Validate for NewModule {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        require_text(&mut errors, "title", &self.title);
        max_length(&mut errors, "title", &self.title, 200);
        if self.position.is_some_and(|position| position < 0) {
            errors.add("position", "Ensure this value is greater than or equal to 0.");
        }
        errors.into_result()
    }
}

#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct UpdateModule {
    pub title: Option<String>,
    pub description: Option<String>,
    pub position: Option<i32>,
}

impl Validate for UpdateModule {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(title) = &self.title {
            require_text(&mut errors, "title", title);
            max_length(&mut errors, "title", title, 200);
        }
        if self.position.is_some_and(|position| position < 0) {
            errors.add("position", "Ensure this value is greater than or equal to 0.");
        }
        errors.into_result()
    }
}
