use crate::user::PublicUser;
use crate::validation::{FieldErrors, Validate, max_length, require_text};
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Assignment {
    pub id: Uuid,
    pub module_id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub points: i32,
    pub is_past_due: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewAssignment {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_date: Option<DateTime<FixedOffset>>,
    #[serde(default = "default_points")]
    pub points: i32,
}

fn default_points() -> i32 {
    100
}

impl Validate for NewAssignment {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        require_text(&mut errors, "title", &self.title);
        max_length(&mut errors, "title", &self.title, 200);
        validate_points(&mut errors, self.points);
        errors.into_result()
    }
}

#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct UpdateAssignment {
    pub title: Option<String>,
    pub description: Option<String>,
    /// `null` removes the due date.
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, format = DateTime, nullable)]
    pub due_date: Option<Option<DateTime<FixedOffset>>>,
    pub points: Option<i32>,
}

impl Validate for UpdateAssignment {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(title) = &self.title {
            require_text(&mut errors, "title", title);
        }
        if let Some(points) = self.points {
            validate_points(&mut errors, points);
        }
        errors.into_result()
    }
}

fn validate_points(errors: &mut FieldErrors, points: i32) {
    if points <= 0 {
        errors.add("points", "Ensure this value is greater than 0.");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SubmissionStatus {
    Submitted,
    Graded,
    Returned,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Grade {
    pub points: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    pub grader_id: Uuid,
    pub graded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Submission {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub student: PublicUser,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    pub status: SubmissionStatus,
    pub submitted_at: DateTime<Utc>,
    pub is_late: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<Grade>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssignmentDetail {
    #[serde(flatten)]
    pub assignment: Assignment,
    /// The caller's own submission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission: Option<Submission>,
    /// Every submission, instructors only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submissions: Option<Vec<Submission>>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GradeSubmission {
    pub points: f64,
    pub feedback: Option<String>,
    /// Hands the submission back to the student instead of finalizing it.
    #[serde(default)]
    pub return_for_revision: bool,
}

impl GradeSubmission {
    /// Points must lie within `[0, max_points]`.
    pub fn validate_against(&self, max_points: i32) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if !self.points.is_finite() || self.points < 0.0 {
            errors.add("points", "Ensure this value is greater than or equal to 0.");
        } else if self.points > f64::from(max_points) {
            errors.add("points", format!("Ensure this value is less than or equal to {max_points}."));
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_bounds() {
        let grade = |points| GradeSubmission {
            points,
            feedback: None,
            return_for_revision: false,
        };
        assert!(grade(0.0).validate_against(10).is_ok());
        assert!(grade(10.0).validate_against(10).is_ok());
        assert!(grade(10.5).validate_against(10).is_err());
        assert!(grade(-1.0).validate_against(10).is_err());
        assert!(grade(f64::NAN).validate_against(10).is_err());
    }

    #[test]
    fn test_new_assignment_defaults() {
        let assignment: NewAssignment = serde_json::from_str(r#"{"title":"Essay"}"#).unwrap();
        assert_eq!(assignment.points, 100);
        assert!(assignment.due_date.is_none());
        assert!(assignment.validate().is_ok());
    }

    #[test]
    fn test_update_clears_due_date() {
        let update: UpdateAssignment = serde_json::from_str(r#"{"title":"Essay"}"#).unwrap();
        assert_eq!(update.due_date, None);

        let update: UpdateAssignment = serde_json::from_str(r#"{"due_date":null}"#).unwrap();
        assert_eq!(update.due_date, Some(None));

        let update: UpdateAssignment = serde_json::from_str(r#"{"due_date":"2026-03-01T12:00:00+01:00"}"#).unwrap();
        assert!(matches!(update.due_date, Some(Some(_))));
    }
}
