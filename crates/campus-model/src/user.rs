use crate::validation::{FieldErrors, Validate, max_length, require_text};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    #[schema(example = "ada")]
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub date_joined: DateTime<Utc>,
}

/// What other users get to see about someone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub role: Role,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema)]
pub struct Profile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub office_hours: Option<String>,
    pub accept_terms: bool,
    pub accept_privacy: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicProfile {
    pub user: PublicUser,
    pub profile: Profile,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct Register {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub role: Role,
    pub accept_terms: bool,
    pub accept_privacy: bool,
}

/// Letters, digits and `.@+-_`, not made of dots alone since usernames name upload directories.
pub fn validate_username(errors: &mut FieldErrors, username: &str) {
    require_text(errors, "username", username);
    max_length(errors, "username", username, 150);
    let allowed = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '@' | '+' | '-' | '_'));
    if !allowed || (!username.is_empty() && username.chars().all(|c| c == '.')) {
        errors.add("username", "Enter a valid username.");
    }
}

impl Validate for Register {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        validate_username(&mut errors, &self.username);
        validate_email(&mut errors, &self.email);
        max_length(&mut errors, "first_name", &self.first_name, 150);
        max_length(&mut errors, "last_name", &self.last_name, 150);
        if self.role == Role::Admin {
            errors.add("role", "Select a valid choice.");
        }
        if !self.accept_terms {
            errors.add("accept_terms", "You must accept the terms and conditions.");
        }
        if !self.accept_privacy {
            errors.add("accept_privacy", "You must accept the privacy policy.");
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Registered {
    pub user: User,
    pub access_token: String,
}

#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct UpdateUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl Validate for UpdateUser {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(email) = &self.email {
            validate_email(&mut errors, email);
        }
        if let Some(first_name) = &self.first_name {
            max_length(&mut errors, "first_name", first_name, 150);
        }
        if let Some(last_name) = &self.last_name {
            max_length(&mut errors, "last_name", last_name, 150);
        }
        errors.into_result()
    }
}

/// Only the fields present are changed. The teaching fields are only accepted for teachers.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct UpdateProfile {
    pub bio: Option<String>,
    pub title: Option<String>,
    pub department: Option<String>,
    pub office_hours: Option<String>,
    pub accept_terms: Option<bool>,
    pub accept_privacy: Option<bool>,
}

impl UpdateProfile {
    #[must_use]
    pub fn touches_teacher_fields(&self) -> bool {
        self.title.is_some() || self.department.is_some() || self.office_hours.is_some()
    }
}

impl Validate for UpdateProfile {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(bio) = &self.bio {
            max_length(&mut errors, "bio", bio, 500);
        }
        if let Some(title) = &self.title {
            max_length(&mut errors, "title", title, 100);
        }
        if let Some(department) = &self.department {
            max_length(&mut errors, "department", department, 100);
        }
        if let Some(office_hours) = &self.office_hours {
            max_length(&mut errors, "office_hours", office_hours, 200);
        }
        errors.into_result()
    }
}

fn validate_email(errors: &mut FieldErrors, email: &str) {
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.starts_with('.'));
    if !valid {
        errors.add("email", "Enter a valid email address.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register() -> Register {
        Register {
            username: "ada".to_owned(),
            email: "ada@example.org".to_owned(),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            role: Role::Student,
            accept_terms: true,
            accept_privacy: true,
        }
    }

    #[test]
    fn test_register_validation() {
        assert!(register().validate().is_ok());

        let errors = Register {
            email: "nope".to_owned(),
            role: Role::Admin,
            accept_privacy: false,
            ..register()
        }
        .validate()
        .unwrap_err();
        assert!(errors.get("email").is_some());
        assert!(errors.get("role").is_some());
        assert!(errors.get("accept_privacy").is_some());
        assert!(errors.get("accept_terms").is_none());
    }

    #[test]
    fn test_username_may_not_be_only_dots() {
        for username in [".", "..", "..."] {
            let errors = Register {
                username: username.to_owned(),
                ..register()
            }
            .validate()
            .unwrap_err();
            assert!(errors.get("username").is_some(), "{username}");
        }
        let dotted = Register {
            username: "ada.lovelace".to_owned(),
            ..register()
        };
        assert!(dotted.validate().is_ok());
        let slashed = Register {
            username: "ada/..".to_owned(),
            ..register()
        };
        assert!(slashed.validate().is_err());
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::Teacher).unwrap(), r#""teacher""#);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::Student.to_string(), "student");
    }
}
