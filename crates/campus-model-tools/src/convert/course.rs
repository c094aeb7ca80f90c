use crate::convert::{FromDbModel, FromModel, TryFromDbModel, utc};
use crate::error::Error;
use campus_entity::course::assignment::Model as AssignmentModel;
use campus_entity::course::content::{ContentType as ContentTypeModel, Model as ContentModel};
use campus_entity::course::course::Model as CourseModel;
use campus_entity::course::grade::Model as GradeModel;
use campus_entity::course::module::Model as ModuleModel;
use campus_entity::course::submission::{Model as SubmissionModel, SubmissionStatus as SubmissionStatusModel};
use campus_entity::user::Model as UserModel;
use campus_model::course::Course;
use campus_model::course::assignment::{Assignment, Grade, Submission, SubmissionStatus};
use campus_model::course::content::{Content, ContentType};
use campus_model::course::module::Module;

impl FromDbModel<(CourseModel, &UserModel)> for Course {
    fn from_db_model((model, instructor): (CourseModel, &UserModel)) -> Self {
        Self {
            is_ongoing: model.is_ongoing(),
            id: model.id,
            title: model.title,
            slug: model.slug,
            description: model.description,
            instructor: FromDbModel::from_db_model(instructor),
            start_date: model.start_date,
            end_date: model.end_date,
            is_active: model.is_active,
            created_at: utc(model.created_at),
        }
    }
}

impl TryFromDbModel<(CourseModel, Option<UserModel>)> for Course {
    type Error = Error;

    fn try_from_db_model((model, instructor): (CourseModel, Option<UserModel>)) -> Result<Self, Self::Error> {
        let instructor = instructor.ok_or(Error::MissingRelation("instructor"))?;
        Ok(Self::from_db_model((model, &instructor)))
    }
}

impl FromDbModel<ModuleModel> for Module {
    fn from_db_model(model: ModuleModel) -> Self {
        Self {
            id: model.id,
            course_id: model.course_id,
            title: model.title,
            description: model.description,
            position: model.position,
            created_at: utc(model.created_at),
        }
    }
}

impl FromDbModel<ContentTypeModel> for ContentType {
    fn from_db_model(model: ContentTypeModel) -> Self {
        match model {
            ContentTypeModel::Text => Self::Text,
            ContentTypeModel::File => Self::File,
            ContentTypeModel::Url => Self::Url,
        }
    }
}

impl FromModel<ContentType> for ContentTypeModel {
    fn from_model(model: ContentType) -> Self {
        match model {
            ContentType::Text => Self::Text,
            ContentType::File => Self::File,
            ContentType::Url => Self::Url,
        }
    }
}

impl FromDbModel<ContentModel> for Content {
    fn from_db_model(model: ContentModel) -> Self {
        Self {
            id: model.id,
            module_id: model.module_id,
            title: model.title,
            position: model.position,
            content_type: FromDbModel::from_db_model(model.content_type),
            text: model.text,
            file_path: model.file_path,
            url: model.url,
            created_at: utc(model.created_at),
        }
    }
}

impl FromDbModel<AssignmentModel> for Assignment {
    fn from_db_model(model: AssignmentModel) -> Self {
        Self {
            is_past_due: model.is_past_due(),
            id: model.id,
            module_id: model.module_id,
            title: model.title,
            description: model.description,
            due_date: model.due_date.map(utc),
            points: model.points,
        }
    }
}

impl FromDbModel<SubmissionStatusModel> for SubmissionStatus {
    fn from_db_model(model: SubmissionStatusModel) -> Self {
        match model {
            SubmissionStatusModel::Submitted => Self::Submitted,
            SubmissionStatusModel::Graded => Self::Graded,
            SubmissionStatusModel::Returned => Self::Returned,
        }
    }
}

impl FromDbModel<GradeModel> for Grade {
    fn from_db_model(model: GradeModel) -> Self {
        Self {
            points: model.points,
            feedback: model.feedback,
            grader_id: model.grader_id,
            graded_at: utc(model.graded_at),
        }
    }
}

/// A submission together with its student, its grade and the due date of the assignment.
pub struct SubmissionParts<'a> {
    pub submission: SubmissionModel,
    pub student: &'a UserModel,
    pub grade: Option<GradeModel>,
    pub due_date: Option<chrono::DateTime<chrono::FixedOffset>>,
}

impl FromDbModel<SubmissionParts<'_>> for Submission {
    fn from_db_model(parts: SubmissionParts<'_>) -> Self {
        let SubmissionParts {
            submission,
            student,
            grade,
            due_date,
        } = parts;
        Self {
            is_late: submission.is_late(due_date),
            id: submission.id,
            assignment_id: submission.assignment_id,
            student: FromDbModel::from_db_model(student),
            text: submission.text,
            file_path: submission.file_path,
            status: FromDbModel::from_db_model(submission.status),
            submitted_at: utc(submission.submitted_at),
            grade: grade.map(FromDbModel::from_db_model),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{IntoModel, TryIntoModel};
    use campus_entity::user::Role;
    use chrono::{Duration, NaiveDate, Utc};
    use uuid::Uuid;

    fn instructor() -> UserModel {
        UserModel {
            id: Uuid::new_v4(),
            username: "teach".to_owned(),
            email: "teach@example.org".to_owned(),
            first_name: String::new(),
            last_name: String::new(),
            role: Role::Teacher,
            is_active: true,
            date_joined: Utc::now().fixed_offset(),
        }
    }

    #[test]
    fn test_course_requires_instructor() {
        let now = Utc::now().fixed_offset();
        let course = CourseModel {
            id: Uuid::new_v4(),
            title: "Rust".to_owned(),
            slug: "rust".to_owned(),
            description: String::new(),
            instructor_id: Uuid::new_v4(),
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2020, 6, 1).unwrap(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let missing: Result<Course, _> = (course.clone(), None).try_into_model();
        assert!(matches!(missing, Err(Error::MissingRelation("instructor"))));

        let converted: Course = (course, Some(instructor())).try_into_model().unwrap();
        assert!(!converted.is_ongoing);
        assert_eq!(converted.instructor.display_name, "teach");
    }

    #[test]
    fn test_late_submission() {
        let now = Utc::now().fixed_offset();
        let student = instructor();
        let submission = SubmissionModel {
            id: Uuid::new_v4(),
            assignment_id: Uuid::new_v4(),
            student_id: student.id,
            text: None,
            file_path: Some("submissions/rust/a/teach/x.pdf".to_owned()),
            status: SubmissionStatusModel::Returned,
            submitted_at: now,
            updated_at: now,
        };
        let converted: Submission = SubmissionParts {
            submission,
            student: &student,
            grade: None,
            due_date: Some(now - Duration::minutes(5)),
        }
        .into_model();
        assert!(converted.is_late);
        assert_eq!(converted.status, SubmissionStatus::Returned);
    }
}
