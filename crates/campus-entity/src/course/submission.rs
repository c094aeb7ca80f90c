use sea_orm::entity::prelude::*;
use strum::AsRefStr;

#[derive(Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Clone, Copy, AsRefStr)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[strum(serialize_all = "snake_case")]
pub enum SubmissionStatus {
    #[sea_orm(string_value = "submitted")]
    Submitted,
    #[sea_orm(string_value = "graded")]
    Graded,
    #[sea_orm(string_value = "returned")]
    Returned,
}

impl SubmissionStatus {
    /// A graded submission is final until the instructor returns it.
    #[must_use]
    pub fn accepts_resubmission(self) -> bool {
        matches!(self, Self::Submitted | Self::Returned)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "submissions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub student_id: Uuid,
    pub text: Option<String>,
    pub file_path: Option<String>,
    pub status: SubmissionStatus,
    pub submitted_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    #[must_use]
    pub fn is_late(&self, due_date: Option<DateTimeWithTimeZone>) -> bool {
        due_date.is_some_and(|due_date| self.submitted_at > due_date)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assignment::Entity",
        from = "Column::AssignmentId",
        to = "super::assignment::Column::Id"
    )]
    Assignment,
    #[sea_orm(
        belongs_to = "crate::user::Entity",
        from = "Column::StudentId",
        to = "crate::user::Column::Id"
    )]
    Student,
    #[sea_orm(has_one = "super::grade::Entity")]
    Grade,
}

impl Related<super::assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignment.def()
    }
}

impl Related<crate::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::grade::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Grade.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_resubmission_states() {
        assert!(SubmissionStatus::Submitted.accepts_resubmission());
        assert!(SubmissionStatus::Returned.accepts_resubmission());
        assert!(!SubmissionStatus::Graded.accepts_resubmission());
    }

    #[test]
    fn test_is_late() {
        let now = Utc::now().fixed_offset();
        let submission = Model {
            id: Uuid::new_v4(),
            assignment_id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            text: Some("done".to_owned()),
            file_path: None,
            status: SubmissionStatus::Submitted,
            submitted_at: now,
            updated_at: now,
        };
        assert!(submission.is_late(Some(now - Duration::hours(1))));
        assert!(!submission.is_late(Some(now + Duration::hours(1))));
        assert!(!submission.is_late(None));
    }
}
