use chrono::{NaiveDate, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub description: String,
    pub instructor_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    #[must_use]
    pub fn is_ongoing_on(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }

    #[must_use]
    pub fn is_ongoing(&self) -> bool {
        self.is_ongoing_on(Utc::now().date_naive())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::user::Entity",
        from = "Column::InstructorId",
        to = "crate::user::Column::Id"
    )]
    Instructor,
    #[sea_orm(has_many = "super::module::Entity")]
    Module,
    #[sea_orm(has_many = "super::enrollment::Entity")]
    Enrollment,
    #[sea_orm(has_many = "crate::forum::forum::Entity")]
    Forum,
    #[sea_orm(has_one = "crate::assistant::assistant::Entity")]
    Assistant,
}

impl Related<crate::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Instructor.def()
    }
}

impl Related<super::module::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Module.def()
    }
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollment.def()
    }
}

impl Related<crate::forum::forum::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Forum.def()
    }
}

impl Related<crate::assistant::assistant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assistant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_ongoing_on() {
        let now = Utc::now().fixed_offset();
        let course = Model {
            id: Uuid::new_v4(),
            title: "Compilers".to_owned(),
            slug: "compilers".to_owned(),
            description: String::new(),
            instructor_id: Uuid::new_v4(),
            start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 7, 31).unwrap(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        assert!(course.is_ongoing_on(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()));
        assert!(course.is_ongoing_on(NaiveDate::from_ymd_opt(2025, 7, 31).unwrap()));
        assert!(!course.is_ongoing_on(NaiveDate::from_ymd_opt(2025, 8, 1).unwrap()));
        assert!(!course.is_ongoing_on(NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()));
    }
}
