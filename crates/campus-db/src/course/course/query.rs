use campus_entity::course::course::{Column, Entity, Model};
use campus_entity::course::enrollment::{Column as EnrollmentColumn, Entity as Enrollment};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use std::error::Error;
use uuid::Uuid;

pub struct Query;

impl Query {
    pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(id).one(conn).await.inspect_err(|error| {
            tracing::error!(error = error as &dyn Error, "error loading course");
        })
    }

    pub async fn find_by_slug<C: ConnectionTrait>(conn: &C, slug: &str) -> Result<Option<Model>, DbErr> {
        Entity::find().filter(Column::Slug.eq(slug)).one(conn).await
    }

    pub async fn list_teaching<C: ConnectionTrait>(conn: &C, instructor_id: Uuid) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::InstructorId.eq(instructor_id))
            .order_by_desc(Column::StartDate)
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "error loading taught courses");
            })
    }

    /// Active courses the student holds an active enrollment in.
    pub async fn list_enrolled<C: ConnectionTrait>(conn: &C, student_id: Uuid) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .inner_join(Enrollment)
            .filter(EnrollmentColumn::StudentId.eq(student_id))
            .filter(EnrollmentColumn::IsActive.eq(true))
            .filter(Column::IsActive.eq(true))
            .order_by_desc(Column::StartDate)
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "error loading enrolled courses");
            })
    }

    /// Active courses the user neither teaches nor is actively enrolled in.
    pub async fn list_available<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<Vec<Model>, DbErr> {
        let enrolled: Vec<Uuid> = Self::list_enrolled(conn, user_id)
            .await?
            .into_iter()
            .map(|course| course.id)
            .collect();
        Entity::find()
            .filter(Column::IsActive.eq(true))
            .filter(Column::InstructorId.ne(user_id))
            .filter(Column::Id.is_not_in(enrolled))
            .order_by_desc(Column::StartDate)
            .all(conn)
            .await
    }

    pub async fn count_active_students<C: ConnectionTrait>(conn: &C, course_id: Uuid) -> Result<u64, DbErr> {
        Enrollment::find()
            .filter(EnrollmentColumn::CourseId.eq(course_id))
            .filter(EnrollmentColumn::IsActive.eq(true))
            .count(conn)
            .await
    }
}
