use campus_entity::course::enrollment::{Column, Entity, Model};
use campus_entity::user;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

pub struct Query;

impl Query {
    pub async fn find<C: ConnectionTrait>(conn: &C, student_id: Uuid, course_id: Uuid) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::CourseId.eq(course_id))
            .one(conn)
            .await
    }

    pub async fn is_active_student<C: ConnectionTrait>(
        conn: &C,
        student_id: Uuid,
        course_id: Uuid,
    ) -> Result<bool, DbErr> {
        Ok(Self::find(conn, student_id, course_id)
            .await?
            .is_some_and(|enrollment| enrollment.is_active))
    }

    /// Active enrollments of a course with the enrolled students.
    pub async fn list_for_course<C: ConnectionTrait>(
        conn: &C,
        course_id: Uuid,
    ) -> Result<Vec<(Model, user::Model)>, DbErr> {
        let rows = Entity::find()
            .find_also_related(user::Entity)
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::IsActive.eq(true))
            .order_by_asc(Column::EnrolledAt)
            .all(conn)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|(enrollment, student)| student.map(|student| (enrollment, student)))
            .collect())
    }

    pub async fn active_course_ids<C: ConnectionTrait>(conn: &C, student_id: Uuid) -> Result<Vec<Uuid>, DbErr> {
        Entity::find()
            .select_only()
            .column(Column::CourseId)
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::IsActive.eq(true))
            .into_tuple()
            .all(conn)
            .await
    }
}
