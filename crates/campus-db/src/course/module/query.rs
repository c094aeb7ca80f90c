use campus_entity::course::module::{Column, Entity, Model};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

pub struct Query;

impl Query {
    pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(id).one(conn).await
    }

    pub async fn list_for_course<C: ConnectionTrait>(conn: &C, course_id: Uuid) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_asc(Column::Position)
            .order_by_asc(Column::CreatedAt)
            .all(conn)
            .await
    }

    pub async fn next_position<C: ConnectionTrait>(conn: &C, course_id: Uuid) -> Result<i32, DbErr> {
        let last: Option<Option<i32>> = Entity::find()
            .select_only()
            .column_as(Column::Position.max(), "position")
            .filter(Column::CourseId.eq(course_id))
            .into_tuple()
            .one(conn)
            .await?;
        Ok(last.flatten().map_or(0, |position| position + 1))
    }
}
