use campus_entity::forum::forum::{Column, Entity, Model};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use std::error::Error;
use uuid::Uuid;

pub struct Query;

impl Query {
    pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(id).one(conn).await
    }

    pub async fn find_by_slug<C: ConnectionTrait>(conn: &C, slug: &str) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::Slug.eq(slug))
            .one(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "error loading forum");
            })
    }

    /// Active forums that are not attached to a course.
    pub async fn list_general<C: ConnectionTrait>(conn: &C) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::CourseId.is_null())
            .filter(Column::IsActive.eq(true))
            .order_by_asc(Column::Title)
            .all(conn)
            .await
    }

    pub async fn list_for_courses<C: ConnectionTrait>(conn: &C, course_ids: Vec<Uuid>) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::CourseId.is_in(course_ids))
            .filter(Column::IsActive.eq(true))
            .order_by_asc(Column::Title)
            .all(conn)
            .await
    }

    /// Every forum, including inactive ones.
    pub async fn list_all<C: ConnectionTrait>(conn: &C) -> Result<Vec<Model>, DbErr> {
        Entity::find().order_by_asc(Column::Title).all(conn).await
    }
}
