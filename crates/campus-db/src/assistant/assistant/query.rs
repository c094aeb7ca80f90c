use campus_entity::assistant::assistant::{Column, Entity, Model};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use std::error::Error;
use uuid::Uuid;

pub struct Query;

impl Query {
    pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(id).one(conn).await
    }

    pub async fn find_by_agent_id<C: ConnectionTrait>(conn: &C, agent_id: &str) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::AgentId.eq(agent_id))
            .one(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "error loading assistant by agent id");
            })
    }

    pub async fn find_by_course<C: ConnectionTrait>(conn: &C, course_id: Uuid) -> Result<Option<Model>, DbErr> {
        Entity::find().filter(Column::CourseId.eq(course_id)).one(conn).await
    }

    pub async fn list_for_courses<C: ConnectionTrait>(conn: &C, course_ids: Vec<Uuid>) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::CourseId.is_in(course_ids))
            .order_by_asc(Column::Name)
            .all(conn)
            .await
    }
}
