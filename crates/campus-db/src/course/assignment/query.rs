use crate::util::now;
use campus_entity::course::assignment::{Column, Entity, Model};
use campus_entity::course::module::{Column as ModuleColumn, Entity as Module};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait};
use std::error::Error;
use uuid::Uuid;

pub struct Query;

impl Query {
    pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(id).one(conn).await
    }

    /// Loads the assignment together with the id of the course it belongs to.
    pub async fn find_with_course_id<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
    ) -> Result<Option<(Model, Uuid)>, DbErr> {
        let Some((assignment, module)) = Entity::find_by_id(id).find_also_related(Module).one(conn).await? else {
            return Ok(None);
        };
        Ok(module.map(|module| (assignment, module.course_id)))
    }

    pub async fn list_for_module<C: ConnectionTrait>(conn: &C, module_id: Uuid) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::ModuleId.eq(module_id))
            .order_by_asc(Column::DueDate)
            .order_by_asc(Column::CreatedAt)
            .all(conn)
            .await
    }

    pub async fn list_for_course<C: ConnectionTrait>(conn: &C, course_id: Uuid) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .join(JoinType::InnerJoin, campus_entity::course::assignment::Relation::Module.def())
            .filter(ModuleColumn::CourseId.eq(course_id))
            .order_by_asc(Column::DueDate)
            .all(conn)
            .await
    }

    /// Assignments of the given courses that are due in the future, soonest first.
    pub async fn list_upcoming_for_courses<C: ConnectionTrait>(
        conn: &C,
        course_ids: Vec<Uuid>,
        limit: u64,
    ) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .join(JoinType::InnerJoin, campus_entity::course::assignment::Relation::Module.def())
            .filter(ModuleColumn::CourseId.is_in(course_ids))
            .filter(Column::DueDate.gt(now()))
            .order_by_asc(Column::DueDate)
            .limit(limit)
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "error loading upcoming assignments");
            })
    }
}
