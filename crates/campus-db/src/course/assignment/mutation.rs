use crate::util::{now, to_utc};
use campus_entity::course::assignment::{ActiveModel, Entity, Model};
use sea_orm::ActiveValue::Set;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait};
use uuid::Uuid;

pub struct Mutation;

impl Mutation {
    pub async fn create_assignment<C: ConnectionTrait>(
        conn: &C,
        module_id: Uuid,
        title: String,
        description: String,
        due_date: Option<DateTimeWithTimeZone>,
        points: i32,
    ) -> Result<Model, DbErr> {
        let timestamp = now();
        ActiveModel {
            id: Set(Uuid::new_v4()),
            module_id: Set(module_id),
            title: Set(title),
            description: Set(description),
            due_date: Set(due_date.map(to_utc)),
            points: Set(points),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        }
        .insert(conn)
        .await
    }

    pub async fn update_assignment<C: ConnectionTrait>(conn: &C, mut assignment: ActiveModel) -> Result<Model, DbErr> {
        if let Set(Some(due_date)) = assignment.due_date {
            assignment.due_date = Set(Some(to_utc(due_date)));
        }
        assignment.updated_at = Set(now());
        assignment.update(conn).await
    }

    pub async fn delete_assignment<C: ConnectionTrait>(conn: &C, assignment_id: Uuid) -> Result<(), DbErr> {
        Entity::delete_by_id(assignment_id).exec(conn).await?;
        Ok(())
    }
}
