use crate::util::now;
use campus_entity::course::course::{ActiveModel, Entity, Model};
use chrono::NaiveDate;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait};
use std::error::Error;
use uuid::Uuid;

pub struct Mutation;

impl Mutation {
    pub async fn create_course<C: ConnectionTrait>(
        conn: &C,
        instructor_id: Uuid,
        title: String,
        slug: String,
        description: String,
        (start_date, end_date): (NaiveDate, NaiveDate),
    ) -> Result<Model, DbErr> {
        let timestamp = now();
        ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(title),
            slug: Set(slug),
            description: Set(description),
            instructor_id: Set(instructor_id),
            start_date: Set(start_date),
            end_date: Set(end_date),
            is_active: Set(true),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        }
        .insert(conn)
        .await
        .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to create course"))
    }

    pub async fn update_course<C: ConnectionTrait>(conn: &C, mut course: ActiveModel) -> Result<Model, DbErr> {
        course.updated_at = Set(now());
        course.update(conn).await
    }

    pub async fn delete_course<C: ConnectionTrait>(conn: &C, course_id: Uuid) -> Result<(), DbErr> {
        Entity::delete_by_id(course_id).exec(conn).await?;
        Ok(())
    }
}
