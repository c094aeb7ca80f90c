use crate::util::now;
use campus_entity::forum::topic::{ActiveModel, Column, Entity, Model};
use sea_orm::ActiveValue::{Set, Unchanged};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use uuid::Uuid;

pub struct Mutation;

impl Mutation {
    pub async fn create_topic<C: ConnectionTrait>(
        conn: &C,
        forum_id: Uuid,
        created_by: Uuid,
        title: String,
        slug: String,
    ) -> Result<Model, DbErr> {
        let timestamp = now();
        ActiveModel {
            id: Set(Uuid::new_v4()),
            forum_id: Set(forum_id),
            title: Set(title),
            slug: Set(slug),
            created_by: Set(created_by),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
            views: Set(0),
            is_pinned: Set(false),
            is_closed: Set(false),
            first_post_id: Set(None),
        }
        .insert(conn)
        .await
    }

    /// Records the opening post, which may not be deleted on its own.
    pub async fn set_first_post<C: ConnectionTrait>(conn: &C, topic_id: Uuid, post_id: Uuid) -> Result<Model, DbErr> {
        ActiveModel {
            id: Unchanged(topic_id),
            first_post_id: Set(Some(post_id)),
            ..Default::default()
        }
        .update(conn)
        .await
    }

    pub async fn increment_views<C: ConnectionTrait>(conn: &C, topic_id: Uuid) -> Result<(), DbErr> {
        Entity::update_many()
            .col_expr(Column::Views, Expr::col(Column::Views).add(1))
            .filter(Column::Id.eq(topic_id))
            .exec(conn)
            .await?;
        Ok(())
    }

    /// Marks new activity in the topic.
    pub async fn touch<C: ConnectionTrait>(conn: &C, topic_id: Uuid) -> Result<(), DbErr> {
        Entity::update_many()
            .col_expr(Column::UpdatedAt, Expr::value(now()))
            .filter(Column::Id.eq(topic_id))
            .exec(conn)
            .await?;
        Ok(())
    }

    pub async fn set_pinned<C: ConnectionTrait>(conn: &C, topic_id: Uuid, is_pinned: bool) -> Result<Model, DbErr> {
        ActiveModel {
            id: Unchanged(topic_id),
            is_pinned: Set(is_pinned),
            ..Default::default()
        }
        .update(conn)
        .await
    }

    pub async fn set_closed<C: ConnectionTrait>(conn: &C, topic_id: Uuid, is_closed: bool) -> Result<Model, DbErr> {
        ActiveModel {
            id: Unchanged(topic_id),
            is_closed: Set(is_closed),
            ..Default::default()
        }
        .update(conn)
        .await
    }

    pub async fn update_title<C: ConnectionTrait>(conn: &C, topic_id: Uuid, title: String) -> Result<Model, DbErr> {
        ActiveModel {
            id: Unchanged(topic_id),
            title: Set(title),
            updated_at: Set(now()),
            ..Default::default()
        }
        .update(conn)
        .await
    }
}
