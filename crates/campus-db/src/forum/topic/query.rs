use campus_entity::forum::post::{self, Entity as Post};
use campus_entity::forum::topic::{Column, Entity, Model};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

pub struct Query;

impl Query {
    pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(id).one(conn).await
    }

    pub async fn find_by_slug<C: ConnectionTrait>(conn: &C, forum_id: Uuid, slug: &str) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::ForumId.eq(forum_id))
            .filter(Column::Slug.eq(slug))
            .one(conn)
            .await
    }

    /// Topics of a forum, pinned topics first, then by latest activity.
    pub async fn list_for_forum<C: ConnectionTrait>(conn: &C, forum_id: Uuid) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::ForumId.eq(forum_id))
            .order_by_desc(Column::IsPinned)
            .order_by_desc(Column::UpdatedAt)
            .all(conn)
            .await
    }

    pub async fn slug_exists<C: ConnectionTrait>(conn: &C, forum_id: Uuid, slug: &str) -> Result<bool, DbErr> {
        Ok(Self::find_by_slug(conn, forum_id, slug).await?.is_some())
    }

    pub async fn count_posts<C: ConnectionTrait>(conn: &C, topic_id: Uuid) -> Result<u64, DbErr> {
        Post::find().filter(post::Column::TopicId.eq(topic_id)).count(conn).await
    }
}
