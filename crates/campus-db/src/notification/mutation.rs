use crate::util::now;
use campus_entity::notification::{ActiveModel, Column, Entity, NotificationType, RelatedObject};
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use std::error::Error;
use uuid::Uuid;

pub struct Mutation;

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub related_link: Option<String>,
    pub related: Option<RelatedObject>,
}

impl NewNotification {
    fn into_active_model(self, user_id: Uuid) -> ActiveModel {
        let (message_id, post_id, topic_id) = match self.related {
            Some(RelatedObject::Message(id)) => (Some(id), None, None),
            Some(RelatedObject::ForumPost(id)) => (None, Some(id), None),
            Some(RelatedObject::ForumTopic(id)) => (None, None, Some(id)),
            None => (None, None, None),
        };
        ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            notification_type: Set(self.notification_type),
            title: Set(self.title),
            message: Set(self.message),
            created_at: Set(now()),
            is_read: Set(false),
            related_link: Set(self.related_link),
            related_message_id: Set(message_id),
            related_post_id: Set(post_id),
            related_topic_id: Set(topic_id),
        }
    }
}

impl Mutation {
    /// Sends the same notification to every recipient.
    pub async fn create_notifications<C: ConnectionTrait>(
        conn: &C,
        recipients: Vec<Uuid>,
        notification: NewNotification,
    ) -> Result<(), DbErr> {
        if recipients.is_empty() {
            return Ok(());
        }
        let models = recipients
            .into_iter()
            .map(|user_id| notification.clone().into_active_model(user_id));
        Entity::insert_many(models)
            .exec_without_returning(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to create notifications"))?;
        Ok(())
    }

    /// Returns `false` if the notification does not exist or belongs to someone else.
    pub async fn mark_read<C: ConnectionTrait>(conn: &C, user_id: Uuid, notification_id: Uuid) -> Result<bool, DbErr> {
        let result = Entity::update_many()
            .col_expr(Column::IsRead, Expr::value(true))
            .filter(Column::Id.eq(notification_id))
            .filter(Column::UserId.eq(user_id))
            .exec(conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn mark_all_read<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<u64, DbErr> {
        let result = Entity::update_many()
            .col_expr(Column::IsRead, Expr::value(true))
            .filter(Column::UserId.eq(user_id))
            .filter(Column::IsRead.eq(false))
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }

    /// Marks the user's notifications about the given messages as read.
    pub async fn mark_read_for_messages<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        message_ids: Vec<Uuid>,
    ) -> Result<(), DbErr> {
        if message_ids.is_empty() {
            return Ok(());
        }
        Entity::update_many()
            .col_expr(Column::IsRead, Expr::value(true))
            .filter(Column::UserId.eq(user_id))
            .filter(Column::RelatedMessageId.is_in(message_ids))
            .exec(conn)
            .await?;
        Ok(())
    }

    pub async fn delete_notification<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        notification_id: Uuid,
    ) -> Result<bool, DbErr> {
        let result = Entity::delete_many()
            .filter(Column::Id.eq(notification_id))
            .filter(Column::UserId.eq(user_id))
            .exec(conn)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
