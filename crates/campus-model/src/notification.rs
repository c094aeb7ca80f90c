use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationType {
    Message,
    ForumPost,
    ForumTopic,
    ForumReply,
    Course,
    Assignment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum RelatedObject {
    Message(Uuid),
    ForumPost(Uuid),
    ForumTopic(Uuid),
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related: Option<RelatedObject>,
}

#[derive(Debug, Default, Clone, Copy, Deserialize, ToSchema)]
pub struct NotificationFilter {
    #[serde(default)]
    pub unread: bool,
}
