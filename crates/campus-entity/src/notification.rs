use sea_orm::entity::prelude::*;
use strum::AsRefStr;

#[derive(Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Clone, Copy, AsRefStr)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationType {
    #[sea_orm(string_value = "message")]
    Message,
    #[sea_orm(string_value = "forum_post")]
    ForumPost,
    #[sea_orm(string_value = "forum_topic")]
    ForumTopic,
    #[sea_orm(string_value = "forum_reply")]
    ForumReply,
    #[sea_orm(string_value = "course")]
    Course,
    #[sea_orm(string_value = "assignment")]
    Assignment,
}

/// The single record a notification points at. The table enforces that at most one of the
/// `related_*` columns is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelatedObject {
    Message(Uuid),
    ForumPost(Uuid),
    ForumTopic(Uuid),
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub created_at: DateTimeWithTimeZone,
    pub is_read: bool,
    pub related_link: Option<String>,
    pub related_message_id: Option<Uuid>,
    pub related_post_id: Option<Uuid>,
    pub related_topic_id: Option<Uuid>,
}

impl Model {
    #[must_use]
    pub fn related_object(&self) -> Option<RelatedObject> {
        self.related_message_id
            .map(RelatedObject::Message)
            .or(self.related_post_id.map(RelatedObject::ForumPost))
            .or(self.related_topic_id.map(RelatedObject::ForumTopic))
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::user::Entity",
        from = "Column::UserId",
        to = "crate::user::Column::Id"
    )]
    User,
}

impl Related<crate::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
