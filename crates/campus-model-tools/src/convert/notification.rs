use crate::convert::{FromDbModel, utc};
use campus_entity::notification::{
    Model as NotificationModel, NotificationType as NotificationTypeModel, RelatedObject as RelatedObjectModel,
};
use campus_model::notification::{Notification, NotificationType, RelatedObject};

impl FromDbModel<NotificationTypeModel> for NotificationType {
    fn from_db_model(model: NotificationTypeModel) -> Self {
        match model {
            NotificationTypeModel::Message => Self::Message,
            NotificationTypeModel::ForumPost => Self::ForumPost,
            NotificationTypeModel::ForumTopic => Self::ForumTopic,
            NotificationTypeModel::ForumReply => Self::ForumReply,
            NotificationTypeModel::Course => Self::Course,
            NotificationTypeModel::Assignment => Self::Assignment,
        }
    }
}

impl FromDbModel<RelatedObjectModel> for RelatedObject {
    fn from_db_model(model: RelatedObjectModel) -> Self {
        match model {
            RelatedObjectModel::Message(id) => Self::Message(id),
            RelatedObjectModel::ForumPost(id) => Self::ForumPost(id),
            RelatedObjectModel::ForumTopic(id) => Self::ForumTopic(id),
        }
    }
}

impl FromDbModel<NotificationModel> for Notification {
    fn from_db_model(model: NotificationModel) -> Self {
        Self {
            related: model.related_object().map(FromDbModel::from_db_model),
            id: model.id,
            notification_type: FromDbModel::from_db_model(model.notification_type),
            title: model.title,
            message: model.message,
            created_at: utc(model.created_at),
            is_read: model.is_read,
            related_link: model.related_link,
        }
    }
}
