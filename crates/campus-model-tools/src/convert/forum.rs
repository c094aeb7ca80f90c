use crate::convert::{FromDbModel, utc};
use campus_entity::forum::forum::Model as ForumModel;
use campus_entity::forum::post::Model as PostModel;
use campus_entity::forum::topic::Model as TopicModel;
use campus_entity::user::Model as UserModel;
use campus_model::forum::{Forum, Post, Topic};

impl FromDbModel<ForumModel> for Forum {
    fn from_db_model(model: ForumModel) -> Self {
        Self {
            id: model.id,
            title: model.title,
            slug: model.slug,
            description: model.description,
            course_id: model.course_id,
            is_active: model.is_active,
            created_at: utc(model.created_at),
        }
    }
}

impl FromDbModel<(TopicModel, &UserModel)> for Topic {
    fn from_db_model((model, creator): (TopicModel, &UserModel)) -> Self {
        Self {
            id: model.id,
            forum_id: model.forum_id,
            title: model.title,
            slug: model.slug,
            created_by: FromDbModel::from_db_model(creator),
            created_at: utc(model.created_at),
            updated_at: utc(model.updated_at),
            views: model.views,
            is_pinned: model.is_pinned,
            is_closed: model.is_closed,
        }
    }
}

impl FromDbModel<(PostModel, &UserModel)> for Post {
    fn from_db_model((model, author): (PostModel, &UserModel)) -> Self {
        Self {
            id: model.id,
            topic_id: model.topic_id,
            content: model.content,
            created_by: FromDbModel::from_db_model(author),
            created_at: utc(model.created_at),
            updated_at: utc(model.updated_at),
            is_edited: model.is_edited,
        }
    }
}
