use crate::convert::{FromDbModel, utc};
use campus_entity::messaging::conversation::Model as ConversationModel;
use campus_entity::messaging::message::Model as MessageModel;
use campus_entity::user::Model as UserModel;
use campus_model::messaging::{Conversation, Message};

impl FromDbModel<(MessageModel, &UserModel)> for Message {
    fn from_db_model((model, sender): (MessageModel, &UserModel)) -> Self {
        Self {
            id: model.id,
            conversation_id: model.conversation_id,
            sender: FromDbModel::from_db_model(sender),
            content: model.content,
            created_at: utc(model.created_at),
            is_read: model.is_read,
        }
    }
}

impl FromDbModel<(ConversationModel, &[UserModel])> for Conversation {
    fn from_db_model((model, participants): (ConversationModel, &[UserModel])) -> Self {
        Self {
            id: model.id,
            subject: model.subject,
            participants: participants.iter().map(FromDbModel::from_db_model).collect(),
            created_at: utc(model.created_at),
            updated_at: utc(model.updated_at),
        }
    }
}
