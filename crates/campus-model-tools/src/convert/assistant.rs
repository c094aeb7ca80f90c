use crate::convert::{FromDbModel, FromModel, utc};
use campus_entity::assistant::assistant::{Model as AssistantModel, Voice as VoiceModel};
use campus_entity::assistant::conversation::Model as ConversationModel;
use campus_entity::assistant::message::{MessageType as MessageTypeModel, Model as MessageModel};
use campus_model::assistant::{Assistant, AssistantConversation, AssistantMessage, MessageType, Voice};

impl FromDbModel<VoiceModel> for Voice {
    fn from_db_model(model: VoiceModel) -> Self {
        match model {
            VoiceModel::Alloy => Self::Alloy,
            VoiceModel::Shimmer => Self::Shimmer,
            VoiceModel::Nova => Self::Nova,
            VoiceModel::Echo => Self::Echo,
            VoiceModel::Fable => Self::Fable,
            VoiceModel::Onyx => Self::Onyx,
        }
    }
}

impl FromModel<Voice> for VoiceModel {
    fn from_model(model: Voice) -> Self {
        match model {
            Voice::Alloy => Self::Alloy,
            Voice::Shimmer => Self::Shimmer,
            Voice::Nova => Self::Nova,
            Voice::Echo => Self::Echo,
            Voice::Fable => Self::Fable,
            Voice::Onyx => Self::Onyx,
        }
    }
}

impl FromDbModel<(AssistantModel, String)> for Assistant {
    fn from_db_model((model, course_title): (AssistantModel, String)) -> Self {
        Self {
            id: model.id,
            course_id: model.course_id,
            course_title,
            name: model.name,
            voice: FromDbModel::from_db_model(model.voice),
            greeting_message: model.greeting_message,
            is_active: model.is_active,
            agent_id: model.agent_id,
            created_at: utc(model.created_at),
            updated_at: utc(model.updated_at),
        }
    }
}

impl FromDbModel<ConversationModel> for AssistantConversation {
    fn from_db_model(model: ConversationModel) -> Self {
        Self {
            id: model.id,
            assistant_id: model.assistant_id,
            user_id: model.user_id,
            session_id: model.session_id,
            call_id: model.call_id,
            started_at: utc(model.started_at),
            ended_at: model.ended_at.map(utc),
        }
    }
}

impl FromDbModel<MessageTypeModel> for MessageType {
    fn from_db_model(model: MessageTypeModel) -> Self {
        match model {
            MessageTypeModel::User => Self::User,
            MessageTypeModel::Assistant => Self::Assistant,
            MessageTypeModel::System => Self::System,
        }
    }
}

impl FromDbModel<MessageModel> for AssistantMessage {
    fn from_db_model(model: MessageModel) -> Self {
        Self {
            id: model.id,
            message_type: FromDbModel::from_db_model(model.message_type),
            content: model.content,
            created_at: utc(model.created_at),
        }
    }
}
