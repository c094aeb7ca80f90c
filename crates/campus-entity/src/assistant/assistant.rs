use sea_orm::entity::prelude::*;
use strum::AsRefStr;

#[derive(Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Clone, Copy, AsRefStr)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[strum(serialize_all = "snake_case")]
pub enum Voice {
    #[sea_orm(string_value = "alloy")]
    Alloy,
    #[sea_orm(string_value = "shimmer")]
    Shimmer,
    #[default]
    #[sea_orm(string_value = "nova")]
    Nova,
    #[sea_orm(string_value = "echo")]
    Echo,
    #[sea_orm(string_value = "fable")]
    Fable,
    #[sea_orm(string_value = "onyx")]
    Onyx,
}

pub const DEFAULT_GREETING: &str = "Hello! I'm your course assistant. How can I help you today?";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ai_assistants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub course_id: Uuid,
    pub name: String,
    pub voice: Voice,
    pub greeting_message: String,
    pub is_active: bool,
    /// Id of the agent at the voice vendor.
    #[sea_orm(unique)]
    pub agent_id: String,
    /// Bearer token the vendor presents when calling our webhooks.
    pub webhook_token: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::course::course::Entity",
        from = "Column::CourseId",
        to = "crate::course::course::Column::Id"
    )]
    Course,
    #[sea_orm(has_many = "super::conversation::Entity")]
    Conversation,
}

impl Related<crate::course::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::conversation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Conversation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
