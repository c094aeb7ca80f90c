use crate::validation::{FieldErrors, Validate, max_length};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Voice {
    Alloy,
    Shimmer,
    #[default]
    Nova,
    Echo,
    Fable,
    Onyx,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Assistant {
    pub id: Uuid,
    pub course_id: Uuid,
    pub course_title: String,
    pub name: String,
    pub voice: Voice,
    pub greeting_message: String,
    pub is_active: bool,
    pub agent_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewAssistant {
    pub course_id: Uuid,
    /// Defaults to `"{course title} Assistant"`.
    pub name: Option<String>,
    #[serde(default)]
    pub voice: Voice,
    pub greeting_message: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Validate for NewAssistant {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(name) = &self.name {
            max_length(&mut errors, "name", name, 100);
        }
        errors.into_result()
    }
}

#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct UpdateAssistant {
    pub name: Option<String>,
    pub voice: Option<Voice>,
    pub greeting_message: Option<String>,
    pub is_active: Option<bool>,
}

impl Validate for UpdateAssistant {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                errors.add("name", "This field is required.");
            }
            max_length(&mut errors, "name", name, 100);
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MessageType {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssistantMessage {
    pub id: Uuid,
    pub message_type: MessageType,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssistantConversation {
    pub id: Uuid,
    pub assistant_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssistantDetail {
    #[serde(flatten)]
    pub assistant: Assistant,
    /// Conversations of the caller with this assistant, newest first.
    pub conversations: Vec<AssistantConversation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConversationTranscript {
    #[serde(flatten)]
    pub conversation: AssistantConversation,
    pub messages: Vec<AssistantMessage>,
}

/// Everything the browser needs to open a web call with the agent.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StartCall {
    pub assistant_id: Uuid,
    pub assistant_name: String,
    pub agent_id: String,
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

/// Call records are passed through from the vendor unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct Call(pub Value);

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct WebhookMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LlmWebhookRequest {
    pub call_id: Option<String>,
    pub agent_id: String,
    pub session_id: String,
    #[serde(default)]
    pub message: WebhookMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterWebhookRequest {
    pub call_id: Option<String>,
    pub agent_id: String,
    pub session_id: String,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LlmWebhookResponse {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterWebhookResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WebhookError {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_assistant_defaults() {
        let assistant: NewAssistant = serde_json::from_value(serde_json::json!({"course_id": Uuid::nil()})).unwrap();
        assert_eq!(assistant.voice, Voice::Nova);
        assert!(assistant.is_active);
        assert!(assistant.name.is_none());
    }

    #[test]
    fn test_llm_webhook_without_message() {
        let request: LlmWebhookRequest =
            serde_json::from_str(r#"{"call_id":"c1","agent_id":"a1","session_id":"s1"}"#).unwrap();
        assert!(request.message.content.is_empty());
        assert_eq!(request.call_id.as_deref(), Some("c1"));
    }
}
