use crate::error::Error;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Agent management and call inspection at the voice vendor.
#[async_trait]
pub trait AgentApi: Send + Sync {
    async fn create_agent(&self, agent: &CreateAgent) -> Result<Agent, Error>;

    async fn get_agent(&self, agent_id: &str) -> Result<Agent, Error>;

    async fn update_agent(&self, agent_id: &str, update: &UpdateAgent) -> Result<Agent, Error>;

    async fn delete_agent(&self, agent_id: &str) -> Result<(), Error>;

    async fn get_call(&self, call_id: &str) -> Result<Value, Error>;

    async fn list_calls(&self, agent_id: Option<&str>, limit: u32) -> Result<Vec<Value>, Error>;

    async fn end_call(&self, call_id: &str) -> Result<Value, Error>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookAuth {
    #[serde(rename = "type")]
    pub auth_type: &'static str,
    pub token: String,
}

impl WebhookAuth {
    #[must_use]
    pub fn bearer(token: String) -> Self {
        Self {
            auth_type: "bearer_token",
            token,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateAgent {
    pub name: String,
    pub voice: String,
    pub llm_webhook_url: String,
    pub register_webhook_url: String,
    pub ambient_sound: &'static str,
    pub llm_webhook_auth: WebhookAuth,
}

impl CreateAgent {
    #[must_use]
    pub fn new(name: String, voice: String, llm_webhook_url: String, register_webhook_url: String, token: String) -> Self {
        Self {
            name,
            voice,
            llm_webhook_url,
            register_webhook_url,
            ambient_sound: "office-ambient",
            llm_webhook_auth: WebhookAuth::bearer(token),
        }
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct UpdateAgent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
}

impl UpdateAgent {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.voice.is_none()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Agent {
    #[serde(alias = "agent_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub voice: Option<String>,
}

/// Token the vendor presents as bearer when calling our webhooks.
#[must_use]
pub fn generate_webhook_token() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("lms-token-{}", &hex[..10])
}
