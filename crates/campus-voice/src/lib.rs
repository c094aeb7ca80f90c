mod agent;
mod client;
mod error;

pub use crate::agent::{Agent, AgentApi, CreateAgent, UpdateAgent, WebhookAuth, generate_webhook_token};
pub use crate::client::RetellClient;
pub use crate::error::Error;

pub const DEFAULT_API_URL: &str = "https://api.retellai.com/v1";
