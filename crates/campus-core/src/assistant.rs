//! Bridge between courses and the voice vendor's agents.
//!
//! Every change is applied at the vendor first. A local row only exists for a confirmed remote agent.

pub mod error;
pub mod prompt;
pub mod reply;
pub mod webhook;

pub use error::AssistantError;

use crate::access::CourseAccess;
use campus_db::assistant::{assistant, conversation};
use campus_entity::assistant::assistant::{ActiveModel, DEFAULT_GREETING, Model as Assistant, Voice};
use campus_entity::course::course::Model as Course;
use campus_entity::user::{Model as User, Role};
use campus_model::assistant::{Call, NewAssistant, StartCall, UpdateAssistant};
use campus_model_tools::convert::IntoDbModel;
use campus_voice::{AgentApi, CreateAgent, UpdateAgent, generate_webhook_token};
use sea_orm::ActiveValue::{Set, Unchanged};
use sea_orm::{ConnectionTrait, DbErr};
use std::error::Error;
use url::Url;

/// Endpoints the vendor calls back on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookUrls {
    pub llm: Url,
    pub register: Url,
}

impl WebhookUrls {
    pub fn new(public_base_url: &Url) -> Result<Self, url::ParseError> {
        let mut base = public_base_url.clone();
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        Ok(Self {
            llm: base.join("api/v0/assistants/webhooks/llm")?,
            register: base.join("api/v0/assistants/webhooks/register")?,
        })
    }
}

/// Creates the remote agent and then the local assistant of `course`.
///
/// If storing the assistant fails the remote agent is deleted again.
pub async fn create_assistant<C: ConnectionTrait>(
    conn: &C,
    api: &dyn AgentApi,
    urls: &WebhookUrls,
    course: &Course,
    new: NewAssistant,
) -> Result<Assistant, AssistantError> {
    if assistant::Query::find_by_course(conn, course.id).await?.is_some() {
        return Err(AssistantError::AlreadyExists);
    }

    let name = new
        .name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| format!("{} Assistant", course.title));
    let greeting_message = new
        .greeting_message
        .filter(|greeting| !greeting.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_GREETING.to_owned());
    let voice: Voice = new.voice.into_db_model();
    let token = generate_webhook_token();

    let agent = api
        .create_agent(&CreateAgent::new(
            name.clone(),
            voice.as_ref().to_owned(),
            urls.llm.to_string(),
            urls.register.to_string(),
            token.clone(),
        ))
        .await
        .inspect_err(|error| tracing::error!(error = error as &dyn Error, course = %course.slug, "failed to create agent"))?;

    let stored = assistant::Mutation::create_assistant(
        conn,
        assistant::NewAssistant {
            course_id: course.id,
            name,
            voice,
            greeting_message,
            is_active: new.is_active,
            agent_id: agent.id.clone(),
            webhook_token: Some(token),
        },
    )
    .await;

    match stored {
        Ok(assistant) => {
            tracing::info!(course = %course.slug, agent_id = %assistant.agent_id, "created assistant");
            Ok(assistant)
        }
        Err(error) => {
            if let Err(cleanup) = api.delete_agent(&agent.id).await {
                tracing::error!(error = &cleanup as &dyn Error, agent_id = %agent.id, "failed to remove orphaned agent");
            }
            Err(error.into())
        }
    }
}

/// Applies name and voice changes to the remote agent, then stores the update.
pub async fn update_assistant<C: ConnectionTrait>(
    conn: &C,
    api: &dyn AgentApi,
    current: &Assistant,
    update: UpdateAssistant,
) -> Result<Assistant, AssistantError> {
    let voice: Option<Voice> = update.voice.map(IntoDbModel::into_db_model);
    let remote = UpdateAgent {
        name: update.name.clone().filter(|name| *name != current.name),
        voice: voice.filter(|voice| *voice != current.voice).map(|voice| voice.as_ref().to_owned()),
    };
    if !remote.is_empty() {
        api.update_agent(&current.agent_id, &remote)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, agent_id = %current.agent_id, "failed to update agent"))?;
    }

    let mut active = ActiveModel {
        id: Unchanged(current.id),
        ..Default::default()
    };
    if let Some(name) = update.name {
        active.name = Set(name);
    }
    if let Some(voice) = voice {
        active.voice = Set(voice);
    }
    if let Some(greeting_message) = update.greeting_message {
        active.greeting_message = Set(greeting_message);
    }
    if let Some(is_active) = update.is_active {
        active.is_active = Set(is_active);
    }
    Ok(assistant::Mutation::update_assistant(conn, active).await?)
}

/// Deletes the remote agent and then the local assistant. An agent the vendor no longer knows
/// counts as deleted.
pub async fn delete_assistant<C: ConnectionTrait>(
    conn: &C,
    api: &dyn AgentApi,
    current: &Assistant,
) -> Result<(), AssistantError> {
    match api.delete_agent(&current.agent_id).await {
        Ok(()) => {}
        Err(error) if error.is_not_found() => {
            tracing::warn!(agent_id = %current.agent_id, "agent already gone at the vendor");
        }
        Err(error) => {
            tracing::error!(error = &error as &dyn Error, agent_id = %current.agent_id, "failed to delete agent");
            return Err(error.into());
        }
    }
    assistant::Mutation::delete_assistant(conn, current.id).await?;
    Ok(())
}

pub async fn list_calls(api: &dyn AgentApi, current: &Assistant, limit: u32) -> Result<Vec<Call>, AssistantError> {
    let calls = api.list_calls(Some(&current.agent_id), limit).await?;
    Ok(calls.into_iter().map(Call).collect())
}

pub async fn get_call(api: &dyn AgentApi, call_id: &str) -> Result<Call, AssistantError> {
    Ok(Call(api.get_call(call_id).await?))
}

/// Ends the call at the vendor and closes the local conversations of that call.
pub async fn end_call<C: ConnectionTrait>(conn: &C, api: &dyn AgentApi, call_id: &str) -> Result<Call, AssistantError> {
    let call = api
        .end_call(call_id)
        .await
        .inspect_err(|error| tracing::error!(error = error as &dyn Error, call_id, "failed to end call"))?;
    let closed = conversation::Mutation::mark_ended_by_call(conn, call_id).await?;
    tracing::debug!(call_id, closed, "ended call");
    Ok(Call(call))
}

/// Whether `user` may talk to the assistant. Students only see active assistants of courses
/// they are actively enrolled in.
pub async fn can_use<C: ConnectionTrait>(
    conn: &C,
    current: &Assistant,
    course: &Course,
    user: &User,
) -> Result<bool, DbErr> {
    let access = CourseAccess::load(conn, course, user).await?;
    Ok(access.is_instructor || (user.role == Role::Student && access.is_enrolled && current.is_active))
}

#[must_use]
pub fn start_call(current: &Assistant, user: &User, public_key: Option<String>) -> StartCall {
    StartCall {
        assistant_id: current.id,
        assistant_name: current.name.clone(),
        agent_id: current.agent_id.clone(),
        user_id: user.id,
        public_key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_urls() {
        let urls = WebhookUrls::new(&Url::parse("https://lms.example.org/campus").unwrap()).unwrap();
        assert_eq!(
            urls.llm.as_str(),
            "https://lms.example.org/campus/api/v0/assistants/webhooks/llm"
        );
        assert_eq!(
            urls.register.as_str(),
            "https://lms.example.org/campus/api/v0/assistants/webhooks/register"
        );

        let urls = WebhookUrls::new(&Url::parse("http://localhost:3030").unwrap()).unwrap();
        assert_eq!(urls.llm.as_str(), "http://localhost:3030/api/v0/assistants/webhooks/llm");
    }
}
