use super::AssistantError;
use super::prompt::CourseContext;
use super::reply::keyword_reply;
use campus_db::assistant::{assistant, conversation, message};
use campus_db::course::course;
use campus_db::user;
use campus_db::util::RequireRecord;
use campus_entity::assistant::assistant::Model as Assistant;
use campus_entity::assistant::conversation::Model as Conversation;
use campus_entity::assistant::message::MessageType;
use campus_model::assistant::{
    ChatMessage, LlmWebhookRequest, LlmWebhookResponse, RegisterWebhookRequest, RegisterWebhookResponse,
};
use sea_orm::ConnectionTrait;

/// Checks the bearer token the vendor presented. Assistants without a stored token accept any caller.
pub fn verify_token(assistant: &Assistant, token: Option<&str>) -> Result<(), AssistantError> {
    match assistant.webhook_token.as_deref() {
        Some(expected) if token != Some(expected) => Err(AssistantError::InvalidToken),
        _ => Ok(()),
    }
}

async fn find_assistant<C: ConnectionTrait>(
    conn: &C,
    agent_id: &str,
    token: Option<&str>,
) -> Result<Assistant, AssistantError> {
    let assistant = assistant::Query::find_by_agent_id(conn, agent_id)
        .await?
        .ok_or(AssistantError::UnknownAgent)?;
    verify_token(&assistant, token)?;
    Ok(assistant)
}

/// Session ids are unique across assistants, so a session opened by another agent is refused.
async fn session_conversation<C: ConnectionTrait>(
    conn: &C,
    assistant: &Assistant,
    session_id: &str,
    user_id: Option<uuid::Uuid>,
    call_id: Option<String>,
) -> Result<Conversation, AssistantError> {
    let conversation = conversation::Mutation::get_or_create(conn, assistant.id, session_id, user_id, call_id).await?;
    if conversation.assistant_id != assistant.id {
        tracing::warn!(%session_id, assistant_id = %assistant.id, "session belongs to another assistant");
        return Err(AssistantError::SessionConflict);
    }
    Ok(conversation)
}

/// Records the caller's utterance and answers with the course prompt plus a keyword reply.
pub async fn handle_llm_webhook<C: ConnectionTrait>(
    conn: &C,
    request: LlmWebhookRequest,
    token: Option<&str>,
) -> Result<LlmWebhookResponse, AssistantError> {
    let assistant = find_assistant(conn, &request.agent_id, token).await?;
    let conversation = session_conversation(conn, &assistant, &request.session_id, None, request.call_id).await?;

    if request.message.role == "user" {
        message::Mutation::create_message(conn, conversation.id, MessageType::User, request.message.content.clone())
            .await?;
    }

    let course = course::Query::find_by_id(conn, assistant.course_id).await.require()?;
    let system_prompt = CourseContext::load(conn, &course).await?.system_prompt();
    let reply = keyword_reply(&request.message.content, &assistant.greeting_message).to_owned();
    message::Mutation::create_message(conn, conversation.id, MessageType::Assistant, reply.clone()).await?;

    Ok(LlmWebhookResponse {
        messages: vec![
            ChatMessage {
                role: "system".to_owned(),
                content: system_prompt,
            },
            ChatMessage {
                role: "assistant".to_owned(),
                content: reply,
            },
        ],
    })
}

/// Binds the vendor session to an LMS user.
pub async fn handle_register_webhook<C: ConnectionTrait>(
    conn: &C,
    request: RegisterWebhookRequest,
    token: Option<&str>,
) -> Result<RegisterWebhookResponse, AssistantError> {
    let assistant = find_assistant(conn, &request.agent_id, token).await?;
    let caller = user::Query::find_user_by_id(conn, request.user_id)
        .await?
        .ok_or(AssistantError::UnknownUser)?;

    let mut conversation =
        session_conversation(conn, &assistant, &request.session_id, Some(caller.id), request.call_id).await?;
    if conversation.user_id != Some(caller.id) {
        conversation = conversation::Mutation::set_user(conn, conversation.id, caller.id).await?;
    }

    message::Mutation::create_message(
        conn,
        conversation.id,
        MessageType::System,
        format!("Conversation started with {}", assistant.name),
    )
    .await?;
    tracing::info!(session_id = %request.session_id, user_id = %caller.id, "registered assistant session");

    Ok(RegisterWebhookResponse { success: true })
}
