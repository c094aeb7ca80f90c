pub(crate) mod error;

use crate::AppConfig;
use crate::permissions::Permission;
use crate::routes::api::v0::assistants::error::AssistantError;
use crate::user::ExtractUser;
use axum::body::Bytes;
use axum::extract::{Path, Query};
use axum::response::{IntoResponse, Response};
use axum::routing::{Router, get, post};
use axum::{Extension, Json};
use campus_core::assistant::{self as bridge, AssistantError as BridgeError, webhook};
use campus_db::assistant::{assistant as assistant_db, conversation as conversation_db, message as message_db};
use campus_db::course::{course as course_db, enrollment as enrollment_db};
use campus_db::sea_orm::DatabaseConnection;
use campus_db::util::RequireRecord;
use campus_entity::assistant::assistant::Model as AssistantModel;
use campus_entity::course::course::Model as CourseModel;
use campus_entity::user::Model as UserModel;
use campus_model::assistant::{
    Assistant, AssistantConversation, AssistantDetail, AssistantMessage, Call, ConversationTranscript,
    LlmWebhookRequest, LlmWebhookResponse, NewAssistant, RegisterWebhookRequest, RegisterWebhookResponse,
    StartCall, UpdateAssistant, WebhookError,
};
use campus_model::validation::Validate;
use campus_model_tools::convert::FromDbModel;
use campus_voice::AgentApi;
use http::{HeaderMap, StatusCode, header};
use protect_axum::protect;
use serde::de::DeserializeOwned;
use serde_derive::Deserialize;
use serde_json::Value;
use std::error::Error;
use utoipa::IntoParams;
use uuid::Uuid;

const DEFAULT_CALL_LIMIT: u32 = 20;

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_assistants).post(create_assistant))
        .route("/webhooks/llm", post(llm_webhook))
        .route("/webhooks/register", post(register_webhook))
        .route("/conversations/{conversation}", get(get_conversation))
        .route(
            "/{assistant}",
            get(get_assistant).patch(update_assistant).delete(delete_assistant),
        )
        .route("/{assistant}/call", get(start_call))
        .route("/{assistant}/calls", get(list_calls))
        .route("/{assistant}/calls/{call}", get(get_call))
        .route("/{assistant}/calls/{call}/end", post(end_call))
        .with_state(())
}

#[derive(Debug, Deserialize, IntoParams)]
pub(crate) struct CallsQuery {
    /// Maximum number of calls, defaults to 20.
    limit: Option<u32>,
}

fn voice(app_config: &AppConfig) -> Result<&dyn AgentApi, AssistantError> {
    app_config.voice().ok_or(AssistantError::VoiceUnavailable)
}

async fn load_assistant(
    conn: &DatabaseConnection,
    assistant_id: Uuid,
) -> Result<(AssistantModel, CourseModel), AssistantError> {
    let assistant = assistant_db::Query::find_by_id(conn, assistant_id)
        .await?
        .ok_or(AssistantError::NotFound)?;
    let course = course_db::Query::find_by_id(conn, assistant.course_id).await.require()?;
    Ok((assistant, course))
}

/// Loads an assistant of a course the user teaches.
async fn load_managed_assistant(
    conn: &DatabaseConnection,
    assistant_id: Uuid,
    user: &UserModel,
) -> Result<(AssistantModel, CourseModel), AssistantError> {
    let (assistant, course) = load_assistant(conn, assistant_id).await?;
    if course.instructor_id != user.id {
        return Err(AssistantError::Forbidden);
    }
    Ok((assistant, course))
}

/// Loads an assistant the user may talk to.
async fn load_usable_assistant(
    conn: &DatabaseConnection,
    assistant_id: Uuid,
    user: &UserModel,
) -> Result<(AssistantModel, CourseModel), AssistantError> {
    let (assistant, course) = load_assistant(conn, assistant_id).await?;
    if !bridge::can_use(conn, &assistant, &course, user).await? {
        return Err(AssistantError::Forbidden);
    }
    Ok((assistant, course))
}

/// Calls are looked up at the vendor by id alone, so they have to be matched to the assistant's agent.
fn ensure_call_of(call: &Call, assistant: &AssistantModel) -> Result<(), AssistantError> {
    match call.0.get("agent_id").and_then(Value::as_str) {
        Some(agent_id) if agent_id == assistant.agent_id => Ok(()),
        _ => Err(AssistantError::NotFound),
    }
}

#[utoipa::path(
    get,
    path = "/api/v0/assistants",
    responses(
        (status = OK, description = "Assistants of taught courses and active assistants of attended courses", body = [Assistant]),
    ),
    tag = "v0/assistants",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn list_assistants(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
) -> Result<impl IntoResponse, AssistantError> {
    let teaching = course_db::Query::list_teaching(&conn, user.id).await?;
    let enrolled = course_db::Query::list_enrolled(&conn, user.id).await?;
    let active_ids = enrollment_db::Query::active_course_ids(&conn, user.id).await?;

    let taught: Vec<Uuid> = teaching.iter().map(|course| course.id).collect();
    let mut course_ids = taught.clone();
    course_ids.extend(active_ids);

    let mut assistants = Vec::new();
    for assistant in assistant_db::Query::list_for_courses(&conn, course_ids).await? {
        if !taught.contains(&assistant.course_id) && !assistant.is_active {
            continue;
        }
        let title = teaching
            .iter()
            .chain(enrolled.iter())
            .find(|course| course.id == assistant.course_id)
            .map(|course| course.title.clone());
        let title = match title {
            Some(title) => title,
            None => course_db::Query::find_by_id(&conn, assistant.course_id).await.require()?.title,
        };
        assistants.push(Assistant::from_db_model((assistant, title)));
    }
    Ok(Json(assistants))
}

#[utoipa::path(
    post,
    path = "/api/v0/assistants",
    request_body = NewAssistant,
    responses(
        (status = CREATED, description = "Agent registered at the vendor and assistant created", body = Assistant),
        (status = FORBIDDEN, description = "Caller does not teach the course"),
        (status = CONFLICT, description = "The course already has an assistant"),
        (status = BAD_GATEWAY, description = "The voice vendor rejected the request"),
        (status = SERVICE_UNAVAILABLE, description = "No voice vendor configured"),
    ),
    tag = "v0/assistants",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Teacher", ty = "Permission")]
pub(crate) async fn create_assistant(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Extension(app_config): Extension<AppConfig>,
    Json(body): Json<NewAssistant>,
) -> Result<impl IntoResponse, AssistantError> {
    body.validate().map_err(AssistantError::Validation)?;
    let course = course_db::Query::find_by_id(&conn, body.course_id)
        .await?
        .ok_or(AssistantError::NotFound)?;
    if course.instructor_id != user.id {
        return Err(AssistantError::Forbidden);
    }

    let api = voice(&app_config)?;
    let assistant = bridge::create_assistant(&conn, api, app_config.webhook_urls(), &course, body).await?;
    Ok((
        StatusCode::CREATED,
        Json(Assistant::from_db_model((assistant, course.title))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v0/assistants/{assistant}",
    responses(
        (status = OK, description = "The assistant with the caller's conversations", body = AssistantDetail),
        (status = FORBIDDEN, description = "Caller may not use this assistant"),
    ),
    params(
        ("assistant" = Uuid, Path, description = "Assistant id"),
    ),
    tag = "v0/assistants",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn get_assistant(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(assistant_id): Path<Uuid>,
) -> Result<impl IntoResponse, AssistantError> {
    let (assistant, course) = load_usable_assistant(&conn, assistant_id, &user).await?;
    let conversations = conversation_db::Query::list_for_assistant_and_user(&conn, assistant.id, user.id)
        .await?
        .into_iter()
        .map(AssistantConversation::from_db_model)
        .collect();

    Ok(Json(AssistantDetail {
        assistant: Assistant::from_db_model((assistant, course.title)),
        conversations,
    }))
}

#[utoipa::path(
    patch,
    path = "/api/v0/assistants/{assistant}",
    request_body = UpdateAssistant,
    responses(
        (status = OK, description = "Assistant updated here and at the vendor", body = Assistant),
        (status = FORBIDDEN, description = "Caller does not teach the course"),
        (status = BAD_GATEWAY, description = "The voice vendor rejected the update"),
    ),
    params(
        ("assistant" = Uuid, Path, description = "Assistant id"),
    ),
    tag = "v0/assistants",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Teacher", ty = "Permission")]
pub(crate) async fn update_assistant(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Extension(app_config): Extension<AppConfig>,
    Path(assistant_id): Path<Uuid>,
    Json(body): Json<UpdateAssistant>,
) -> Result<impl IntoResponse, AssistantError> {
    body.validate().map_err(AssistantError::Validation)?;
    let (assistant, course) = load_managed_assistant(&conn, assistant_id, &user).await?;
    let api = voice(&app_config)?;
    let assistant = bridge::update_assistant(&conn, api, &assistant, body).await?;
    Ok(Json(Assistant::from_db_model((assistant, course.title))))
}

#[utoipa::path(
    delete,
    path = "/api/v0/assistants/{assistant}",
    responses(
        (status = NO_CONTENT, description = "Assistant deleted here and at the vendor"),
        (status = FORBIDDEN, description = "Caller does not teach the course"),
    ),
    params(
        ("assistant" = Uuid, Path, description = "Assistant id"),
    ),
    tag = "v0/assistants",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Teacher", ty = "Permission")]
pub(crate) async fn delete_assistant(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Extension(app_config): Extension<AppConfig>,
    Path(assistant_id): Path<Uuid>,
) -> Result<impl IntoResponse, AssistantError> {
    let (assistant, course) = load_managed_assistant(&conn, assistant_id, &user).await?;
    let api = voice(&app_config)?;
    bridge::delete_assistant(&conn, api, &assistant).await?;
    tracing::info!(course = %course.slug, agent_id = %assistant.agent_id, "deleted assistant");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v0/assistants/{assistant}/call",
    responses(
        (status = OK, description = "Parameters for opening a web call", body = StartCall),
        (status = FORBIDDEN, description = "Caller may not use this assistant"),
    ),
    params(
        ("assistant" = Uuid, Path, description = "Assistant id"),
    ),
    tag = "v0/assistants",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn start_call(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Extension(app_config): Extension<AppConfig>,
    Path(assistant_id): Path<Uuid>,
) -> Result<impl IntoResponse, AssistantError> {
    let (assistant, _) = load_usable_assistant(&conn, assistant_id, &user).await?;
    Ok(Json(bridge::start_call(
        &assistant,
        &user,
        app_config.voice_public_key().map(ToOwned::to_owned),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v0/assistants/{assistant}/calls",
    params(
        ("assistant" = Uuid, Path, description = "Assistant id"),
        CallsQuery,
    ),
    responses(
        (status = OK, description = "Recent calls of the agent as reported by the vendor", body = [Call]),
        (status = FORBIDDEN, description = "Caller does not teach the course"),
    ),
    tag = "v0/assistants",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Teacher", ty = "Permission")]
pub(crate) async fn list_calls(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Extension(app_config): Extension<AppConfig>,
    Path(assistant_id): Path<Uuid>,
    Query(query): Query<CallsQuery>,
) -> Result<impl IntoResponse, AssistantError> {
    let (assistant, _) = load_managed_assistant(&conn, assistant_id, &user).await?;
    let api = voice(&app_config)?;
    let calls = bridge::list_calls(api, &assistant, query.limit.unwrap_or(DEFAULT_CALL_LIMIT)).await?;
    Ok(Json(calls))
}

#[utoipa::path(
    get,
    path = "/api/v0/assistants/{assistant}/calls/{call}",
    responses(
        (status = OK, description = "The call as reported by the vendor", body = Call),
        (status = NOT_FOUND, description = "No such call of this assistant"),
    ),
    params(
        ("assistant" = Uuid, Path, description = "Assistant id"),
        ("call" = String, Path, description = "Vendor call id"),
    ),
    tag = "v0/assistants",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Teacher", ty = "Permission")]
pub(crate) async fn get_call(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Extension(app_config): Extension<AppConfig>,
    Path((assistant_id, call_id)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, AssistantError> {
    let (assistant, _) = load_managed_assistant(&conn, assistant_id, &user).await?;
    let api = voice(&app_config)?;
    let call = bridge::get_call(api, &call_id).await?;
    ensure_call_of(&call, &assistant)?;
    Ok(Json(call))
}

#[utoipa::path(
    post,
    path = "/api/v0/assistants/{assistant}/calls/{call}/end",
    responses(
        (status = OK, description = "Call ended, its conversations are closed", body = Call),
        (status = NOT_FOUND, description = "No such call of this assistant"),
    ),
    params(
        ("assistant" = Uuid, Path, description = "Assistant id"),
        ("call" = String, Path, description = "Vendor call id"),
    ),
    tag = "v0/assistants",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Teacher", ty = "Permission")]
pub(crate) async fn end_call(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Extension(app_config): Extension<AppConfig>,
    Path((assistant_id, call_id)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, AssistantError> {
    let (assistant, _) = load_managed_assistant(&conn, assistant_id, &user).await?;
    let api = voice(&app_config)?;
    ensure_call_of(&bridge::get_call(api, &call_id).await?, &assistant)?;
    let call = bridge::end_call(&conn, api, &call_id).await?;
    Ok(Json(call))
}

#[utoipa::path(
    get,
    path = "/api/v0/assistants/conversations/{conversation}",
    responses(
        (status = OK, description = "Conversation with its transcript", body = ConversationTranscript),
        (status = FORBIDDEN, description = "Caller neither had the conversation nor teaches the course"),
    ),
    params(
        ("conversation" = Uuid, Path, description = "Assistant conversation id"),
    ),
    tag = "v0/assistants",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn get_conversation(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(conversation_id): Path<Uuid>,
) -> Result<impl IntoResponse, AssistantError> {
    let conversation = conversation_db::Query::find_by_id(&conn, conversation_id)
        .await?
        .ok_or(AssistantError::NotFound)?;
    let (_, course) = load_assistant(&conn, conversation.assistant_id).await?;
    if conversation.user_id != Some(user.id) && course.instructor_id != user.id {
        return Err(AssistantError::Forbidden);
    }

    let messages = message_db::Query::list_for_conversation(&conn, conversation.id)
        .await?
        .into_iter()
        .map(AssistantMessage::from_db_model)
        .collect();
    Ok(Json(ConversationTranscript {
        conversation: AssistantConversation::from_db_model(conversation),
        messages,
    }))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
}

fn webhook_error(status: StatusCode, error: impl Into<String>) -> Response {
    (status, Json(WebhookError { error: error.into() })).into_response()
}

fn parse_webhook<T: DeserializeOwned>(body: &Bytes) -> Result<T, Response> {
    serde_json::from_slice(body).map_err(|error| {
        tracing::debug!(error = &error as &dyn Error, "malformed webhook payload");
        webhook_error(StatusCode::BAD_REQUEST, format!("invalid payload: {error}"))
    })
}

fn webhook_failure(error: BridgeError) -> Response {
    match error {
        BridgeError::UnknownAgent => webhook_error(StatusCode::NOT_FOUND, "Assistant not found"),
        BridgeError::UnknownUser => webhook_error(StatusCode::NOT_FOUND, "User not found"),
        BridgeError::InvalidToken => webhook_error(StatusCode::UNAUTHORIZED, "Invalid webhook token"),
        BridgeError::SessionConflict => webhook_error(StatusCode::CONFLICT, "Session belongs to another assistant"),
        error => {
            tracing::error!(error = &error as &dyn Error, "webhook failed");
            webhook_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    }
}

/// Called by the vendor for every caller utterance. Authenticated by the assistant's webhook token.
#[utoipa::path(
    post,
    path = "/api/v0/assistants/webhooks/llm",
    request_body = LlmWebhookRequest,
    responses(
        (status = OK, description = "Messages for the agent to speak", body = LlmWebhookResponse),
        (status = BAD_REQUEST, description = "Malformed payload", body = WebhookError),
        (status = UNAUTHORIZED, description = "Wrong webhook token", body = WebhookError),
        (status = NOT_FOUND, description = "Unknown agent", body = WebhookError),
        (status = CONFLICT, description = "Session opened by another agent", body = WebhookError),
    ),
    tag = "v0/assistants",
)]
pub(crate) async fn llm_webhook(
    Extension(conn): Extension<DatabaseConnection>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request: LlmWebhookRequest = match parse_webhook(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    match webhook::handle_llm_webhook(&conn, request, bearer_token(&headers)).await {
        Ok(response) => Json(response).into_response(),
        Err(error) => webhook_failure(error),
    }
}

/// Called by the vendor when a web call starts, binding the session to the calling user.
#[utoipa::path(
    post,
    path = "/api/v0/assistants/webhooks/register",
    request_body = RegisterWebhookRequest,
    responses(
        (status = OK, description = "Session bound to the user", body = RegisterWebhookResponse),
        (status = BAD_REQUEST, description = "Malformed payload", body = WebhookError),
        (status = UNAUTHORIZED, description = "Wrong webhook token", body = WebhookError),
        (status = NOT_FOUND, description = "Unknown agent or user", body = WebhookError),
    ),
    tag = "v0/assistants",
)]
pub(crate) async fn register_webhook(
    Extension(conn): Extension<DatabaseConnection>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request: RegisterWebhookRequest = match parse_webhook(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    match webhook::handle_register_webhook(&conn, request, bearer_token(&headers)).await {
        Ok(response) => Json(response).into_response(),
        Err(error) => webhook_failure(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers), Some("abc123"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc123"));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_ensure_call_of() {
        let now = chrono::Utc::now().fixed_offset();
        let assistant = AssistantModel {
            id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            name: "Physics Assistant".to_owned(),
            voice: campus_entity::assistant::assistant::Voice::Nova,
            greeting_message: "Hi".to_owned(),
            is_active: true,
            agent_id: "agent_1".to_owned(),
            webhook_token: None,
            created_at: now,
            updated_at: now,
        };
        let own = Call(serde_json::json!({"call_id": "c1", "agent_id": "agent_1"}));
        let other = Call(serde_json::json!({"call_id": "c2", "agent_id": "agent_2"}));
        assert!(ensure_call_of(&own, &assistant).is_ok());
        assert!(matches!(ensure_call_of(&other, &assistant), Err(AssistantError::NotFound)));
        assert!(matches!(
            ensure_call_of(&Call(Value::Null), &assistant),
            Err(AssistantError::NotFound)
        ));
    }
}
