pub(crate) mod error;

use crate::permissions::Permission;
use crate::routes::api::v0::messages::error::MessageError;
use crate::user::{ExtractUser, ExtractUserId};
use axum::extract::Path;
use axum::response::IntoResponse;
use axum::routing::{Router, delete, get, post};
use axum::{Extension, Json};
use campus_core::messaging;
use campus_db::messaging::{conversation as conversation_db, message as message_db};
use campus_db::sea_orm::DatabaseConnection;
use campus_db::user;
use campus_entity::messaging::conversation::Model as ConversationModel;
use campus_entity::user::Model as UserModel;
use campus_model::messaging::{
    Conversation, ConversationDetail, ConversationSummary, Message, NewConversation, NewMessage, UnreadCount,
};
use campus_model::validation::Validate;
use campus_model_tools::convert::FromDbModel;
use chrono::Utc;
use http::StatusCode;
use protect_axum::protect;
use uuid::Uuid;

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_conversations).post(start_conversation))
        .route("/unread", get(unread_count))
        .route("/{conversation}", get(get_conversation).delete(leave_conversation))
        .route("/{conversation}/messages", post(send_message))
        .route("/{conversation}/messages/{message}", delete(delete_message))
        .with_state(())
}

async fn participants(conn: &DatabaseConnection, conversation_id: Uuid) -> Result<Vec<UserModel>, MessageError> {
    let ids = conversation_db::Query::participant_ids(conn, conversation_id).await?;
    Ok(user::Query::find_users_by_ids(conn, ids).await?)
}

/// Loads a conversation of which `user_id` is a participant.
async fn load_conversation(
    conn: &DatabaseConnection,
    conversation_id: Uuid,
    user_id: Uuid,
) -> Result<ConversationModel, MessageError> {
    let conversation = conversation_db::Query::find_by_id(conn, conversation_id)
        .await?
        .ok_or(MessageError::NotFound)?;
    if !conversation_db::Query::is_participant(conn, conversation.id, user_id).await? {
        return Err(messaging::MessagingError::NotParticipant.into());
    }
    Ok(conversation)
}

#[utoipa::path(
    get,
    path = "/api/v0/messages",
    responses(
        (status = OK, description = "Conversations of the user, most recently active first", body = [ConversationSummary]),
    ),
    tag = "v0/messages",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn list_conversations(
    ExtractUserId(user_id): ExtractUserId,
    Extension(conn): Extension<DatabaseConnection>,
) -> Result<impl IntoResponse, MessageError> {
    let mut summaries = Vec::new();
    for conversation in conversation_db::Query::list_for_user(&conn, user_id).await? {
        let participants = participants(&conn, conversation.id).await?;
        let unread_count = message_db::Query::unread_in_conversation(&conn, conversation.id, user_id).await?;
        let last_message_at = message_db::Query::latest_in_conversation(&conn, conversation.id)
            .await?
            .map(|message| message.created_at.with_timezone(&Utc));
        summaries.push(ConversationSummary {
            conversation: Conversation::from_db_model((conversation, participants.as_slice())),
            unread_count,
            last_message_at,
        });
    }
    Ok(Json(summaries))
}

#[utoipa::path(
    post,
    path = "/api/v0/messages",
    request_body = NewConversation,
    responses(
        (status = CREATED, description = "Conversation started, the recipients are notified", body = ConversationDetail),
        (status = BAD_REQUEST, description = "Invalid input or unknown recipient"),
    ),
    tag = "v0/messages",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn start_conversation(
    ExtractUser(sender): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Json(body): Json<NewConversation>,
) -> Result<impl IntoResponse, MessageError> {
    body.validate().map_err(MessageError::Validation)?;
    let recipients = body
        .participants
        .into_iter()
        .filter(|id| *id != sender.id)
        .collect();

    let (conversation, message) =
        messaging::start_conversation(&conn, &sender, body.subject, recipients, body.content).await?;
    let participants = participants(&conn, conversation.id).await?;
    tracing::info!(conversation_id = %conversation.id, "started conversation");

    Ok((
        StatusCode::CREATED,
        Json(ConversationDetail {
            conversation: Conversation::from_db_model((conversation, participants.as_slice())),
            messages: vec![Message::from_db_model((message, &sender))],
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v0/messages/unread",
    responses(
        (status = OK, description = "Number of unread messages written by others", body = UnreadCount),
    ),
    tag = "v0/messages",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn unread_count(
    ExtractUserId(user_id): ExtractUserId,
    Extension(conn): Extension<DatabaseConnection>,
) -> Result<impl IntoResponse, MessageError> {
    let count = message_db::Query::unread_count_for_user(&conn, user_id).await?;
    Ok(Json(UnreadCount { count }))
}

#[utoipa::path(
    get,
    path = "/api/v0/messages/{conversation}",
    responses(
        (status = OK, description = "Conversation with its messages, which are now read", body = ConversationDetail),
        (status = FORBIDDEN, description = "Caller is not a participant"),
    ),
    params(
        ("conversation" = Uuid, Path, description = "Conversation id"),
    ),
    tag = "v0/messages",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn get_conversation(
    ExtractUserId(user_id): ExtractUserId,
    Extension(conn): Extension<DatabaseConnection>,
    Path(conversation_id): Path<Uuid>,
) -> Result<impl IntoResponse, MessageError> {
    let conversation = load_conversation(&conn, conversation_id, user_id).await?;
    let read = messaging::mark_conversation_read(&conn, conversation.id, user_id).await?;
    tracing::debug!(conversation_id = %conversation.id, read, "marked messages read");

    let messages = message_db::Query::list_for_conversation(&conn, conversation.id)
        .await?
        .into_iter()
        .filter_map(|(message, sender)| Some(Message::from_db_model((message, &sender?))))
        .collect();
    let participants = participants(&conn, conversation.id).await?;

    Ok(Json(ConversationDetail {
        conversation: Conversation::from_db_model((conversation, participants.as_slice())),
        messages,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v0/messages/{conversation}/messages",
    request_body = NewMessage,
    responses(
        (status = CREATED, description = "Message sent, the other participants are notified", body = Message),
        (status = FORBIDDEN, description = "Caller is not a participant"),
    ),
    params(
        ("conversation" = Uuid, Path, description = "Conversation id"),
    ),
    tag = "v0/messages",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn send_message(
    ExtractUser(sender): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(conversation_id): Path<Uuid>,
    Json(body): Json<NewMessage>,
) -> Result<impl IntoResponse, MessageError> {
    let conversation = conversation_db::Query::find_by_id(&conn, conversation_id)
        .await?
        .ok_or(MessageError::NotFound)?;
    body.validate().map_err(MessageError::Validation)?;

    let message = messaging::send_message(&conn, conversation.id, &sender, body.content).await?;
    Ok((StatusCode::CREATED, Json(Message::from_db_model((message, &sender)))))
}

#[utoipa::path(
    delete,
    path = "/api/v0/messages/{conversation}",
    responses(
        (status = NO_CONTENT, description = "Caller left, the conversation is gone once nobody is left"),
        (status = FORBIDDEN, description = "Caller is not a participant"),
    ),
    params(
        ("conversation" = Uuid, Path, description = "Conversation id"),
    ),
    tag = "v0/messages",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn leave_conversation(
    ExtractUserId(user_id): ExtractUserId,
    Extension(conn): Extension<DatabaseConnection>,
    Path(conversation_id): Path<Uuid>,
) -> Result<impl IntoResponse, MessageError> {
    let conversation = conversation_db::Query::find_by_id(&conn, conversation_id)
        .await?
        .ok_or(MessageError::NotFound)?;
    if messaging::leave_conversation(&conn, conversation.id, user_id).await? {
        tracing::info!(conversation_id = %conversation.id, "deleted abandoned conversation");
    }
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/v0/messages/{conversation}/messages/{message}",
    responses(
        (status = NO_CONTENT, description = "Message deleted"),
        (status = FORBIDDEN, description = "Caller neither sent the message nor is staff"),
    ),
    params(
        ("conversation" = Uuid, Path, description = "Conversation id"),
        ("message" = Uuid, Path, description = "Message id"),
    ),
    tag = "v0/messages",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn delete_message(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path((conversation_id, message_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, MessageError> {
    let message = message_db::Query::find_by_id(&conn, message_id)
        .await?
        .filter(|message| message.conversation_id == conversation_id)
        .ok_or(MessageError::NotFound)?;
    messaging::delete_message(&conn, &message, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}
