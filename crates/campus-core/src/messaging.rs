use campus_db::messaging::{conversation, message};
use campus_db::notification::{self, NewNotification};
use campus_db::user;
use campus_db::util::FlattenTransactionResultExt;
use campus_entity::messaging::conversation::Model as Conversation;
use campus_entity::messaging::message::Model as Message;
use campus_entity::notification::{NotificationType, RelatedObject};
use campus_entity::user::Model as User;
use sea_orm::{ConnectionTrait, DbErr, TransactionTrait};
use std::error::Error;
use thiserror::Error;
use uuid::Uuid;

const PREVIEW_LENGTH: usize = 100;

#[derive(Debug, Error)]
pub enum MessagingError {
    #[error(transparent)]
    Db(#[from] DbErr),
    #[error("Not a participant of this conversation")]
    NotParticipant,
    #[error("Unknown recipient {0}")]
    UnknownRecipient(Uuid),
    #[error("Only the sender can delete a message")]
    NotSender,
}

/// The first hundred characters of a message, with `...` appended when it was cut.
#[must_use]
pub fn preview(content: &str) -> String {
    match content.char_indices().nth(PREVIEW_LENGTH) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_owned(),
    }
}

#[must_use]
pub fn conversation_link(conversation_id: Uuid) -> String {
    format!("/api/v0/messages/{conversation_id}")
}

fn message_notification(sender: &User, conversation_id: Uuid, message_id: Uuid, text: String) -> NewNotification {
    NewNotification {
        notification_type: NotificationType::Message,
        title: format!("New message from {}", sender.username),
        message: text,
        related_link: Some(conversation_link(conversation_id)),
        related: Some(RelatedObject::Message(message_id)),
    }
}

/// Starts a conversation between `sender` and `recipients` with a first message. The sender is
/// always a participant; the others are notified.
pub async fn start_conversation<C: ConnectionTrait + TransactionTrait>(
    conn: &C,
    sender: &User,
    subject: String,
    recipients: Vec<Uuid>,
    content: String,
) -> Result<(Conversation, Message), MessagingError> {
    let known = user::Query::find_users_by_ids(conn, recipients.clone()).await?;
    if let Some(missing) = recipients.iter().find(|id| !known.iter().any(|user| user.id == **id)) {
        return Err(MessagingError::UnknownRecipient(*missing));
    }

    let sender = sender.clone();
    conn.transaction::<_, _, MessagingError>(|txn| {
        Box::pin(async move {
            let mut participants = recipients;
            participants.push(sender.id);
            let conversation = conversation::Mutation::create_conversation(txn, subject, participants).await?;
            let text = format!("{}: {}", conversation.subject, preview(&content));
            let message = message::Mutation::create_message(txn, conversation.id, sender.id, content).await?;

            let others = other_participants(txn, conversation.id, sender.id).await?;
            notification::Mutation::create_notifications(
                txn,
                others,
                message_notification(&sender, conversation.id, message.id, text),
            )
            .await?;
            Ok((conversation, message))
        })
    })
    .await
    .flatten_res()
    .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to start conversation"))
}

/// Appends a message, bumps the conversation and notifies the other participants.
pub async fn send_message<C: ConnectionTrait + TransactionTrait>(
    conn: &C,
    conversation_id: Uuid,
    sender: &User,
    content: String,
) -> Result<Message, MessagingError> {
    if !conversation::Query::is_participant(conn, conversation_id, sender.id).await? {
        return Err(MessagingError::NotParticipant);
    }
    let sender = sender.clone();
    conn.transaction::<_, _, MessagingError>(|txn| {
        Box::pin(async move {
            let text = preview(&content);
            let message = message::Mutation::create_message(txn, conversation_id, sender.id, content).await?;
            conversation::Mutation::touch(txn, conversation_id).await?;

            let others = other_participants(txn, conversation_id, sender.id).await?;
            notification::Mutation::create_notifications(
                txn,
                others,
                message_notification(&sender, conversation_id, message.id, text),
            )
            .await?;
            Ok(message)
        })
    })
    .await
    .flatten_res()
}

async fn other_participants<C: ConnectionTrait>(
    conn: &C,
    conversation_id: Uuid,
    user_id: Uuid,
) -> Result<Vec<Uuid>, DbErr> {
    Ok(conversation::Query::participant_ids(conn, conversation_id)
        .await?
        .into_iter()
        .filter(|id| *id != user_id)
        .collect())
}

/// Marks what others wrote as read, together with the reader's notifications about it.
pub async fn mark_conversation_read<C: ConnectionTrait>(
    conn: &C,
    conversation_id: Uuid,
    reader_id: Uuid,
) -> Result<usize, DbErr> {
    let read = message::Mutation::mark_read_from_others(conn, conversation_id, reader_id).await?;
    let count = read.len();
    notification::Mutation::mark_read_for_messages(conn, reader_id, read).await?;
    Ok(count)
}

/// Removes the user from the conversation and deletes it once nobody is left. Returns `true` when
/// the conversation was deleted.
pub async fn leave_conversation<C: ConnectionTrait + TransactionTrait>(
    conn: &C,
    conversation_id: Uuid,
    user_id: Uuid,
) -> Result<bool, MessagingError> {
    if !conversation::Query::is_participant(conn, conversation_id, user_id).await? {
        return Err(MessagingError::NotParticipant);
    }
    conn.transaction::<_, _, MessagingError>(|txn| {
        Box::pin(async move {
            conversation::Mutation::remove_participant(txn, conversation_id, user_id).await?;
            if message::Query::participant_count(txn, conversation_id).await? == 0 {
                conversation::Mutation::delete_conversation(txn, conversation_id).await?;
                return Ok(true);
            }
            Ok(false)
        })
    })
    .await
    .flatten_res()
}

pub async fn delete_message<C: ConnectionTrait>(conn: &C, message: &Message, user: &User) -> Result<(), MessagingError> {
    if message.sender_id != user.id && !user.is_staff() {
        return Err(MessagingError::NotSender);
    }
    message::Mutation::delete_message(conn, message.id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview() {
        assert_eq!(preview("short"), "short");
        let exact = "a".repeat(100);
        assert_eq!(preview(&exact), exact);
        let long = "b".repeat(150);
        assert_eq!(preview(&long), format!("{}...", "b".repeat(100)));
        let umlauts = "ü".repeat(101);
        assert_eq!(preview(&umlauts), format!("{}...", "ü".repeat(100)));
    }

    #[test]
    fn test_conversation_link() {
        let id = Uuid::nil();
        assert_eq!(conversation_link(id), format!("/api/v0/messages/{id}"));
    }
}
