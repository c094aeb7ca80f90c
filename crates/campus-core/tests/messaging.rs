mod common;

use crate::common::{connect, create_test_user};
use campus_core::messaging::{self, MessagingError};
use campus_db::messaging::{conversation, message};
use campus_db::notification;
use campus_entity::notification::{NotificationType, RelatedObject};
use campus_entity::user::Role;
use test_log::test;
use uuid::Uuid;

#[test(tokio::test)]
async fn test_start_conversation_notifies_recipients() {
    let db = &connect().await;
    let alice = create_test_user(db, "alice", Role::Student).await;
    let bob = create_test_user(db, "bob", Role::Student).await;
    let carol = create_test_user(db, "carol", Role::Teacher).await;

    let long = "x".repeat(120);
    let (conversation, first) =
        messaging::start_conversation(db, &alice, "Project".to_owned(), vec![bob.id, carol.id], long.clone())
            .await
            .unwrap();

    let mut participants = conversation::Query::participant_ids(db, conversation.id).await.unwrap();
    participants.sort();
    let mut expected = vec![alice.id, bob.id, carol.id];
    expected.sort();
    assert_eq!(participants, expected);

    assert_eq!(notification::Query::unread_count(db, alice.id).await.unwrap(), 0);
    let notifications = notification::Query::list_for_user(db, bob.id, true).await.unwrap();
    assert_eq!(notifications.len(), 1);
    let notification = &notifications[0];
    assert_eq!(notification.notification_type, NotificationType::Message);
    assert_eq!(notification.title, "New message from alice");
    assert_eq!(notification.message, format!("Project: {}...", "x".repeat(100)));
    assert_eq!(
        notification.related_link.as_deref(),
        Some(messaging::conversation_link(conversation.id).as_str())
    );
    assert_eq!(notification.related_object(), Some(RelatedObject::Message(first.id)));
}

#[test(tokio::test)]
async fn test_unknown_recipient_is_rejected() {
    let db = &connect().await;
    let alice = create_test_user(db, "alice", Role::Student).await;
    let missing = Uuid::new_v4();

    let result = messaging::start_conversation(db, &alice, "Hi".to_owned(), vec![missing], "Hello".to_owned()).await;
    assert!(matches!(result, Err(MessagingError::UnknownRecipient(id)) if id == missing));
    assert!(conversation::Query::list_for_user(db, alice.id).await.unwrap().is_empty());
}

#[test(tokio::test)]
async fn test_reply_read_and_leave() {
    let db = &connect().await;
    let alice = create_test_user(db, "alice", Role::Student).await;
    let bob = create_test_user(db, "bob", Role::Student).await;
    let mallory = create_test_user(db, "mallory", Role::Student).await;
    let (conversation, _) =
        messaging::start_conversation(db, &alice, "Lunch".to_owned(), vec![bob.id], "Pizza?".to_owned())
            .await
            .unwrap();

    let result = messaging::send_message(db, conversation.id, &mallory, "Me too".to_owned()).await;
    assert!(matches!(result, Err(MessagingError::NotParticipant)));

    let answer = messaging::send_message(db, conversation.id, &bob, "Sure".to_owned()).await.unwrap();
    assert_eq!(message::Query::unread_count_for_user(db, alice.id).await.unwrap(), 1);
    assert_eq!(notification::Query::unread_count(db, alice.id).await.unwrap(), 1);

    let result = messaging::delete_message(db, &answer, &alice).await;
    assert!(matches!(result, Err(MessagingError::NotSender)));

    assert_eq!(messaging::mark_conversation_read(db, conversation.id, alice.id).await.unwrap(), 1);
    assert_eq!(message::Query::unread_count_for_user(db, alice.id).await.unwrap(), 0);
    assert_eq!(notification::Query::unread_count(db, alice.id).await.unwrap(), 0);

    assert!(!messaging::leave_conversation(db, conversation.id, alice.id).await.unwrap());
    assert!(messaging::leave_conversation(db, conversation.id, bob.id).await.unwrap());
    assert!(conversation::Query::find_by_id(db, conversation.id).await.unwrap().is_none());
}
