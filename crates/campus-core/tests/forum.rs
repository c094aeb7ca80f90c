mod common;

use crate::common::{connect, create_test_course, create_test_user};
use campus_core::access::{can_access_forum, can_moderate};
use campus_core::enrollment;
use campus_core::forum::{self, ForumError};
use campus_db::forum::{forum as forums, post, subscription, topic};
use campus_db::notification;
use campus_entity::forum::post::ActiveModel as PostActiveModel;
use campus_entity::notification::{NotificationType, RelatedObject};
use campus_entity::user::Role;
use chrono::Duration;
use sea_orm::ActiveModelTrait;
use sea_orm::ActiveValue::Set;
use test_log::test;
use uuid::Uuid;

#[test(tokio::test)]
async fn test_reply_notifies_every_other_subscriber() {
    let db = &connect().await;
    let author = create_test_user(db, "author", Role::Student).await;
    let alice = create_test_user(db, "alice", Role::Student).await;
    let bob = create_test_user(db, "bob", Role::Teacher).await;
    let forum = forums::Mutation::create_forum(db, "General".to_owned(), "general".to_owned(), String::new(), None)
        .await
        .unwrap();

    let (topic, _) = forum::create_topic(db, forum.id, author.id, "Hello world".to_owned(), "First!".to_owned())
        .await
        .unwrap();
    assert_eq!(topic.slug, "hello-world");
    assert!(subscription::Query::is_subscribed(db, author.id, topic.id).await.unwrap());
    subscription::Mutation::subscribe(db, alice.id, topic.id).await.unwrap();
    subscription::Mutation::subscribe(db, alice.id, topic.id).await.unwrap();
    subscription::Mutation::subscribe(db, bob.id, topic.id).await.unwrap();

    let reply = forum::reply(db, &topic, &forum.slug, &alice, "Welcome".to_owned(), false)
        .await
        .unwrap();

    assert!(notification::Query::list_for_user(db, alice.id, false).await.unwrap().is_empty());
    for user in [&author, &bob] {
        let notifications = notification::Query::list_for_user(db, user.id, true).await.unwrap();
        assert_eq!(notifications.len(), 1);
        let notification = &notifications[0];
        assert_eq!(notification.notification_type, NotificationType::ForumPost);
        assert_eq!(notification.title, "New reply in \"Hello world\"");
        assert_eq!(
            notification.related_link.as_deref(),
            Some("/api/v0/forums/general/topics/hello-world")
        );
        assert_eq!(notification.related_object(), Some(RelatedObject::ForumPost(reply.id)));
    }
}

#[test(tokio::test)]
async fn test_topic_slugs_are_unique_per_forum() {
    let db = &connect().await;
    let author = create_test_user(db, "author", Role::Student).await;
    let forum = forums::Mutation::create_forum(db, "General".to_owned(), "general".to_owned(), String::new(), None)
        .await
        .unwrap();

    let mut slugs = vec![];
    for _ in 0..3 {
        let (topic, _) = forum::create_topic(db, forum.id, author.id, "Question".to_owned(), "?".to_owned())
            .await
            .unwrap();
        slugs.push(topic.slug);
    }
    assert_eq!(slugs, ["question", "question-2", "question-3"]);
}

#[test(tokio::test)]
async fn test_closed_topic_only_takes_moderator_replies() {
    let db = &connect().await;
    let author = create_test_user(db, "author", Role::Student).await;
    let admin = create_test_user(db, "admin", Role::Admin).await;
    let forum = forums::Mutation::create_forum(db, "General".to_owned(), "general".to_owned(), String::new(), None)
        .await
        .unwrap();
    let (topic, _) = forum::create_topic(db, forum.id, author.id, "Closed".to_owned(), "...".to_owned())
        .await
        .unwrap();
    let topic = topic::Mutation::set_closed(db, topic.id, true).await.unwrap();

    let result = forum::reply(db, &topic, &forum.slug, &author, "Hello?".to_owned(), false).await;
    assert!(matches!(result, Err(ForumError::Closed)));

    let is_moderator = can_moderate(db, &forum, &admin).await.unwrap();
    assert!(is_moderator);
    forum::reply(db, &topic, &forum.slug, &admin, "Closed for good".to_owned(), is_moderator)
        .await
        .unwrap();
}

#[test(tokio::test)]
async fn test_first_post_cannot_be_deleted() {
    let db = &connect().await;
    let author = create_test_user(db, "author", Role::Student).await;
    let other = create_test_user(db, "other", Role::Student).await;
    let forum = forums::Mutation::create_forum(db, "General".to_owned(), "general".to_owned(), String::new(), None)
        .await
        .unwrap();
    let (topic, first) = forum::create_topic(db, forum.id, author.id, "Topic".to_owned(), "Opening".to_owned())
        .await
        .unwrap();
    let reply = forum::reply(db, &topic, &forum.slug, &author, "Reply".to_owned(), false)
        .await
        .unwrap();

    let result = forum::delete_post(db, &first).await;
    assert!(matches!(result, Err(ForumError::FirstPost)));

    assert!(forum::can_edit_post(&reply, &author, false));
    assert!(!forum::can_edit_post(&reply, &other, false));
    assert!(forum::can_edit_post(&reply, &other, true));
    forum::delete_post(db, &reply).await.unwrap();
    assert!(post::Query::find_by_id(db, reply.id).await.unwrap().is_none());
    assert!(post::Query::find_by_id(db, first.id).await.unwrap().is_some());
}

#[test(tokio::test)]
async fn test_opening_post_does_not_depend_on_timestamps() {
    let db = &connect().await;
    let author = create_test_user(db, "author", Role::Student).await;
    let forum = forums::Mutation::create_forum(db, "General".to_owned(), "general".to_owned(), String::new(), None)
        .await
        .unwrap();
    let (topic, first) = forum::create_topic(db, forum.id, author.id, "Topic".to_owned(), "Opening".to_owned())
        .await
        .unwrap();
    assert_eq!(topic.first_post_id, Some(first.id));

    let backdated = first.created_at - Duration::seconds(5);
    let earlier = PostActiveModel {
        id: Set(Uuid::new_v4()),
        topic_id: Set(topic.id),
        content: Set("Imported reply".to_owned()),
        created_by: Set(author.id),
        created_at: Set(backdated),
        updated_at: Set(backdated),
        is_edited: Set(false),
    }
    .insert(db)
    .await
    .unwrap();

    let result = forum::delete_post(db, &first).await;
    assert!(matches!(result, Err(ForumError::FirstPost)));
    forum::delete_post(db, &earlier).await.unwrap();
    assert!(post::Query::find_by_id(db, earlier.id).await.unwrap().is_none());
}

#[test(tokio::test)]
async fn test_course_forum_access() {
    let db = &connect().await;
    let teacher = create_test_user(db, "teacher", Role::Teacher).await;
    let student = create_test_user(db, "student", Role::Student).await;
    let stranger = create_test_user(db, "stranger", Role::Student).await;
    let admin = create_test_user(db, "admin", Role::Admin).await;
    let (course, _) = create_test_course(db, &teacher, "rust-101").await;
    enrollment::enroll_self(db, &course, &student).await.unwrap();
    let forum = forums::Mutation::create_forum(
        db,
        "Rust 101".to_owned(),
        "rust-101".to_owned(),
        String::new(),
        Some(course.id),
    )
    .await
    .unwrap();

    assert!(can_access_forum(db, &forum, &teacher).await.unwrap());
    assert!(can_access_forum(db, &forum, &student).await.unwrap());
    assert!(can_access_forum(db, &forum, &admin).await.unwrap());
    assert!(!can_access_forum(db, &forum, &stranger).await.unwrap());

    assert!(can_moderate(db, &forum, &teacher).await.unwrap());
    assert!(!can_moderate(db, &forum, &student).await.unwrap());
}
