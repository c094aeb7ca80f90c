mod common;

use crate::common::setup_schema;
use crate::common::user::create_test_user;
use campus_db::forum::{forum, post, subscription, topic};
use campus_db::util::UniqueViolation;
use campus_entity::user::Role;
use sea_orm::Database;
use test_log::test;

#[test(tokio::test)]
async fn test_forum_slug_is_unique() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();

    forum::Mutation::create_forum(db, "General".to_owned(), "general".to_owned(), String::new(), None)
        .await
        .unwrap();
    let error = forum::Mutation::create_forum(db, "General".to_owned(), "general".to_owned(), String::new(), None)
        .await
        .unwrap_err();
    assert!(error.is_unique_violation());
    assert_eq!(forum::Query::list_general(db).await.unwrap().len(), 1);
}

#[test(tokio::test)]
async fn test_topic_activity() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();
    let author = create_test_user(db, "author", Role::Student).await;
    let reader = create_test_user(db, "reader", Role::Student).await;
    let forum = forum::Mutation::create_forum(db, "General".to_owned(), "general".to_owned(), String::new(), None)
        .await
        .unwrap();

    let first = topic::Mutation::create_topic(db, forum.id, author.id, "Hello".to_owned(), "hello".to_owned())
        .await
        .unwrap();
    let second = topic::Mutation::create_topic(db, forum.id, author.id, "Rules".to_owned(), "rules".to_owned())
        .await
        .unwrap();
    assert!(topic::Query::slug_exists(db, forum.id, "hello").await.unwrap());
    assert!(!topic::Query::slug_exists(db, forum.id, "hello-1").await.unwrap());

    topic::Mutation::set_pinned(db, first.id, true).await.unwrap();
    let order: Vec<_> = topic::Query::list_for_forum(db, forum.id)
        .await
        .unwrap()
        .into_iter()
        .map(|topic| topic.id)
        .collect();
    assert_eq!(order, [first.id, second.id]);

    topic::Mutation::increment_views(db, first.id).await.unwrap();
    topic::Mutation::increment_views(db, first.id).await.unwrap();
    assert_eq!(topic::Query::find_by_id(db, first.id).await.unwrap().unwrap().views, 2);

    let opening = post::Mutation::create_post(db, first.id, author.id, "Hi all".to_owned()).await.unwrap();
    let reply = post::Mutation::create_post(db, first.id, reader.id, "Hi".to_owned()).await.unwrap();
    let first = topic::Mutation::set_first_post(db, first.id, opening.id).await.unwrap();
    assert_eq!(first.first_post_id, Some(opening.id));

    let edited = post::Mutation::update_content(db, reply.id, "Hello!".to_owned()).await.unwrap();
    assert!(edited.is_edited);
    let posts = post::Query::list_for_topic(db, first.id).await.unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[1].1.as_ref().map(|user| user.id), Some(reader.id));
    assert_eq!(topic::Query::count_posts(db, first.id).await.unwrap(), 2);
}

#[test(tokio::test)]
async fn test_subscriptions() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();
    let user = create_test_user(db, "subscriber", Role::Student).await;
    let forum = forum::Mutation::create_forum(db, "General".to_owned(), "general".to_owned(), String::new(), None)
        .await
        .unwrap();
    let topic = topic::Mutation::create_topic(db, forum.id, user.id, "Hello".to_owned(), "hello".to_owned())
        .await
        .unwrap();

    subscription::Mutation::subscribe(db, user.id, topic.id).await.unwrap();
    subscription::Mutation::subscribe(db, user.id, topic.id).await.unwrap();
    assert_eq!(subscription::Query::list_subscriber_ids(db, topic.id).await.unwrap(), [user.id]);

    subscription::Mutation::unsubscribe(db, user.id, topic.id).await.unwrap();
    assert!(!subscription::Query::is_subscribed(db, user.id, topic.id).await.unwrap());
}
