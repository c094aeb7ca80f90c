use campus_db::forum::{post, subscription, topic};
use campus_db::notification::{self, NewNotification};
use campus_db::util::{FlattenTransactionResultExt, RequireRecord};
use campus_entity::forum::post::Model as Post;
use campus_entity::forum::topic::Model as Topic;
use campus_entity::notification::{NotificationType, RelatedObject};
use campus_entity::user::Model as User;
use campus_utils::slug::{slugify_or, with_suffix};
use sea_orm::{ConnectionTrait, DbErr, TransactionTrait};
use std::error::Error;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ForumError {
    #[error(transparent)]
    Db(#[from] DbErr),
    #[error("Topic is closed")]
    Closed,
    #[error("The first post of a topic cannot be deleted")]
    FirstPost,
}

/// Picks a slug for `title` that is not yet taken in the forum, appending `-2`, `-3`, ... on collision.
pub async fn unique_topic_slug<C: ConnectionTrait>(conn: &C, forum_id: Uuid, title: &str) -> Result<String, DbErr> {
    let base = slugify_or(title, "topic");
    let mut slug = base.clone();
    let mut n = 1;
    while topic::Query::slug_exists(conn, forum_id, &slug).await? {
        n += 1;
        slug = with_suffix(&base, n);
    }
    Ok(slug)
}

/// Opens a topic with its first post and subscribes the author to it.
pub async fn create_topic<C: TransactionTrait>(
    conn: &C,
    forum_id: Uuid,
    author_id: Uuid,
    title: String,
    content: String,
) -> Result<(Topic, Post), ForumError> {
    conn.transaction::<_, _, ForumError>(|txn| {
        Box::pin(async move {
            let slug = unique_topic_slug(txn, forum_id, &title).await?;
            let topic = topic::Mutation::create_topic(txn, forum_id, author_id, title, slug).await?;
            let post = post::Mutation::create_post(txn, topic.id, author_id, content).await?;
            let topic = topic::Mutation::set_first_post(txn, topic.id, post.id).await?;
            subscription::Mutation::subscribe(txn, author_id, topic.id).await?;
            Ok((topic, post))
        })
    })
    .await
    .flatten_res()
    .inspect_err(|error| tracing::error!(error = error as &dyn Error, %forum_id, "failed to create topic"))
}

fn reply_notification(topic: &Topic, post: &Post, author: &User, forum_slug: &str) -> NewNotification {
    NewNotification {
        notification_type: NotificationType::ForumPost,
        title: format!("New reply in \"{}\"", topic.title),
        message: format!(
            "{} has posted in a topic you are subscribed to: {}",
            author.username, topic.title
        ),
        related_link: Some(format!("/api/v0/forums/{forum_slug}/topics/{}", topic.slug)),
        related: Some(RelatedObject::ForumPost(post.id)),
    }
}

/// Adds a reply and notifies every subscriber except the author, one notification each.
///
/// Closed topics only take replies from moderators.
pub async fn reply<C: TransactionTrait>(
    conn: &C,
    topic: &Topic,
    forum_slug: &str,
    author: &User,
    content: String,
    is_moderator: bool,
) -> Result<Post, ForumError> {
    if topic.is_closed && !is_moderator {
        return Err(ForumError::Closed);
    }
    let topic = topic.clone();
    let author = author.clone();
    let forum_slug = forum_slug.to_owned();
    conn.transaction::<_, _, ForumError>(|txn| {
        Box::pin(async move {
            let post = post::Mutation::create_post(txn, topic.id, author.id, content).await?;
            topic::Mutation::touch(txn, topic.id).await?;

            let recipients: Vec<Uuid> = subscription::Query::list_subscriber_ids(txn, topic.id)
                .await?
                .into_iter()
                .filter(|user_id| *user_id != author.id)
                .collect();
            let count = recipients.len();
            notification::Mutation::create_notifications(
                txn,
                recipients,
                reply_notification(&topic, &post, &author, &forum_slug),
            )
            .await?;
            tracing::debug!(topic_id = %topic.id, count, "notified subscribers");
            Ok(post)
        })
    })
    .await
    .flatten_res()
}

/// Authors, staff and the instructor of the forum's course may change or remove a post.
#[must_use]
pub fn can_edit_post(post: &Post, user: &User, is_moderator: bool) -> bool {
    is_moderator || post.created_by == user.id
}

/// Removes a reply. The opening post of a topic cannot be removed.
pub async fn delete_post<C: ConnectionTrait>(conn: &C, post: &Post) -> Result<(), ForumError> {
    let topic = topic::Query::find_by_id(conn, post.topic_id).await.require()?;
    if topic.first_post_id == Some(post.id) {
        return Err(ForumError::FirstPost);
    }
    post::Mutation::delete_post(conn, post.id).await?;
    Ok(())
}
