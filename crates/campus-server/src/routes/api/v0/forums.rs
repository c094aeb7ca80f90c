pub(crate) mod error;

use crate::permissions::Permission;
use crate::routes::api::v0::forums::error::ForumError;
use crate::user::ExtractUser;
use axum::extract::Path;
use axum::response::IntoResponse;
use axum::routing::{Router, get, patch, post};
use axum::{Extension, Json};
use campus_core::access::{can_access_forum, can_moderate};
use campus_core::forum as forum_core;
use campus_db::course::{course as course_db, enrollment as enrollment_db};
use campus_db::forum::{
    forum as forum_db, post as post_db, subscription as subscription_db, topic as topic_db,
};
use campus_db::sea_orm::ActiveValue::{Set, Unchanged};
use campus_db::sea_orm::{ConnectionTrait, DatabaseConnection, DbErr};
use campus_db::user;
use campus_entity::forum::forum::{ActiveModel as ForumActiveModel, Model as ForumModel};
use campus_entity::forum::post::Model as PostModel;
use campus_entity::forum::topic::Model as TopicModel;
use campus_entity::user::Model as UserModel;
use campus_model::forum::{
    Forum, ForumDetail, NewForum, NewPost, NewTopic, Post, Subscription, Topic, TopicDetail, UpdateForum,
    UpdateTopic,
};
use campus_model::validation::Validate;
use campus_model_tools::convert::FromDbModel;
use campus_utils::slug::{slugify_or, with_suffix};
use http::StatusCode;
use protect_axum::protect;
use std::collections::HashMap;
use uuid::Uuid;

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_forums).post(create_forum))
        .route("/posts/{post}", patch(update_post).delete(delete_post))
        .route("/{forum}", get(get_forum).patch(update_forum))
        .route("/{forum}/topics", post(create_topic))
        .route("/{forum}/topics/{topic}", get(get_topic).patch(update_topic))
        .route("/{forum}/topics/{topic}/pin", post(toggle_pin))
        .route("/{forum}/topics/{topic}/close", post(toggle_close))
        .route("/{forum}/topics/{topic}/subscribe", post(subscribe).delete(unsubscribe))
        .route("/{forum}/topics/{topic}/posts", post(create_post))
        .with_state(())
}

async fn unique_forum_slug<C: ConnectionTrait>(conn: &C, title: &str) -> Result<String, DbErr> {
    let base = slugify_or(title, "forum");
    let mut slug = base.clone();
    let mut n = 1;
    while forum_db::Query::find_by_slug(conn, &slug).await?.is_some() {
        n += 1;
        slug = with_suffix(&base, n);
    }
    Ok(slug)
}

async fn load_forum(conn: &DatabaseConnection, slug: &str, user: &UserModel) -> Result<ForumModel, ForumError> {
    let forum = forum_db::Query::find_by_slug(conn, slug)
        .await?
        .ok_or(ForumError::NotFound)?;
    if !can_access_forum(conn, &forum, user).await? {
        return Err(ForumError::Forbidden);
    }
    Ok(forum)
}

async fn load_topic(
    conn: &DatabaseConnection,
    forum_slug: &str,
    topic_slug: &str,
    user: &UserModel,
) -> Result<(ForumModel, TopicModel), ForumError> {
    let forum = load_forum(conn, forum_slug, user).await?;
    let topic = topic_db::Query::find_by_slug(conn, forum.id, topic_slug)
        .await?
        .ok_or(ForumError::NotFound)?;
    Ok((forum, topic))
}

/// Loads a post and whether `user` moderates its forum. Posts in forums the user cannot access are
/// reported as missing.
async fn load_post(conn: &DatabaseConnection, post_id: Uuid, user: &UserModel) -> Result<(PostModel, bool), ForumError> {
    let post = post_db::Query::find_by_id(conn, post_id)
        .await?
        .ok_or(ForumError::NotFound)?;
    let topic = topic_db::Query::find_by_id(conn, post.topic_id)
        .await?
        .ok_or(ForumError::NotFound)?;
    let forum = forum_db::Query::find_by_id(conn, topic.forum_id)
        .await?
        .ok_or(ForumError::NotFound)?;
    if !can_access_forum(conn, &forum, user).await? {
        return Err(ForumError::NotFound);
    }
    let is_moderator = can_moderate(conn, &forum, user).await?;
    Ok((post, is_moderator))
}

async fn users_by_id(conn: &DatabaseConnection, ids: Vec<Uuid>) -> Result<HashMap<Uuid, UserModel>, DbErr> {
    Ok(user::Query::find_users_by_ids(conn, ids)
        .await?
        .into_iter()
        .map(|user| (user.id, user))
        .collect())
}

async fn topic_model(conn: &DatabaseConnection, topic: TopicModel) -> Result<Topic, ForumError> {
    let creator = user::Query::find_user_by_id(conn, topic.created_by)
        .await?
        .ok_or(ForumError::NotFound)?;
    Ok(Topic::from_db_model((topic, &creator)))
}

#[utoipa::path(
    get,
    path = "/api/v0/forums",
    responses(
        (status = OK, description = "Forums the user can take part in", body = [Forum]),
    ),
    tag = "v0/forums",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn list_forums(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
) -> Result<impl IntoResponse, ForumError> {
    let forums = if user.is_staff() {
        forum_db::Query::list_all(&conn).await?
    } else {
        let mut course_ids: Vec<Uuid> = course_db::Query::list_teaching(&conn, user.id)
            .await?
            .into_iter()
            .map(|course| course.id)
            .collect();
        course_ids.extend(enrollment_db::Query::active_course_ids(&conn, user.id).await?);

        let mut forums = forum_db::Query::list_general(&conn).await?;
        forums.extend(forum_db::Query::list_for_courses(&conn, course_ids).await?);
        forums
    };
    Ok(Json(forums.into_iter().map(Forum::from_db_model).collect::<Vec<_>>()))
}

#[utoipa::path(
    post,
    path = "/api/v0/forums",
    request_body = NewForum,
    responses(
        (status = CREATED, description = "Created forum", body = Forum),
        (status = BAD_REQUEST, description = "Invalid input"),
    ),
    tag = "v0/forums",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Staff", ty = "Permission")]
pub(crate) async fn create_forum(
    Extension(conn): Extension<DatabaseConnection>,
    Json(body): Json<NewForum>,
) -> Result<impl IntoResponse, ForumError> {
    body.validate().map_err(ForumError::Validation)?;
    if let Some(course_id) = body.course_id {
        course_db::Query::find_by_id(&conn, course_id)
            .await?
            .ok_or(ForumError::NotFound)?;
    }

    let slug = unique_forum_slug(&conn, &body.title).await?;
    let mut forum = forum_db::Mutation::create_forum(&conn, body.title, slug, body.description, body.course_id).await?;
    if !body.is_active {
        forum = forum_db::Mutation::update_forum(
            &conn,
            ForumActiveModel {
                id: Unchanged(forum.id),
                is_active: Set(false),
                ..Default::default()
            },
        )
        .await?;
    }
    tracing::info!(forum_id = %forum.id, slug = %forum.slug, "created forum");
    Ok((StatusCode::CREATED, Json(Forum::from_db_model(forum))))
}

#[utoipa::path(
    get,
    path = "/api/v0/forums/{forum}",
    responses(
        (status = OK, description = "Forum with its topics, pinned topics first", body = ForumDetail),
        (status = FORBIDDEN, description = "Course forum of a course the user does not take part in"),
    ),
    params(
        ("forum" = String, Path, description = "Forum slug"),
    ),
    tag = "v0/forums",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn get_forum(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ForumError> {
    let forum = load_forum(&conn, &slug, &user).await?;
    let topics = topic_db::Query::list_for_forum(&conn, forum.id).await?;
    let creators = users_by_id(&conn, topics.iter().map(|topic| topic.created_by).collect()).await?;
    let topics = topics
        .into_iter()
        .filter_map(|topic| {
            let creator = creators.get(&topic.created_by)?;
            Some(Topic::from_db_model((topic, creator)))
        })
        .collect();

    Ok(Json(ForumDetail {
        forum: Forum::from_db_model(forum),
        topics,
    }))
}

#[utoipa::path(
    patch,
    path = "/api/v0/forums/{forum}",
    request_body = UpdateForum,
    responses(
        (status = OK, description = "Updated forum", body = Forum),
    ),
    params(
        ("forum" = String, Path, description = "Forum slug"),
    ),
    tag = "v0/forums",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Staff", ty = "Permission")]
pub(crate) async fn update_forum(
    Extension(conn): Extension<DatabaseConnection>,
    Path(slug): Path<String>,
    Json(body): Json<UpdateForum>,
) -> Result<impl IntoResponse, ForumError> {
    body.validate().map_err(ForumError::Validation)?;
    let forum = forum_db::Query::find_by_slug(&conn, &slug)
        .await?
        .ok_or(ForumError::NotFound)?;

    let mut active = ForumActiveModel {
        id: Unchanged(forum.id),
        ..Default::default()
    };
    if let Some(title) = body.title {
        active.title = Set(title);
    }
    if let Some(description) = body.description {
        active.description = Set(description);
    }
    if let Some(is_active) = body.is_active {
        active.is_active = Set(is_active);
    }
    let forum = forum_db::Mutation::update_forum(&conn, active).await?;
    Ok(Json(Forum::from_db_model(forum)))
}

#[utoipa::path(
    post,
    path = "/api/v0/forums/{forum}/topics",
    request_body = NewTopic,
    responses(
        (status = CREATED, description = "Topic opened with its first post, the author is subscribed", body = TopicDetail),
        (status = BAD_REQUEST, description = "Invalid input"),
    ),
    params(
        ("forum" = String, Path, description = "Forum slug"),
    ),
    tag = "v0/forums",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn create_topic(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(slug): Path<String>,
    Json(body): Json<NewTopic>,
) -> Result<impl IntoResponse, ForumError> {
    let forum = load_forum(&conn, &slug, &user).await?;
    body.validate().map_err(ForumError::Validation)?;

    let (topic, post) = forum_core::create_topic(&conn, forum.id, user.id, body.title, body.content).await?;
    let is_moderator = can_moderate(&conn, &forum, &user).await?;
    tracing::info!(topic_id = %topic.id, forum_id = %forum.id, "opened topic");

    Ok((
        StatusCode::CREATED,
        Json(TopicDetail {
            topic: Topic::from_db_model((topic, &user)),
            posts: vec![Post::from_db_model((post, &user))],
            is_subscribed: true,
            can_moderate: is_moderator,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v0/forums/{forum}/topics/{topic}",
    responses(
        (status = OK, description = "Topic with its posts, oldest first", body = TopicDetail),
    ),
    params(
        ("forum" = String, Path, description = "Forum slug"),
        ("topic" = String, Path, description = "Topic slug"),
    ),
    tag = "v0/forums",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn get_topic(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path((forum_slug, topic_slug)): Path<(String, String)>,
) -> Result<impl IntoResponse, ForumError> {
    let (forum, mut topic) = load_topic(&conn, &forum_slug, &topic_slug, &user).await?;
    topic_db::Mutation::increment_views(&conn, topic.id).await?;
    topic.views += 1;

    let posts = post_db::Query::list_for_topic(&conn, topic.id)
        .await?
        .into_iter()
        .filter_map(|(post, author)| Some(Post::from_db_model((post, &author?))))
        .collect();
    let is_subscribed = subscription_db::Query::is_subscribed(&conn, user.id, topic.id).await?;
    let is_moderator = can_moderate(&conn, &forum, &user).await?;

    Ok(Json(TopicDetail {
        topic: topic_model(&conn, topic).await?,
        posts,
        is_subscribed,
        can_moderate: is_moderator,
    }))
}

#[utoipa::path(
    patch,
    path = "/api/v0/forums/{forum}/topics/{topic}",
    request_body = UpdateTopic,
    responses(
        (status = OK, description = "Renamed topic", body = Topic),
        (status = FORBIDDEN, description = "Caller neither opened the topic nor moderates the forum"),
    ),
    params(
        ("forum" = String, Path, description = "Forum slug"),
        ("topic" = String, Path, description = "Topic slug"),
    ),
    tag = "v0/forums",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn update_topic(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path((forum_slug, topic_slug)): Path<(String, String)>,
    Json(body): Json<UpdateTopic>,
) -> Result<impl IntoResponse, ForumError> {
    let (forum, topic) = load_topic(&conn, &forum_slug, &topic_slug, &user).await?;
    if topic.created_by != user.id && !can_moderate(&conn, &forum, &user).await? {
        return Err(ForumError::Forbidden);
    }
    body.validate().map_err(ForumError::Validation)?;

    let topic = topic_db::Mutation::update_title(&conn, topic.id, body.title).await?;
    Ok(Json(topic_model(&conn, topic).await?))
}

#[utoipa::path(
    post,
    path = "/api/v0/forums/{forum}/topics/{topic}/pin",
    responses(
        (status = OK, description = "Topic with the pin toggled", body = Topic),
        (status = FORBIDDEN, description = "Caller does not moderate the forum"),
    ),
    params(
        ("forum" = String, Path, description = "Forum slug"),
        ("topic" = String, Path, description = "Topic slug"),
    ),
    tag = "v0/forums",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn toggle_pin(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path((forum_slug, topic_slug)): Path<(String, String)>,
) -> Result<impl IntoResponse, ForumError> {
    let (forum, topic) = load_topic(&conn, &forum_slug, &topic_slug, &user).await?;
    if !can_moderate(&conn, &forum, &user).await? {
        return Err(ForumError::Forbidden);
    }
    let topic = topic_db::Mutation::set_pinned(&conn, topic.id, !topic.is_pinned).await?;
    Ok(Json(topic_model(&conn, topic).await?))
}

#[utoipa::path(
    post,
    path = "/api/v0/forums/{forum}/topics/{topic}/close",
    responses(
        (status = OK, description = "Topic closed or reopened", body = Topic),
        (status = FORBIDDEN, description = "Caller does not moderate the forum"),
    ),
    params(
        ("forum" = String, Path, description = "Forum slug"),
        ("topic" = String, Path, description = "Topic slug"),
    ),
    tag = "v0/forums",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn toggle_close(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path((forum_slug, topic_slug)): Path<(String, String)>,
) -> Result<impl IntoResponse, ForumError> {
    let (forum, topic) = load_topic(&conn, &forum_slug, &topic_slug, &user).await?;
    if !can_moderate(&conn, &forum, &user).await? {
        return Err(ForumError::Forbidden);
    }
    let topic = topic_db::Mutation::set_closed(&conn, topic.id, !topic.is_closed).await?;
    Ok(Json(topic_model(&conn, topic).await?))
}

#[utoipa::path(
    post,
    path = "/api/v0/forums/{forum}/topics/{topic}/subscribe",
    responses(
        (status = OK, description = "Subscribed, subscribing twice is harmless", body = Subscription),
    ),
    params(
        ("forum" = String, Path, description = "Forum slug"),
        ("topic" = String, Path, description = "Topic slug"),
    ),
    tag = "v0/forums",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn subscribe(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path((forum_slug, topic_slug)): Path<(String, String)>,
) -> Result<impl IntoResponse, ForumError> {
    let (_, topic) = load_topic(&conn, &forum_slug, &topic_slug, &user).await?;
    subscription_db::Mutation::subscribe(&conn, user.id, topic.id).await?;
    Ok(Json(Subscription { is_subscribed: true }))
}

#[utoipa::path(
    delete,
    path = "/api/v0/forums/{forum}/topics/{topic}/subscribe",
    responses(
        (status = OK, description = "Unsubscribed", body = Subscription),
    ),
    params(
        ("forum" = String, Path, description = "Forum slug"),
        ("topic" = String, Path, description = "Topic slug"),
    ),
    tag = "v0/forums",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn unsubscribe(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path((forum_slug, topic_slug)): Path<(String, String)>,
) -> Result<impl IntoResponse, ForumError> {
    let (_, topic) = load_topic(&conn, &forum_slug, &topic_slug, &user).await?;
    subscription_db::Mutation::unsubscribe(&conn, user.id, topic.id).await?;
    Ok(Json(Subscription { is_subscribed: false }))
}

#[utoipa::path(
    post,
    path = "/api/v0/forums/{forum}/topics/{topic}/posts",
    request_body = NewPost,
    responses(
        (status = CREATED, description = "Reply posted, subscribers are notified", body = Post),
        (status = FORBIDDEN, description = "Topic is closed"),
    ),
    params(
        ("forum" = String, Path, description = "Forum slug"),
        ("topic" = String, Path, description = "Topic slug"),
    ),
    tag = "v0/forums",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn create_post(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path((forum_slug, topic_slug)): Path<(String, String)>,
    Json(body): Json<NewPost>,
) -> Result<impl IntoResponse, ForumError> {
    let (forum, topic) = load_topic(&conn, &forum_slug, &topic_slug, &user).await?;
    body.validate().map_err(ForumError::Validation)?;
    let is_moderator = can_moderate(&conn, &forum, &user).await?;

    let post = forum_core::reply(&conn, &topic, &forum.slug, &user, body.content, is_moderator).await?;
    Ok((StatusCode::CREATED, Json(Post::from_db_model((post, &user)))))
}

#[utoipa::path(
    patch,
    path = "/api/v0/forums/posts/{post}",
    request_body = NewPost,
    responses(
        (status = OK, description = "Edited post", body = Post),
        (status = FORBIDDEN, description = "Caller neither wrote the post nor moderates the forum"),
    ),
    params(
        ("post" = Uuid, Path, description = "Post id"),
    ),
    tag = "v0/forums",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn update_post(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(post_id): Path<Uuid>,
    Json(body): Json<NewPost>,
) -> Result<impl IntoResponse, ForumError> {
    let (post, is_moderator) = load_post(&conn, post_id, &user).await?;
    if !forum_core::can_edit_post(&post, &user, is_moderator) {
        return Err(ForumError::Forbidden);
    }
    body.validate().map_err(ForumError::Validation)?;

    let post = post_db::Mutation::update_content(&conn, post.id, body.content).await?;
    let author = user::Query::find_user_by_id(&conn, post.created_by)
        .await?
        .ok_or(ForumError::NotFound)?;
    Ok(Json(Post::from_db_model((post, &author))))
}

#[utoipa::path(
    delete,
    path = "/api/v0/forums/posts/{post}",
    responses(
        (status = NO_CONTENT, description = "Post deleted"),
        (status = FORBIDDEN, description = "Caller neither wrote the post nor moderates the forum"),
        (status = CONFLICT, description = "The first post of a topic cannot be deleted"),
    ),
    params(
        ("post" = Uuid, Path, description = "Post id"),
    ),
    tag = "v0/forums",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn delete_post(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(post_id): Path<Uuid>,
) -> Result<impl IntoResponse, ForumError> {
    let (post, is_moderator) = load_post(&conn, post_id, &user).await?;
    if !forum_core::can_edit_post(&post, &user, is_moderator) {
        return Err(ForumError::Forbidden);
    }
    forum_core::delete_post(&conn, &post).await?;
    Ok(StatusCode::NO_CONTENT)
}
