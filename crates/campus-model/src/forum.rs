use crate::user::PublicUser;
use crate::validation::{FieldErrors, Validate, max_length, require_text};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Forum {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewForum {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub course_id: Option<Uuid>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Validate for NewForum {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        require_text(&mut errors, "title", &self.title);
        max_length(&mut errors, "title", &self.title, 100);
        errors.into_result()
    }
}

#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct UpdateForum {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl Validate for UpdateForum {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(title) = &self.title {
            require_text(&mut errors, "title", title);
            max_length(&mut errors, "title", title, 100);
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Topic {
    pub id: Uuid,
    pub forum_id: Uuid,
    pub title: String,
    pub slug: String,
    pub created_by: PublicUser,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub views: i32,
    pub is_pinned: bool,
    pub is_closed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ForumDetail {
    #[serde(flatten)]
    pub forum: Forum,
    pub topics: Vec<Topic>,
}

/// A topic is always opened with its first post.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewTopic {
    pub title: String,
    pub content: String,
}

impl Validate for NewTopic {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        require_text(&mut errors, "title", &self.title);
        max_length(&mut errors, "title", &self.title, 200);
        require_text(&mut errors, "content", &self.content);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateTopic {
    pub title: String,
}

impl Validate for UpdateTopic {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        require_text(&mut errors, "title", &self.title);
        max_length(&mut errors, "title", &self.title, 200);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Post {
    pub id: Uuid,
    pub topic_id: Uuid,
    pub content: String,
    pub created_by: PublicUser,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_edited: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TopicDetail {
    #[serde(flatten)]
    pub topic: Topic,
    pub posts: Vec<Post>,
    pub is_subscribed: bool,
    pub can_moderate: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewPost {
    pub content: String,
}

impl Validate for NewPost {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        require_text(&mut errors, "content", &self.content);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Subscription {
    pub is_subscribed: bool,
}
