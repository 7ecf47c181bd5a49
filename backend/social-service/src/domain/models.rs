use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validated post ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub title: String,
    pub body: String,
    pub created_date: DateTime<Utc>,
    pub author_id: Uuid,
}

/// Stored post as read back from a repository
///
/// `score` is only populated by text search.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PostRecord {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub created_date: DateTime<Utc>,
    pub author_id: Uuid,
    pub score: Option<f32>,
}

/// Follow edge: `author_id` follows `followed_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Follow {
    pub followed_id: Uuid,
    pub author_id: Uuid,
}

impl Follow {
    pub fn new(followed_id: Uuid, author_id: Uuid) -> Self {
        Self {
            followed_id,
            author_id,
        }
    }

    pub fn is_self_follow(&self) -> bool {
        self.followed_id == self.author_id
    }
}

/// Identity record owned by the identity directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

/// Public display data for a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub username: String,
    pub avatar: String,
}

/// Visitor-relative view of a post
///
/// Carries no author id; ownership is exposed only through `is_visitor_owner`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub created_date: DateTime<Utc>,
    pub author: UserSummary,
    pub is_visitor_owner: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCounts {
    pub post_count: i64,
    pub follower_count: i64,
    pub following_count: i64,
}

/// Profile header shown above a user's posts/followers/following lists
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub username: String,
    pub avatar: String,
    pub is_visitors_profile: bool,
    pub is_following: bool,
    pub counts: ProfileCounts,
}
