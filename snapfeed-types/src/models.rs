use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::transport::{timestamp_format, Entity};

/// Registered account.
///
/// `password` and `is_active` are stored but never leave the process: the
/// transport projection skips both.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_serializing)]
    pub is_active: bool,
    pub full_name: Option<String>,
    pub bio: String,
    pub profile_image: Option<String>,
    #[serde(with = "timestamp_format")]
    pub created_at: Option<DateTime<Utc>>,
}

// Keep the credential out of logs as well as out of transport
impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("is_active", &self.is_active)
            .field("full_name", &self.full_name)
            .field("bio", &self.bio)
            .field("profile_image", &self.profile_image)
            .field("created_at", &self.created_at)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub image_url: String,
    pub caption: Option<String>,
    pub location: Option<String>,
    #[serde(with = "timestamp_format")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub content: String,
    #[serde(with = "timestamp_format")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A user's endorsement of a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub id: i64,
    pub user_id: i64,
    pub post_id: i64,
    #[serde(with = "timestamp_format")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Directed edge: `follower_id` follows `followed_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follow {
    pub id: i64,
    pub follower_id: i64,
    pub followed_id: i64,
    #[serde(with = "timestamp_format")]
    pub created_at: Option<DateTime<Utc>>,
}

macro_rules! impl_entity {
    ($ty:ty, $name:literal, $table:literal) => {
        impl Entity for $ty {
            const NAME: &'static str = $name;
            const TABLE: &'static str = $table;

            fn id(&self) -> i64 {
                self.id
            }

            fn created_at(&self) -> Option<DateTime<Utc>> {
                self.created_at
            }
        }
    };
}

impl_entity!(User, "user", "users");
impl_entity!(Post, "post", "posts");
impl_entity!(Comment, "comment", "comments");
impl_entity!(Like, "like", "likes");
impl_entity!(Follow, "follow", "follows");
