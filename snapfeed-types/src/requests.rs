use serde::{Deserialize, Serialize};

use crate::models::{Comment, Follow, Like, Post};

/// Fields a caller supplies to create a user. `id` and `created_at` are
/// assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password: String,
    pub is_active: bool,
    #[serde(default)]
    pub full_name: Option<String>,
    /// Stored as the empty string when absent
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
}

impl NewUser {
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            username: username.into(),
            password: password.into(),
            is_active: true,
            full_name: None,
            bio: None,
            profile_image: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub user_id: i64,
    pub image_url: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl NewPost {
    pub fn new(user_id: i64, image_url: impl Into<String>) -> Self {
        Self {
            user_id,
            image_url: image_url.into(),
            caption: None,
            location: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    pub post_id: i64,
    pub user_id: i64,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLike {
    pub user_id: i64,
    pub post_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFollow {
    pub follower_id: i64,
    pub followed_id: i64,
}

/// Replacement profile fields. Identity fields (email, username) and the
/// credential are not editable through this path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
}

/// Replacement descriptive fields of a post; the owner and image are fixed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostUpdate {
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl From<&Post> for NewPost {
    fn from(post: &Post) -> Self {
        Self {
            user_id: post.user_id,
            image_url: post.image_url.clone(),
            caption: post.caption.clone(),
            location: post.location.clone(),
        }
    }
}

impl From<&Comment> for NewComment {
    fn from(comment: &Comment) -> Self {
        Self {
            post_id: comment.post_id,
            user_id: comment.user_id,
            content: comment.content.clone(),
        }
    }
}

impl From<&Like> for NewLike {
    fn from(like: &Like) -> Self {
        Self {
            user_id: like.user_id,
            post_id: like.post_id,
        }
    }
}

impl From<&Follow> for NewFollow {
    fn from(follow: &Follow) -> Self {
        Self {
            follower_id: follow.follower_id,
            followed_id: follow.followed_id,
        }
    }
}
