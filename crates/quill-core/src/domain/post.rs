use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::PublicUser;
use crate::error::DomainError;

/// Publication state of a post. Writes may flip it freely between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

impl FromStr for PostStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            other => Err(DomainError::Validation(format!(
                "invalid post status '{other}'"
            ))),
        }
    }
}

/// How the post body should be interpreted by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
    Html,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Html => "html",
        }
    }
}

impl FromStr for ContentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(ContentType::Text),
            "html" => Ok(ContentType::Html),
            other => Err(DomainError::Validation(format!(
                "invalid content type '{other}'"
            ))),
        }
    }
}

/// Image attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostImage {
    pub url: String,
    pub caption: String,
}

/// Comment with its author resolved to a public identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub author: PublicUser,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author.id == user_id
    }
}

/// Post aggregate with owner, likers and comment authors resolved to their
/// public identity views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub owner: PublicUser,
    pub title: String,
    pub content: String,
    pub content_type: ContentType,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub status: PostStatus,
    pub views: i64,
    pub images: Vec<PostImage>,
    pub likes: Vec<PublicUser>,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner.id == user_id
    }

    pub fn comment(&self, comment_id: Uuid) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == comment_id)
    }
}

/// Fields for creating a post. Title and content are validated non-empty at
/// the handler boundary; tags arrive already normalized.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub owner_id: Uuid,
    pub title: String,
    pub content: String,
    pub content_type: ContentType,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub status: PostStatus,
    pub images: Vec<PostImage>,
}

/// Partial update of a post. `None` fields keep their stored value;
/// `new_images` are appended to the existing image list, never replacing it.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub content_type: Option<ContentType>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<PostStatus>,
    pub new_images: Vec<PostImage>,
}

/// Listing filter. `category` uses `all` as a no-filter sentinel; `search`
/// is a case-insensitive substring match over title and content.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
}

/// One page of a post listing, newest first.
#[derive(Debug, Clone)]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub total: u64,
    pub total_pages: u64,
    pub current_page: u64,
}

/// Normalize user-supplied tags: trim whitespace and drop empty entries.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|t| t.as_ref().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
