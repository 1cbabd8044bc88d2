//! Data Transfer Objects - request/response types for the API.
//!
//! Wire casing is camelCase to match the published API surface
//! (`totalPages`, `createdAt`, `contentType`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quill_core::domain::{Comment, Post, PostImage, PostPage, PublicUser};

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public view of a user - id and email only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserView {
    pub id: Uuid,
    pub email: String,
}

impl From<PublicUser> for UserView {
    fn from(user: PublicUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

/// Response for successful registration or login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserView,
}

/// Image reference inside a post view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageView {
    pub url: String,
    pub caption: String,
}

impl From<PostImage> for ImageView {
    fn from(image: PostImage) -> Self {
        Self {
            url: image.url,
            caption: image.caption,
        }
    }
}

/// Comment with its author resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: Uuid,
    pub user: UserView,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentView {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            user: comment.author.into(),
            content: comment.content,
            created_at: comment.created_at,
        }
    }
}

/// Fully resolved post returned by every post endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: Uuid,
    pub user: UserView,
    pub title: String,
    pub content: String,
    pub content_type: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub status: String,
    pub views: i64,
    pub images: Vec<ImageView>,
    pub likes: Vec<UserView>,
    pub comments: Vec<CommentView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Post> for PostView {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            user: post.owner.into(),
            title: post.title,
            content: post.content,
            content_type: post.content_type.as_str().to_string(),
            category: post.category,
            tags: post.tags,
            status: post.status.as_str().to_string(),
            views: post.views,
            images: post.images.into_iter().map(Into::into).collect(),
            likes: post.likes.into_iter().map(Into::into).collect(),
            comments: post.comments.into_iter().map(Into::into).collect(),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Paged post listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListResponse {
    pub posts: Vec<PostView>,
    pub total_pages: u64,
    pub current_page: u64,
    pub total: u64,
}

impl From<PostPage> for PostListResponse {
    fn from(page: PostPage) -> Self {
        Self {
            posts: page.posts.into_iter().map(Into::into).collect(),
            total_pages: page.total_pages,
            current_page: page.current_page,
            total: page.total,
        }
    }
}

/// Query parameters for the post listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostListQuery {
    pub page: Option<u64>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
}

/// Request body for creating or editing a comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRequest {
    pub content: String,
}

/// Response for a successful upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
    pub filename: String,
    pub size: u64,
    pub mimetype: String,
}

/// Generic confirmation message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
