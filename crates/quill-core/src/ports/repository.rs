use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{NewPost, Post, PostFilter, PostPage, PostPatch, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist an entity.
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository.
///
/// Every operation that returns a [`Post`] returns the fully projected
/// aggregate: owner, likers and comment authors resolved to public
/// identities. Comment and like mutations are atomic row operations, not
/// read-modify-write over an embedded list, so concurrent mutations of the
/// same post cannot lose updates.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Persist a new post owned by `post.owner_id`. The owner must exist.
    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    /// One page of posts matching `filter`, newest first. `page` is
    /// 1-indexed; a zero page is treated as the first.
    async fn list(
        &self,
        filter: PostFilter,
        page: u64,
        per_page: u64,
    ) -> Result<PostPage, RepoError>;

    /// Plain read with no side effects (ownership checks, projections).
    async fn fetch(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    /// Read a single post and atomically count the view. Every call
    /// increments, including repeat reads by the same viewer.
    async fn fetch_counting_view(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    /// Partial update. Returns `None` if the post no longer exists.
    async fn update(&self, id: Uuid, patch: PostPatch) -> Result<Option<Post>, RepoError>;

    /// Delete the post record and its dependent rows. Fails with
    /// [`RepoError::NotFound`] if the post does not exist. Backing image
    /// files are the caller's responsibility, after this succeeds.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;

    /// Append a comment. Returns `None` if the post does not exist.
    async fn add_comment(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        content: String,
    ) -> Result<Option<Post>, RepoError>;

    /// Replace a comment's content. Returns `None` if post or comment is
    /// missing.
    async fn update_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        content: String,
    ) -> Result<Option<Post>, RepoError>;

    /// Remove a comment. Returns `None` if post or comment is missing.
    async fn delete_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<Post>, RepoError>;

    /// Add the user to the post's like-set. Liking an already-liked post
    /// succeeds and returns the unchanged aggregate.
    async fn like(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Post>, RepoError>;

    /// Remove the user from the post's like-set. Unliking a post that was
    /// never liked succeeds and returns the unchanged aggregate.
    async fn unlike(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Post>, RepoError>;
}
