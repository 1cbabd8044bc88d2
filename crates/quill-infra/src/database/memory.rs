//! In-memory repositories - used as fallback when the database is not
//! configured, and as the handler test double.
//!
//! A single store implements both repository ports so projections can
//! resolve user references. All post mutation happens under one write
//! lock, which gives comment/like updates the same lost-update safety the
//! Postgres adapter gets from atomic row operations.
//! Note: data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{
    Comment, ContentType, NewPost, Post, PostFilter, PostImage, PostPage, PostPatch, PostStatus,
    User,
};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostRepository, UserRepository};

struct StoredComment {
    id: Uuid,
    user_id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
}

struct StoredPost {
    id: Uuid,
    user_id: Uuid,
    title: String,
    content: String,
    content_type: ContentType,
    category: Option<String>,
    tags: Vec<String>,
    status: PostStatus,
    views: i64,
    images: Vec<PostImage>,
    likes: Vec<Uuid>,
    comments: Vec<StoredComment>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// In-memory user + post store.
///
/// Lock order is posts before users; every method that needs both takes
/// them in that order.
pub struct InMemoryStore {
    posts: RwLock<HashMap<Uuid, StoredPost>>,
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            posts: RwLock::new(HashMap::new()),
            users: RwLock::new(HashMap::new()),
        }
    }

    fn project(users: &HashMap<Uuid, User>, post: &StoredPost) -> Result<Post, RepoError> {
        let owner = users
            .get(&post.user_id)
            .ok_or_else(|| RepoError::Query(format!("post {} has no owner record", post.id)))?
            .public();

        let likes = post
            .likes
            .iter()
            .filter_map(|id| users.get(id).map(User::public))
            .collect();

        let comments = post
            .comments
            .iter()
            .filter_map(|c| {
                users.get(&c.user_id).map(|author| Comment {
                    id: c.id,
                    author: author.public(),
                    content: c.content.clone(),
                    created_at: c.created_at,
                })
            })
            .collect();

        Ok(Post {
            id: post.id,
            owner,
            title: post.title.clone(),
            content: post.content.clone(),
            content_type: post.content_type,
            category: post.category.clone(),
            tags: post.tags.clone(),
            status: post.status,
            views: post.views,
            images: post.images.clone(),
            likes,
            comments,
            created_at: post.created_at,
            updated_at: post.updated_at,
        })
    }

    fn matches(filter: &PostFilter, post: &StoredPost) -> bool {
        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            if !post.title.to_lowercase().contains(&needle)
                && !post.content.to_lowercase().contains(&needle)
            {
                return false;
            }
        }

        if let Some(category) = filter
            .category
            .as_deref()
            .filter(|c| !c.is_empty() && *c != "all")
        {
            if post.category.as_deref() != Some(category) {
                return false;
            }
        }

        if let Some(tag) = filter.tag.as_deref().filter(|t| !t.is_empty()) {
            if !post.tags.iter().any(|t| t == tag) {
                return false;
            }
        }

        true
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let mut users = self.users.write().await;

        if users
            .values()
            .any(|u| u.email == user.email && u.id != user.id)
        {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.users.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn create(&self, new_post: NewPost) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;
        let users = self.users.read().await;

        if !users.contains_key(&new_post.owner_id) {
            return Err(RepoError::Constraint("Post owner does not exist".to_string()));
        }

        let now = Utc::now();
        let post = StoredPost {
            id: Uuid::new_v4(),
            user_id: new_post.owner_id,
            title: new_post.title,
            content: new_post.content,
            content_type: new_post.content_type,
            category: new_post.category,
            tags: new_post.tags,
            status: new_post.status,
            views: 0,
            images: new_post.images,
            likes: Vec::new(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let projected = Self::project(&users, &post)?;
        posts.insert(post.id, post);
        Ok(projected)
    }

    async fn list(
        &self,
        filter: PostFilter,
        page: u64,
        per_page: u64,
    ) -> Result<PostPage, RepoError> {
        let posts = self.posts.read().await;
        let users = self.users.read().await;

        let mut matched: Vec<&StoredPost> = posts
            .values()
            .filter(|p| Self::matches(&filter, p))
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matched.len() as u64;
        let total_pages = total.div_ceil(per_page.max(1));
        let page = page.max(1);

        let items = matched
            .into_iter()
            .skip(((page - 1) * per_page) as usize)
            .take(per_page as usize)
            .map(|p| Self::project(&users, p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PostPage {
            posts: items,
            total,
            total_pages,
            current_page: page,
        })
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let posts = self.posts.read().await;
        let users = self.users.read().await;

        posts
            .get(&id)
            .map(|p| Self::project(&users, p))
            .transpose()
    }

    async fn fetch_counting_view(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let mut posts = self.posts.write().await;
        let users = self.users.read().await;

        let Some(post) = posts.get_mut(&id) else {
            return Ok(None);
        };

        post.views += 1;
        Self::project(&users, post).map(Some)
    }

    async fn update(&self, id: Uuid, patch: PostPatch) -> Result<Option<Post>, RepoError> {
        let mut posts = self.posts.write().await;
        let users = self.users.read().await;

        let Some(post) = posts.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(title) = patch.title {
            post.title = title;
        }
        if let Some(content) = patch.content {
            post.content = content;
        }
        if let Some(content_type) = patch.content_type {
            post.content_type = content_type;
        }
        if let Some(category) = patch.category {
            post.category = Some(category);
        }
        if let Some(tags) = patch.tags {
            post.tags = tags;
        }
        if let Some(status) = patch.status {
            post.status = status;
        }
        post.images.extend(patch.new_images);
        post.updated_at = Utc::now();

        Self::project(&users, post).map(Some)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.posts.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }

    async fn add_comment(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        content: String,
    ) -> Result<Option<Post>, RepoError> {
        let mut posts = self.posts.write().await;
        let users = self.users.read().await;

        let Some(post) = posts.get_mut(&post_id) else {
            return Ok(None);
        };

        post.comments.push(StoredComment {
            id: Uuid::new_v4(),
            user_id: author_id,
            content,
            created_at: Utc::now(),
        });

        Self::project(&users, post).map(Some)
    }

    async fn update_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        content: String,
    ) -> Result<Option<Post>, RepoError> {
        let mut posts = self.posts.write().await;
        let users = self.users.read().await;

        let Some(post) = posts.get_mut(&post_id) else {
            return Ok(None);
        };

        let Some(comment) = post.comments.iter_mut().find(|c| c.id == comment_id) else {
            return Ok(None);
        };

        comment.content = content;
        Self::project(&users, post).map(Some)
    }

    async fn delete_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<Post>, RepoError> {
        let mut posts = self.posts.write().await;
        let users = self.users.read().await;

        let Some(post) = posts.get_mut(&post_id) else {
            return Ok(None);
        };

        let before = post.comments.len();
        post.comments.retain(|c| c.id != comment_id);
        if post.comments.len() == before {
            return Ok(None);
        }

        Self::project(&users, post).map(Some)
    }

    async fn like(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Post>, RepoError> {
        let mut posts = self.posts.write().await;
        let users = self.users.read().await;

        let Some(post) = posts.get_mut(&post_id) else {
            return Ok(None);
        };

        if !post.likes.contains(&user_id) {
            post.likes.push(user_id);
        }

        Self::project(&users, post).map(Some)
    }

    async fn unlike(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Post>, RepoError> {
        let mut posts = self.posts.write().await;
        let users = self.users.read().await;

        let Some(post) = posts.get_mut(&post_id) else {
            return Ok(None);
        };

        post.likes.retain(|id| *id != user_id);

        Self::project(&users, post).map(Some)
    }
}
