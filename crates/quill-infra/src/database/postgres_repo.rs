//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, Condition, DbConn, DbErr, EntityTrait, LoaderTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, Unchanged,
};
use uuid::Uuid;

use quill_core::domain::{
    Comment, NewPost, Post, PostFilter, PostImage, PostPage, PostPatch, PublicUser, User,
};
use quill_core::error::RepoError;
use quill_core::ports::{PostRepository, UserRepository};

use super::entity::{comment, post, post_image, post_like, user};
use super::postgres_base::PostgresBaseRepository;

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<user::Entity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        // Mask email for logging to avoid PII in logs
        let masked = if let Some(at_pos) = email.find('@') {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = if local.len() > 1 {
                format!("{}***", &local[..1])
            } else {
                "***".to_string()
            };
            format!("{}{}", masked_local, domain)
        } else {
            "***".to_string()
        };
        tracing::debug!(user_email = %masked, "Finding user by email");

        let result = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }
}

/// PostgreSQL post repository over the post aggregate: the `posts` row plus
/// its `post_images`, `comments` and `post_likes` children.
pub struct PostgresPostRepository {
    db: DbConn,
}

fn query_err(e: DbErr) -> RepoError {
    RepoError::Query(e.to_string())
}

/// A write that races a concurrent post deletion hits the foreign key
/// instead of a missing row; report it as the post being gone.
fn write_err(e: DbErr) -> RepoError {
    let err_str = e.to_string();
    if err_str.contains("foreign key") {
        RepoError::NotFound
    } else {
        RepoError::Query(err_str)
    }
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub(crate) fn filter_condition(filter: &PostFilter) -> Condition {
        let mut cond = Condition::all();

        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = format!("%{search}%");
            cond = cond.add(
                Condition::any()
                    .add(Expr::col((post::Entity, post::Column::Title)).ilike(pattern.clone()))
                    .add(Expr::col((post::Entity, post::Column::Content)).ilike(pattern)),
            );
        }

        // `all` is the client's no-filter sentinel
        if let Some(category) = filter
            .category
            .as_deref()
            .filter(|c| !c.is_empty() && *c != "all")
        {
            cond = cond.add(post::Column::Category.eq(category));
        }

        if let Some(tag) = filter.tag.as_deref().filter(|t| !t.is_empty()) {
            cond = cond.add(Expr::cust_with_values("? = ANY(tags)", [tag]));
        }

        cond
    }

    async fn exists(&self, id: Uuid) -> Result<bool, RepoError> {
        let count = post::Entity::find_by_id(id)
            .count(&self.db)
            .await
            .map_err(query_err)?;
        Ok(count > 0)
    }

    async fn load(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let Some(model) = post::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?
        else {
            return Ok(None);
        };

        let mut posts = self.assemble(vec![model]).await?;
        Ok(posts.pop())
    }

    /// Project post rows into aggregates: batch-load children, then resolve
    /// every referenced identity to its public view in a single query.
    async fn assemble(&self, models: Vec<post::Model>) -> Result<Vec<Post>, RepoError> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let owners = models
            .load_one(user::Entity, &self.db)
            .await
            .map_err(query_err)?;
        let images = models
            .load_many(post_image::Entity, &self.db)
            .await
            .map_err(query_err)?;
        let comments = models
            .load_many(comment::Entity, &self.db)
            .await
            .map_err(query_err)?;
        let likes = models
            .load_many(post_like::Entity, &self.db)
            .await
            .map_err(query_err)?;

        let mut referenced: Vec<Uuid> = comments
            .iter()
            .flatten()
            .map(|c| c.user_id)
            .chain(likes.iter().flatten().map(|l| l.user_id))
            .collect();
        referenced.sort_unstable();
        referenced.dedup();

        let people: HashMap<Uuid, PublicUser> = if referenced.is_empty() {
            HashMap::new()
        } else {
            user::Entity::find()
                .filter(user::Column::Id.is_in(referenced))
                .all(&self.db)
                .await
                .map_err(query_err)?
                .into_iter()
                .map(|u| {
                    (
                        u.id,
                        PublicUser {
                            id: u.id,
                            email: u.email,
                        },
                    )
                })
                .collect()
        };

        let mut assembled = Vec::with_capacity(models.len());
        for ((((model, owner), mut post_images), mut post_comments), post_likes) in models
            .into_iter()
            .zip(owners)
            .zip(images)
            .zip(comments)
            .zip(likes)
        {
            let owner = owner
                .ok_or_else(|| RepoError::Query(format!("post {} has no owner row", model.id)))?;

            post_images.sort_by_key(|i| i.position);
            post_comments.sort_by_key(|c| c.created_at);

            let comments = post_comments
                .into_iter()
                .filter_map(|c| {
                    people.get(&c.user_id).map(|author| Comment {
                        id: c.id,
                        author: author.clone(),
                        content: c.content,
                        created_at: c.created_at.into(),
                    })
                })
                .collect();

            let likes = post_likes
                .into_iter()
                .filter_map(|l| people.get(&l.user_id).cloned())
                .collect();

            let status = model.status.parse().map_err(|_| {
                RepoError::Query(format!("post {} has invalid status", model.id))
            })?;
            let content_type = model.content_type.parse().map_err(|_| {
                RepoError::Query(format!("post {} has invalid content type", model.id))
            })?;

            assembled.push(Post {
                id: model.id,
                owner: PublicUser {
                    id: owner.id,
                    email: owner.email,
                },
                title: model.title,
                content: model.content,
                content_type,
                category: model.category,
                tags: model.tags,
                status,
                views: model.views,
                images: post_images
                    .into_iter()
                    .map(|i| PostImage {
                        url: i.url,
                        caption: i.caption,
                    })
                    .collect(),
                likes,
                comments,
                created_at: model.created_at.into(),
                updated_at: model.updated_at.into(),
            });
        }

        Ok(assembled)
    }

    async fn insert_images(
        &self,
        post_id: Uuid,
        base_position: i32,
        images: Vec<PostImage>,
    ) -> Result<(), RepoError> {
        if images.is_empty() {
            return Ok(());
        }

        let rows = images.into_iter().enumerate().map(|(i, image)| {
            post_image::ActiveModel {
                id: Set(Uuid::new_v4()),
                post_id: Set(post_id),
                position: Set(base_position + i as i32),
                url: Set(image.url),
                caption: Set(image.caption),
            }
        });

        post_image::Entity::insert_many(rows)
            .exec(&self.db)
            .await
            .map_err(write_err)?;

        Ok(())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, new_post: NewPost) -> Result<Post, RepoError> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let model = post::ActiveModel {
            id: Set(id),
            user_id: Set(new_post.owner_id),
            title: Set(new_post.title),
            content: Set(new_post.content),
            content_type: Set(new_post.content_type.as_str().to_string()),
            category: Set(new_post.category),
            tags: Set(new_post.tags),
            status: Set(new_post.status.as_str().to_string()),
            views: Set(0),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        post::Entity::insert(model)
            .exec(&self.db)
            .await
            .map_err(|e| {
                let err_str = e.to_string();
                if err_str.contains("foreign key") {
                    RepoError::Constraint("Post owner does not exist".to_string())
                } else {
                    RepoError::Query(err_str)
                }
            })?;

        self.insert_images(id, 0, new_post.images).await?;

        self.load(id).await?.ok_or(RepoError::NotFound)
    }

    async fn list(
        &self,
        filter: PostFilter,
        page: u64,
        per_page: u64,
    ) -> Result<PostPage, RepoError> {
        let page = page.max(1);

        let paginator = post::Entity::find()
            .filter(Self::filter_condition(&filter))
            .order_by_desc(post::Column::CreatedAt)
            .paginate(&self.db, per_page);

        let totals = paginator.num_items_and_pages().await.map_err(query_err)?;
        let models = paginator.fetch_page(page - 1).await.map_err(query_err)?;

        let posts = self.assemble(models).await?;

        Ok(PostPage {
            posts,
            total: totals.number_of_items,
            total_pages: totals.number_of_pages,
            current_page: page,
        })
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        self.load(id).await
    }

    async fn fetch_counting_view(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        // Atomic in-database increment; every read counts as a view.
        let result = post::Entity::update_many()
            .col_expr(post::Column::Views, Expr::col(post::Column::Views).add(1))
            .filter(post::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        self.load(id).await
    }

    async fn update(&self, id: Uuid, patch: PostPatch) -> Result<Option<Post>, RepoError> {
        let mut model = post::ActiveModel {
            id: Unchanged(id),
            ..Default::default()
        };

        if let Some(title) = patch.title {
            model.title = Set(title);
        }
        if let Some(content) = patch.content {
            model.content = Set(content);
        }
        if let Some(content_type) = patch.content_type {
            model.content_type = Set(content_type.as_str().to_string());
        }
        if let Some(category) = patch.category {
            model.category = Set(Some(category));
        }
        if let Some(tags) = patch.tags {
            model.tags = Set(tags);
        }
        if let Some(status) = patch.status {
            model.status = Set(status.as_str().to_string());
        }
        model.updated_at = Set(Utc::now().into());

        match post::Entity::update(model).exec(&self.db).await {
            Ok(_) => {}
            Err(DbErr::RecordNotUpdated) => return Ok(None),
            Err(e) => return Err(query_err(e)),
        }

        if !patch.new_images.is_empty() {
            let base = post_image::Entity::find()
                .filter(post_image::Column::PostId.eq(id))
                .count(&self.db)
                .await
                .map_err(query_err)? as i32;
            self.insert_images(id, base, patch.new_images).await?;
        }

        self.load(id).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = post::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn add_comment(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        content: String,
    ) -> Result<Option<Post>, RepoError> {
        if !self.exists(post_id).await? {
            return Ok(None);
        }

        let model = comment::ActiveModel {
            id: Set(Uuid::new_v4()),
            post_id: Set(post_id),
            user_id: Set(author_id),
            content: Set(content),
            created_at: Set(Utc::now().into()),
        };

        match comment::Entity::insert(model).exec(&self.db).await {
            Ok(_) => {}
            Err(e) => {
                return match write_err(e) {
                    RepoError::NotFound => Ok(None),
                    other => Err(other),
                };
            }
        }

        self.load(post_id).await
    }

    async fn update_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        content: String,
    ) -> Result<Option<Post>, RepoError> {
        let result = comment::Entity::update_many()
            .col_expr(comment::Column::Content, Expr::value(content))
            .filter(
                comment::Column::Id
                    .eq(comment_id)
                    .and(comment::Column::PostId.eq(post_id)),
            )
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        self.load(post_id).await
    }

    async fn delete_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<Post>, RepoError> {
        let result = comment::Entity::delete_many()
            .filter(
                comment::Column::Id
                    .eq(comment_id)
                    .and(comment::Column::PostId.eq(post_id)),
            )
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        self.load(post_id).await
    }

    async fn like(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Post>, RepoError> {
        if !self.exists(post_id).await? {
            return Ok(None);
        }

        // Atomic membership insert; a duplicate like is a no-op, not an error.
        let model = post_like::ActiveModel {
            post_id: Set(post_id),
            user_id: Set(user_id),
        };

        post_like::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([post_like::Column::PostId, post_like::Column::UserId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(write_err)?;

        self.load(post_id).await
    }

    async fn unlike(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Post>, RepoError> {
        if !self.exists(post_id).await? {
            return Ok(None);
        }

        // Unliking a post that was never liked simply affects zero rows.
        post_like::Entity::delete_many()
            .filter(
                post_like::Column::PostId
                    .eq(post_id)
                    .and(post_like::Column::UserId.eq(user_id)),
            )
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        self.load(post_id).await
    }
}
