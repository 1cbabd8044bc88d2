//! Post handlers: listing, detail, create/update/delete, comments, likes.
//!
//! Ownership gates: update/delete of a post require the acting identity to
//! be the owner; update/delete of a comment require the comment author.
//! Liking, unliking and commenting only require authentication. Existence
//! is checked before ownership, so a missing resource is a 404 even for a
//! would-be intruder.

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, web};
use futures::TryStreamExt;
use uuid::Uuid;

use quill_core::domain::{
    ContentType, NewPost, PostFilter, PostImage, PostPatch, PostStatus, normalize_tags,
};
use quill_infra::UploadPolicy;
use quill_shared::dto::{
    CommentRequest, MessageResponse, PostListQuery, PostListResponse, PostView,
};

use crate::handlers::multipart::{collect_capped, collect_text, discard};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::storage;

/// Fixed page size for the listing.
const PAGE_SIZE: u64 = 10;

/// At most this many image files are accepted per create/update request.
const MAX_IMAGES_PER_POST: usize = 5;

/// Text fields of the post form. Empty strings mean "not provided", the
/// same way the historical clients sent them.
#[derive(Default)]
struct PostForm {
    title: Option<String>,
    content: Option<String>,
    category: Option<String>,
    tags: Option<String>,
    status: Option<String>,
    content_type: Option<String>,
    images: Vec<PostImage>,
}

/// Read a multipart post form: text fields plus up to five validated image
/// files under `images`. Files are persisted as they stream in; a later
/// failure in the caller leaves them behind (they are never attached).
async fn read_post_form(
    req: &HttpRequest,
    payload: &mut Multipart,
    state: &AppState,
) -> AppResult<PostForm> {
    let policy = UploadPolicy::default();
    let conn = req.connection_info();
    let base_url = format!("{}://{}", conn.scheme(), conn.host());
    drop(conn);

    let mut form = PostForm::default();

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart payload: {e}")))?
    {
        let name = field.name().to_string();
        match name.as_str() {
            "title" => form.title = Some(collect_text(&mut field).await?),
            "content" => form.content = Some(collect_text(&mut field).await?),
            "category" => form.category = Some(collect_text(&mut field).await?),
            "tags" => form.tags = Some(collect_text(&mut field).await?),
            "status" => form.status = Some(collect_text(&mut field).await?),
            "contentType" => form.content_type = Some(collect_text(&mut field).await?),
            "images" => {
                if form.images.len() >= MAX_IMAGES_PER_POST {
                    return Err(AppError::BadRequest(format!(
                        "At most {MAX_IMAGES_PER_POST} images per post"
                    )));
                }

                let mimetype = field
                    .content_type()
                    .map(|m| m.essence_str().to_string())
                    .unwrap_or_default();
                policy.check_mime(&mimetype)?;

                let original_name = field
                    .content_disposition()
                    .get_filename()
                    .unwrap_or_default()
                    .to_string();
                let extension = policy.check_extension(&original_name)?;

                let bytes = collect_capped(&mut field, policy.max_bytes).await?;
                let stored = state.media.store(&extension, &bytes).await?;

                form.images.push(PostImage {
                    url: format!("{base_url}/uploads/{}", stored.filename),
                    caption: String::new(),
                });
            }
            _ => discard(&mut field).await?,
        }
    }

    Ok(form)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_status(value: Option<String>) -> AppResult<Option<PostStatus>> {
    match non_empty(value) {
        Some(s) => Ok(Some(s.parse::<PostStatus>()?)),
        None => Ok(None),
    }
}

fn parse_content_type(value: Option<String>) -> AppResult<Option<ContentType>> {
    match non_empty(value) {
        Some(s) => Ok(Some(s.parse::<ContentType>()?)),
        None => Ok(None),
    }
}

/// GET /api/posts - public listing with filters and pagination.
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<PostListQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let filter = PostFilter {
        search: query.search,
        category: query.category,
        tag: query.tag,
    };
    let page = query.page.unwrap_or(1).max(1);

    let listing = storage::bounded_read(state.storage_timeout, || {
        state.posts.list(filter.clone(), page, PAGE_SIZE)
    })
    .await?;

    Ok(HttpResponse::Ok().json(PostListResponse::from(listing)))
}

/// GET /api/posts/{id} - public detail; every read counts a view.
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    // Not retried: the view increment makes this read non-idempotent.
    let post = storage::bounded(state.storage_timeout, state.posts.fetch_counting_view(id))
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    Ok(HttpResponse::Ok().json(PostView::from(post)))
}

/// POST /api/posts - multipart create.
pub async fn create_post(
    identity: Identity,
    state: web::Data<AppState>,
    req: HttpRequest,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let form = read_post_form(&req, &mut payload, &state).await?;

    let (Some(title), Some(content)) = (non_empty(form.title), non_empty(form.content)) else {
        return Err(AppError::BadRequest(
            "Title and content are required".to_string(),
        ));
    };

    let new_post = NewPost {
        owner_id: identity.user.id,
        title,
        content,
        content_type: parse_content_type(form.content_type)?.unwrap_or(ContentType::Html),
        category: non_empty(form.category),
        tags: normalize_tags(form.tags.unwrap_or_default().split(',')),
        status: parse_status(form.status)?.unwrap_or(PostStatus::Published),
        images: form.images,
    };

    let post = storage::bounded(state.storage_timeout, state.posts.create(new_post)).await?;
    tracing::info!(post_id = %post.id, owner = %identity.user.id, "Post created");

    Ok(HttpResponse::Created().json(PostView::from(post)))
}

/// PUT /api/posts/{id} - multipart partial update, owner only. Uploaded
/// images are appended to the existing list.
pub async fn update_post(
    identity: Identity,
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let existing = storage::bounded_read(state.storage_timeout, || state.posts.fetch(id))
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    if !existing.is_owned_by(identity.user.id) {
        return Err(AppError::Forbidden(
            "Not authorized to update this post".to_string(),
        ));
    }

    let form = read_post_form(&req, &mut payload, &state).await?;

    let patch = PostPatch {
        title: non_empty(form.title),
        content: non_empty(form.content),
        content_type: parse_content_type(form.content_type)?,
        category: non_empty(form.category),
        // A present-but-empty tags field clears the list
        tags: form
            .tags
            .map(|t| normalize_tags(t.split(','))),
        status: parse_status(form.status)?,
        new_images: form.images,
    };

    let post = storage::bounded(state.storage_timeout, state.posts.update(id, patch))
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    Ok(HttpResponse::Ok().json(PostView::from(post)))
}

/// DELETE /api/posts/{id} - owner only. The record goes first; backing
/// image files are cleaned up best-effort afterwards.
pub async fn delete_post(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let existing = storage::bounded_read(state.storage_timeout, || state.posts.fetch(id))
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    if !existing.is_owned_by(identity.user.id) {
        return Err(AppError::Forbidden(
            "Not authorized to delete this post".to_string(),
        ));
    }

    storage::bounded(state.storage_timeout, state.posts.delete(id)).await?;

    for image in &existing.images {
        let Some(filename) = stored_filename(&image.url) else {
            continue;
        };
        if let Err(e) = state.media.remove(filename).await {
            tracing::warn!(post_id = %id, file = %filename, "Failed to delete image file: {e}");
        }
    }

    tracing::info!(post_id = %id, owner = %identity.user.id, "Post deleted");

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Post deleted successfully".to_string(),
    }))
}

/// The trailing segment of an upload URL, if it is one of ours.
fn stored_filename(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("/uploads/")?;
    if rest.is_empty() || rest.contains('/') {
        return None;
    }
    Some(rest)
}

/// POST /api/posts/{id}/comments - any authenticated user may comment.
pub async fn add_comment(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let content = body.into_inner().content;

    if content.trim().is_empty() {
        return Err(AppError::BadRequest("Comment content is required".to_string()));
    }

    let post = storage::bounded(
        state.storage_timeout,
        state.posts.add_comment(id, identity.user.id, content),
    )
    .await?
    .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    Ok(HttpResponse::Created().json(PostView::from(post)))
}

/// PUT /api/posts/{id}/comments/{comment_id} - comment author only.
pub async fn update_comment(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let content = body.into_inner().content;

    if content.trim().is_empty() {
        return Err(AppError::BadRequest("Comment content is required".to_string()));
    }

    authorize_comment(&state, post_id, comment_id, identity.user.id, "update").await?;

    let post = storage::bounded(
        state.storage_timeout,
        state.posts.update_comment(post_id, comment_id, content),
    )
    .await?
    .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    Ok(HttpResponse::Ok().json(PostView::from(post)))
}

/// DELETE /api/posts/{id}/comments/{comment_id} - comment author only.
pub async fn delete_comment(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();

    authorize_comment(&state, post_id, comment_id, identity.user.id, "delete").await?;

    let post = storage::bounded(
        state.storage_timeout,
        state.posts.delete_comment(post_id, comment_id),
    )
    .await?
    .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    Ok(HttpResponse::Ok().json(PostView::from(post)))
}

/// 404 for a missing post or comment, 403 for someone else's comment.
async fn authorize_comment(
    state: &AppState,
    post_id: Uuid,
    comment_id: Uuid,
    user_id: Uuid,
    action: &str,
) -> AppResult<()> {
    let post = storage::bounded_read(state.storage_timeout, || state.posts.fetch(post_id))
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    let comment = post
        .comment(comment_id)
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    if !comment.is_authored_by(user_id) {
        return Err(AppError::Forbidden(format!(
            "Not authorized to {action} this comment"
        )));
    }

    Ok(())
}

/// POST /api/posts/{id}/like - idempotent; an already-liked post is a
/// success no-op.
pub async fn like_post(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let post = storage::bounded(state.storage_timeout, state.posts.like(id, identity.user.id))
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    Ok(HttpResponse::Ok().json(PostView::from(post)))
}

/// DELETE /api/posts/{id}/like - idempotent; unliking a never-liked post
/// is a success no-op.
pub async fn unlike_post(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let post = storage::bounded(
        state.storage_timeout,
        state.posts.unlike(id, identity.user.id),
    )
    .await?
    .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    Ok(HttpResponse::Ok().json(PostView::from(post)))
}
