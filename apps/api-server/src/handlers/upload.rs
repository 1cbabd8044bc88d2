//! Standalone image upload endpoint.
//!
//! Validation order: file presence, declared MIME type, extension, size.
//! A stored file is not rolled back if the caller's subsequent work fails.

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, web};
use futures::TryStreamExt;

use quill_infra::{UploadError, UploadPolicy};
use quill_shared::dto::UploadResponse;

use crate::handlers::multipart::{collect_capped, discard};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/upload - multipart, single file under field `image`.
pub async fn upload_image(
    _identity: Identity,
    state: web::Data<AppState>,
    req: HttpRequest,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let policy = UploadPolicy::default();
    let mut uploaded: Option<(String, u64, String)> = None;

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart payload: {e}")))?
    {
        if field.name() != "image" || uploaded.is_some() {
            discard(&mut field).await?;
            continue;
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
        tracing::info!(
            file = %stored.filename,
            size = stored.size,
            mimetype = %mimetype,
            "File uploaded"
        );

        uploaded = Some((stored.filename, stored.size, mimetype));
    }

    let (filename, size, mimetype) = uploaded.ok_or(UploadError::NoFile)?;

    let conn = req.connection_info();
    let url = format!("{}://{}/uploads/{}", conn.scheme(), conn.host(), filename);

    Ok(HttpResponse::Ok().json(UploadResponse {
        url,
        filename,
        size,
        mimetype,
    }))
}
