//! Multipart field draining helpers.

use actix_multipart::Field;
use futures::TryStreamExt;

use quill_infra::UploadError;

use crate::middleware::error::AppError;

/// Text fields larger than this are junk, not form data.
const MAX_TEXT_FIELD_BYTES: usize = 1024 * 1024;

fn stream_err(e: actix_multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("Malformed multipart payload: {e}"))
}

/// Drain a field into memory, failing with `TooLarge` as soon as the cap is
/// exceeded rather than buffering the whole body first.
pub(super) async fn collect_capped(field: &mut Field, cap: usize) -> Result<Vec<u8>, AppError> {
    let mut bytes = Vec::new();

    while let Some(chunk) = field.try_next().await.map_err(stream_err)? {
        if bytes.len() + chunk.len() > cap {
            return Err(UploadError::TooLarge(cap).into());
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

/// Drain a text field into a UTF-8 string.
pub(super) async fn collect_text(field: &mut Field) -> Result<String, AppError> {
    let name = field.name().to_string();
    let bytes = collect_capped(field, MAX_TEXT_FIELD_BYTES).await?;

    String::from_utf8(bytes)
        .map_err(|_| AppError::BadRequest(format!("Field '{name}' is not valid UTF-8")))
}

/// Drain and discard a field the handler does not care about.
pub(super) async fn discard(field: &mut Field) -> Result<(), AppError> {
    while field.try_next().await.map_err(stream_err)?.is_some() {}
    Ok(())
}
