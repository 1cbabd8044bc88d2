//! Bounded storage access.
//!
//! Repository calls run under an explicit timeout so a stalled data store
//! surfaces as `StorageUnavailable` instead of hanging the request.
//! Idempotent reads get one retry with a short backoff on connection-class
//! failures; writes are never blindly retried.

use std::future::Future;
use std::time::Duration;

use quill_core::error::RepoError;

use crate::middleware::error::AppError;

const RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// Run a storage operation under `timeout`.
pub async fn bounded<T, F>(timeout: Duration, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, RepoError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(e.into()),
        Err(_) => Err(AppError::StorageUnavailable),
    }
}

/// Run an idempotent read under `timeout`, retrying once after a short
/// backoff if the store timed out or the connection failed. Only safe for
/// operations with no side effects.
pub async fn bounded_read<T, F, Fut>(timeout: Duration, mut op: F) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RepoError>>,
{
    let retryable = match tokio::time::timeout(timeout, op()).await {
        Ok(Ok(value)) => return Ok(value),
        Ok(Err(RepoError::Connection(detail))) => RepoError::Connection(detail),
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => {
            tokio::time::sleep(RETRY_BACKOFF).await;
            return bounded(timeout, op()).await;
        }
    };

    tracing::warn!("Retrying read after connection failure: {}", retryable);
    tokio::time::sleep(RETRY_BACKOFF).await;
    bounded(timeout, op()).await
}
