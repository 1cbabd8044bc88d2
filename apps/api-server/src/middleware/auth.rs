//! Authenticated identity extraction.
//!
//! Extracts the bearer token, verifies it, then resolves the subject
//! against the credential store - a token whose subject no longer exists
//! (user deleted after issuance) is rejected, not trusted.

use std::sync::Arc;

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use futures::future::LocalBoxFuture;

use quill_core::domain::User;
use quill_core::ports::TokenService;

use crate::middleware::error::AppError;
use crate::state::AppState;
use crate::storage;

/// Authenticated user identity extractor.
///
/// Use this in handlers to require authentication:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.user.email)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user: User,
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let token_service = req
                .app_data::<web::Data<Arc<dyn TokenService>>>()
                .ok_or_else(|| {
                    tracing::error!("TokenService not found in app data");
                    AppError::Internal("Server configuration error".to_string())
                })?
                .clone();

            let state = req
                .app_data::<web::Data<AppState>>()
                .ok_or_else(|| {
                    tracing::error!("AppState not found in app data");
                    AppError::Internal("Server configuration error".to_string())
                })?
                .clone();

            // Extract Bearer token from Authorization header
            let auth_header = req
                .headers()
                .get(header::AUTHORIZATION)
                .ok_or_else(|| AppError::Unauthenticated("No token provided".to_string()))?;

            let auth_str = auth_header.to_str().map_err(|_| {
                AppError::Unauthenticated("Invalid authorization header".to_string())
            })?;

            let token = auth_str
                .strip_prefix("Bearer ")
                .ok_or_else(|| AppError::Unauthenticated("Expected Bearer token".to_string()))?;

            let claims = token_service.validate_token(token).map_err(AppError::from)?;

            // Stale subject: valid signature, but the account is gone.
            let user = storage::bounded(
                state.storage_timeout,
                state.users.find_by_id(claims.user_id),
            )
            .await?
            .ok_or_else(|| AppError::Unauthenticated("Invalid token".to_string()))?;

            Ok(Identity { user })
        })
    }
}
