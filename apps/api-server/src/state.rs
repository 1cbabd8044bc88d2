//! Application state - shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use quill_core::ports::{MediaStore, PostRepository, UserRepository};
use quill_infra::database::{InMemoryStore, PostgresPostRepository, PostgresUserRepository};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub media: Arc<dyn MediaStore>,
    pub storage_timeout: Duration,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig, media: Arc<dyn MediaStore>) -> Self {
        let (users, posts): (Arc<dyn UserRepository>, Arc<dyn PostRepository>) =
            match &config.database {
                Some(db_config) => match quill_infra::connect(db_config).await {
                    Ok(conn) => (
                        Arc::new(PostgresUserRepository::new(conn.clone())),
                        Arc::new(PostgresPostRepository::new(conn)),
                    ),
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                        Self::in_memory()
                    }
                },
                None => {
                    tracing::warn!(
                        "DATABASE_URL not set. Running without database (in-memory mode)."
                    );
                    Self::in_memory()
                }
            };

        tracing::info!("Application state initialized");

        Self {
            users,
            posts,
            media,
            storage_timeout: config.storage_timeout,
        }
    }

    fn in_memory() -> (Arc<dyn UserRepository>, Arc<dyn PostRepository>) {
        let store = Arc::new(InMemoryStore::new());
        (store.clone(), store)
    }
}
