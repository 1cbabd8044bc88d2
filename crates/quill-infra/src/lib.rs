//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`:
//! JWT tokens, Argon2 password hashing, SeaORM/Postgres repositories with
//! an in-memory twin, and the filesystem media store.

pub mod auth;
pub mod database;
pub mod media;

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
pub use database::{DatabaseConfig, InMemoryStore, connect};
pub use media::{FsMediaStore, UploadError, UploadPolicy};

pub use database::{PostgresPostRepository, PostgresUserRepository};
