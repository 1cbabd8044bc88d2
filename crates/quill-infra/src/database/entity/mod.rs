//! SeaORM entities.
//!
//! Comments, likes and images live in their own tables so mutating them is
//! an atomic row insert/delete rather than a read-modify-write of an
//! embedded list on the post row.

pub mod comment;
pub mod post;
pub mod post_image;
pub mod post_like;
pub mod user;
