//! Relational content store for blog posts and their tags.
//! This crate is the single source of truth for content invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::post::{NewPost, Post, PostId, PostPatch, PostSummary, EXCERPT_MAX_CHARS};
pub use model::tag::{Tag, TagId};
pub use model::ValidationError;
pub use repo::post_repo::{PostRepository, SqlitePostRepository};
pub use repo::tag_repo::{SqliteTagRepository, TagRepository};
pub use repo::{RepoError, RepoResult};
pub use service::post_service::{PostService, PostServiceError};
pub use service::tag_service::{TagService, TagServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
