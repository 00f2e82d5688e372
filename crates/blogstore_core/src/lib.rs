//! Data-access core for the blog backend.
//! Posts, tags, their many-to-many association and the dynamic query
//! construction behind search, tag filtering and pagination.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{LogConfig, StoreConfig};
pub use db::{DbError, DbResult, Store, StoreConnection};
pub use logging::{default_log_level, init_logging, init_logging_with, logging_status, LogTarget};
pub use model::paging::Paging;
pub use model::post::{PostCreateInput, PostId, PostSummary, PostUpdateInput, PostWithContent};
pub use model::slug::slugify;
pub use model::tag::{parse_id, parse_tag_names, Tag, TagId, TagRef};
pub use model::validation::ValidationError;
pub use repo::post_repo::{PostRepository, SqlitePostRepository};
pub use repo::query::{PostFilter, PostListQuery, PostQueryBuilder, Projection};
pub use repo::tag_repo::{SqliteTagRepository, TagRepository};
pub use repo::{ErrorKind, RepoError, RepoResult};
pub use service::blog_service::BlogService;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
