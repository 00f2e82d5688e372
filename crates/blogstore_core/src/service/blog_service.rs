//! Blog use-case service.
//!
//! # Responsibility
//! - Expose the tag/post operations consumed by the routing layer.
//! - Scope one store connection per call and log each outcome.
//!
//! # Invariants
//! - The connection is released on every exit path (guard drop).
//! - The service never retries; the first error is returned as-is.

use crate::db::Store;
use crate::model::paging::Paging;
use crate::model::post::{PostCreateInput, PostId, PostSummary, PostUpdateInput, PostWithContent};
use crate::model::tag::{Tag, TagId};
use crate::repo::post_repo::{PostRepository, SqlitePostRepository};
use crate::repo::query::{PostFilter, PostListQuery};
use crate::repo::tag_repo::{SqliteTagRepository, TagRepository};
use crate::repo::{ErrorKind, RepoResult};
use log::{debug, error, warn};
use std::time::Instant;

/// Service facade over the tag and post repositories.
pub struct BlogService<'store> {
    store: &'store Store,
}

impl<'store> BlogService<'store> {
    /// Creates a service borrowing the application's store.
    pub fn new(store: &'store Store) -> Self {
        Self { store }
    }

    pub fn tag_count(&self, search: &str) -> RepoResult<i64> {
        self.with_tags("tag_count", |repo| repo.count(search))
    }

    pub fn tag_list(&self, search: &str, paging: Paging) -> RepoResult<Vec<Tag>> {
        self.with_tags("tag_list", |repo| repo.get_all(search, paging))
    }

    pub fn tag_create(&self, name: &str) -> RepoResult<Tag> {
        self.with_tags("tag_create", |repo| repo.create(name))
    }

    pub fn tag_update(&self, id: TagId, name: &str) -> RepoResult<Tag> {
        self.with_tags("tag_update", |repo| repo.update(id, name))
    }

    pub fn tag_remove(&self, id: TagId) -> RepoResult<TagId> {
        self.with_tags("tag_remove", |repo| repo.remove(id))
    }

    pub fn post_count(&self, filter: &PostFilter) -> RepoResult<i64> {
        self.with_posts("post_count", |repo| repo.count(filter))
    }

    pub fn post_list(&self, query: &PostListQuery) -> RepoResult<Vec<PostSummary>> {
        self.with_posts("post_list", |repo| repo.get_all(query))
    }

    pub fn post_list_with_content(
        &self,
        query: &PostListQuery,
    ) -> RepoResult<Vec<PostWithContent>> {
        self.with_posts("post_list_with_content", |repo| {
            repo.get_all_with_content(query)
        })
    }

    pub fn post_get_by_slug(&self, slug: &str) -> RepoResult<PostWithContent> {
        self.with_posts("post_get_by_slug", |repo| repo.get_with_slug(slug))
    }

    pub fn post_get(&self, id: PostId) -> RepoResult<PostWithContent> {
        self.with_posts("post_get", |repo| repo.get(id))
    }

    pub fn post_create(&self, input: &PostCreateInput) -> RepoResult<PostWithContent> {
        self.with_posts("post_create", |repo| repo.create(input))
    }

    pub fn post_update(&self, input: &PostUpdateInput) -> RepoResult<PostWithContent> {
        self.with_posts("post_update", |repo| repo.update(input))
    }

    pub fn post_remove(&self, id: PostId) -> RepoResult<PostId> {
        self.with_posts("post_remove", |repo| repo.remove(id))
    }

    fn with_tags<T>(
        &self,
        event: &'static str,
        op: impl FnOnce(&mut SqliteTagRepository<'_>) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let started_at = Instant::now();
        let mut conn = self.store.acquire();
        let result = op(&mut SqliteTagRepository::new(&mut conn));
        log_outcome(event, &result, started_at);
        result
    }

    fn with_posts<T>(
        &self,
        event: &'static str,
        op: impl FnOnce(&mut SqlitePostRepository<'_>) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let started_at = Instant::now();
        let mut conn = self.store.acquire();
        let result = op(&mut SqlitePostRepository::new(&mut conn));
        log_outcome(event, &result, started_at);
        result
    }
}

fn log_outcome<T>(event: &'static str, result: &RepoResult<T>, started_at: Instant) {
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(_) => debug!("event={event} module=service status=ok duration_ms={duration_ms}"),
        Err(err) => match err.kind() {
            ErrorKind::Validation | ErrorKind::NotFound => warn!(
                "event={event} module=service status=rejected duration_ms={duration_ms} error={err}"
            ),
            ErrorKind::Store | ErrorKind::Connection => error!(
                "event={event} module=service status=error duration_ms={duration_ms} error={err}"
            ),
        },
    }
}
