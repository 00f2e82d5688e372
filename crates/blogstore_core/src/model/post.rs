//! Post domain model: read projections and write inputs.
//!
//! # Invariants
//! - `slug` always reflects the current title; inputs carry no slug.
//! - Input tag references are treated as a set (duplicates collapse).
//! - Timestamps are epoch milliseconds supplied by the caller.

use super::slug::derive_slug;
use super::tag::{Tag, TagId, TagRef};
use super::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Stable post identifier, assigned by the repository on insert.
pub type PostId = Uuid;

/// Summary projection used by list views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: PostId,
    pub title: String,
    pub slug: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub is_draft: bool,
    pub tags: Vec<Tag>,
}

/// Full-content projection used by detail views and mutation results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostWithContent {
    pub id: PostId,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub is_draft: bool,
    pub tags: Vec<Tag>,
}

impl PostWithContent {
    /// Ids of the attached tags as a set.
    pub fn tag_ids(&self) -> BTreeSet<TagId> {
        self.tags.iter().map(|tag| tag.id).collect()
    }
}

impl From<PostWithContent> for PostSummary {
    fn from(post: PostWithContent) -> Self {
        Self {
            id: post.id,
            title: post.title,
            slug: post.slug,
            created_at: post.created_at,
            updated_at: post.updated_at,
            is_draft: post.is_draft,
            tags: post.tags,
        }
    }
}

/// Input for creating a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostCreateInput {
    pub title: String,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub is_draft: bool,
    #[serde(default)]
    pub tags: Vec<TagRef>,
}

/// Input for replacing an existing post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostUpdateInput {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub is_draft: bool,
    #[serde(default)]
    pub tags: Vec<TagRef>,
}

impl PostUpdateInput {
    /// Builds an update for `id` from the same fields a create carries.
    pub fn from_create(id: PostId, input: PostCreateInput) -> Self {
        Self {
            id,
            title: input.title,
            content: input.content,
            created_at: input.created_at,
            updated_at: input.updated_at,
            is_draft: input.is_draft,
            tags: input.tags,
        }
    }
}

/// Validated, storage-ready post fields shared by create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PostDraft<'a> {
    pub title: &'a str,
    pub slug: String,
    pub content: &'a str,
    pub created_at: i64,
    pub updated_at: i64,
    pub is_draft: bool,
    pub tag_ids: BTreeSet<TagId>,
}

impl<'a> PostDraft<'a> {
    fn build(
        title: &'a str,
        content: &'a str,
        created_at: i64,
        updated_at: i64,
        is_draft: bool,
        tags: &[TagRef],
    ) -> Result<Self, ValidationError> {
        let slug = derive_slug(title)?;
        Ok(Self {
            title,
            slug,
            content,
            created_at,
            updated_at,
            is_draft,
            tag_ids: tags.iter().map(|tag| tag.id).collect(),
        })
    }
}

impl PostCreateInput {
    pub(crate) fn to_draft(&self) -> Result<PostDraft<'_>, ValidationError> {
        PostDraft::build(
            &self.title,
            &self.content,
            self.created_at,
            self.updated_at,
            self.is_draft,
            &self.tags,
        )
    }
}

impl PostUpdateInput {
    pub(crate) fn to_draft(&self) -> Result<PostDraft<'_>, ValidationError> {
        PostDraft::build(
            &self.title,
            &self.content,
            self.created_at,
            self.updated_at,
            self.is_draft,
            &self.tags,
        )
    }
}
