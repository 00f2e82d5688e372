//! Post repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide post count/list/lookup on top of the dynamic query builder.
//! - Own the post-to-tag association lifecycle.
//!
//! # Invariants
//! - Create/update/remove run in one `IMMEDIATE` transaction; any failing
//!   step rolls back every earlier write of the same call.
//! - After create/update the association rows equal exactly the distinct
//!   input tag ids (delete-all then insert-all, invisible to other readers).
//! - Slugs are re-derived from the current title on every write.
//! - Post rows are removed only after their association rows.

use super::query::{
    PostFilter, PostListQuery, PostQueryBuilder, Projection, POST_CONTENT_COLUMN,
    POST_SUMMARY_COLUMNS,
};
use super::tag_repo::parse_tag_row;
use super::{parse_uuid, RepoError, RepoResult};
use crate::model::post::{
    PostCreateInput, PostDraft, PostId, PostSummary, PostUpdateInput, PostWithContent,
};
use crate::model::tag::{Tag, TagId};
use rusqlite::{
    named_params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior,
};
use std::collections::BTreeSet;
use uuid::Uuid;

const ENTITY: &str = "post";
const RETURNING_COLUMNS: &str = "id, title, slug, content, created_at, updated_at, is_draft";

/// Repository interface for post search, lookup and mutation.
pub trait PostRepository {
    /// Counts posts matching the title search and all-of tag filter.
    fn count(&self, filter: &PostFilter) -> RepoResult<i64>;
    /// Lists one page of matching posts without content.
    fn get_all(&self, query: &PostListQuery) -> RepoResult<Vec<PostSummary>>;
    /// Lists one page of matching posts including content.
    fn get_all_with_content(&self, query: &PostListQuery) -> RepoResult<Vec<PostWithContent>>;
    /// Looks up one post by slug.
    fn get_with_slug(&self, slug: &str) -> RepoResult<PostWithContent>;
    /// Looks up one post by id.
    fn get(&self, id: PostId) -> RepoResult<PostWithContent>;
    /// Inserts a post and its tag associations.
    fn create(&mut self, input: &PostCreateInput) -> RepoResult<PostWithContent>;
    /// Replaces a post's fields and its full tag set.
    fn update(&mut self, input: &PostUpdateInput) -> RepoResult<PostWithContent>;
    /// Deletes a post and its tag associations.
    fn remove(&mut self, id: PostId) -> RepoResult<PostId>;
}

/// SQLite-backed post repository.
pub struct SqlitePostRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqlitePostRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }

    fn list(&self, query: &PostListQuery, projection: Projection) -> RepoResult<Vec<PostRow>> {
        let built = PostQueryBuilder::new(&query.filter).select(projection, query.paging);
        let params = built.named_params();
        let mut stmt = self.conn.prepare(&built.sql)?;
        let mut rows = stmt.query(params.as_slice())?;

        let mut posts = Vec::new();
        while let Some(row) = rows.next()? {
            posts.push(PostRow::read(row, projection)?);
        }
        Ok(posts)
    }

    fn find_one(&self, column: &'static str, key: &str) -> RepoResult<PostWithContent> {
        let sql = format!(
            "SELECT {POST_SUMMARY_COLUMNS}, {POST_CONTENT_COLUMN}
             FROM post
             WHERE post.{column} = :key;"
        );
        let row = self
            .conn
            .query_row(&sql, named_params! { ":key": key }, |row| {
                PostRow::read(row, Projection::WithContent)
            })
            .optional()?;

        match row {
            Some(row) => {
                let tags = load_tags_for_post(self.conn, &row.id)?;
                row.into_with_content(tags)
            }
            None => Err(RepoError::not_found(ENTITY, key)),
        }
    }
}

impl PostRepository for SqlitePostRepository<'_> {
    fn count(&self, filter: &PostFilter) -> RepoResult<i64> {
        let built = PostQueryBuilder::new(filter).count();
        let params = built.named_params();
        let count = self
            .conn
            .query_row(&built.sql, params.as_slice(), |row| row.get(0))?;
        Ok(count)
    }

    fn get_all(&self, query: &PostListQuery) -> RepoResult<Vec<PostSummary>> {
        self.list(query, Projection::Summary)?
            .into_iter()
            .map(|row| {
                let tags = load_tags_for_post(self.conn, &row.id)?;
                row.into_summary(tags)
            })
            .collect()
    }

    fn get_all_with_content(&self, query: &PostListQuery) -> RepoResult<Vec<PostWithContent>> {
        self.list(query, Projection::WithContent)?
            .into_iter()
            .map(|row| {
                let tags = load_tags_for_post(self.conn, &row.id)?;
                row.into_with_content(tags)
            })
            .collect()
    }

    fn get_with_slug(&self, slug: &str) -> RepoResult<PostWithContent> {
        self.find_one("slug", slug)
    }

    fn get(&self, id: PostId) -> RepoResult<PostWithContent> {
        self.find_one("id", &id.to_string())
    }

    fn create(&mut self, input: &PostCreateInput) -> RepoResult<PostWithContent> {
        let draft = input.to_draft()?;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let row = tx.query_row(
            &format!(
                "INSERT INTO post (id, title, slug, content, created_at, updated_at, is_draft)
                 VALUES (:id, :title, :slug, :content, :created_at, :updated_at, :is_draft)
                 RETURNING {RETURNING_COLUMNS};"
            ),
            named_params! {
                ":id": Uuid::new_v4().to_string(),
                ":title": draft.title,
                ":slug": draft.slug.as_str(),
                ":content": draft.content,
                ":created_at": draft.created_at,
                ":updated_at": draft.updated_at,
                ":is_draft": draft.is_draft,
            },
            |row| PostRow::read(row, Projection::WithContent),
        )?;

        let post = finish_write(&tx, row, &draft)?;
        tx.commit()?;
        Ok(post)
    }

    fn update(&mut self, input: &PostUpdateInput) -> RepoResult<PostWithContent> {
        let draft = input.to_draft()?;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let row = tx
            .query_row(
                &format!(
                    "UPDATE post SET
                        title = :title,
                        slug = :slug,
                        content = :content,
                        created_at = :created_at,
                        updated_at = :updated_at,
                        is_draft = :is_draft
                     WHERE id = :id
                     RETURNING {RETURNING_COLUMNS};"
                ),
                named_params! {
                    ":id": input.id.to_string(),
                    ":title": draft.title,
                    ":slug": draft.slug.as_str(),
                    ":content": draft.content,
                    ":created_at": draft.created_at,
                    ":updated_at": draft.updated_at,
                    ":is_draft": draft.is_draft,
                },
                |row| PostRow::read(row, Projection::WithContent),
            )
            .optional()?;

        let Some(row) = row else {
            return Err(RepoError::not_found(ENTITY, input.id));
        };
        let post = finish_write(&tx, row, &draft)?;
        tx.commit()?;
        Ok(post)
    }

    fn remove(&mut self, id: PostId) -> RepoResult<PostId> {
        let id_text = id.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "DELETE FROM post_tag WHERE post_id = ?1;",
            [id_text.as_str()],
        )?;
        let removed: Option<String> = tx
            .query_row(
                "DELETE FROM post WHERE id = ?1 RETURNING id;",
                [id_text.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        let Some(removed) = removed else {
            return Err(RepoError::not_found(ENTITY, id));
        };
        tx.commit()?;
        parse_uuid(&removed, "post.id")
    }
}

/// Replaces the association rows and resolves the persisted tag set.
fn finish_write(
    tx: &Transaction<'_>,
    row: PostRow,
    draft: &PostDraft<'_>,
) -> RepoResult<PostWithContent> {
    replace_post_tags(tx, &row.id, &draft.tag_ids)?;
    let tags = load_tags_for_post(tx, &row.id)?;
    row.into_with_content(tags)
}

fn replace_post_tags(
    tx: &Transaction<'_>,
    post_id: &str,
    tag_ids: &BTreeSet<TagId>,
) -> RepoResult<()> {
    tx.execute("DELETE FROM post_tag WHERE post_id = ?1;", [post_id])?;

    let mut insert =
        tx.prepare_cached("INSERT INTO post_tag (post_id, tag_id) VALUES (?1, ?2);")?;
    for tag_id in tag_ids {
        insert.execute([post_id, tag_id.to_string().as_str()])?;
    }
    Ok(())
}

fn load_tags_for_post(conn: &Connection, post_id: &str) -> RepoResult<Vec<Tag>> {
    let mut stmt = conn.prepare_cached(
        "SELECT tag.id AS id, tag.name AS name
         FROM tag
         INNER JOIN post_tag ON post_tag.tag_id = tag.id
         WHERE post_tag.post_id = ?1
         ORDER BY tag.name ASC, tag.id ASC;",
    )?;
    let mut rows = stmt.query([post_id])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(parse_tag_row(row)?);
    }
    Ok(tags)
}

/// Raw post columns as stored.
#[derive(Debug)]
struct PostRow {
    id: String,
    title: String,
    slug: String,
    content: Option<String>,
    created_at: i64,
    updated_at: i64,
    is_draft: bool,
}

impl PostRow {
    fn read(row: &Row<'_>, projection: Projection) -> rusqlite::Result<Self> {
        let content = match projection {
            Projection::WithContent => Some(row.get("content")?),
            Projection::Summary => None,
        };
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            slug: row.get("slug")?,
            content,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
            is_draft: row.get("is_draft")?,
        })
    }

    fn into_summary(self, tags: Vec<Tag>) -> RepoResult<PostSummary> {
        Ok(PostSummary {
            id: parse_uuid(&self.id, "post.id")?,
            title: self.title,
            slug: self.slug,
            created_at: self.created_at,
            updated_at: self.updated_at,
            is_draft: self.is_draft,
            tags,
        })
    }

    fn into_with_content(self, tags: Vec<Tag>) -> RepoResult<PostWithContent> {
        let Some(content) = self.content else {
            return Err(RepoError::InvalidData(format!(
                "post `{}` was read without its content column",
                self.id
            )));
        };
        Ok(PostWithContent {
            id: parse_uuid(&self.id, "post.id")?,
            title: self.title,
            slug: self.slug,
            content,
            created_at: self.created_at,
            updated_at: self.updated_at,
            is_draft: self.is_draft,
            tags,
        })
    }
}
