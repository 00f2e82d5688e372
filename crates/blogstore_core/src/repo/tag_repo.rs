//! Tag repository contract and SQLite implementation.
//!
//! # Invariants
//! - Search is a case-insensitive literal substring match on `name`.
//! - Names are trimmed and must be non-empty before insert/update.
//! - Removing a tag detaches it from every post in the same transaction.

use super::query::{contains_predicate, escape_like};
use super::{parse_uuid, RepoError, RepoResult};
use crate::model::paging::Paging;
use crate::model::tag::{normalize_tag_name, Tag, TagId};
use rusqlite::{named_params, Connection, OptionalExtension, Row, TransactionBehavior};
use uuid::Uuid;

const ENTITY: &str = "tag";

/// Repository interface for tag CRUD and search.
pub trait TagRepository {
    /// Counts tags whose name contains `search`.
    fn count(&self, search: &str) -> RepoResult<i64>;
    /// Lists matching tags ordered by name.
    fn get_all(&self, search: &str, paging: Paging) -> RepoResult<Vec<Tag>>;
    /// Inserts a tag and returns the persisted row.
    fn create(&self, name: &str) -> RepoResult<Tag>;
    /// Renames a tag and returns the persisted row.
    fn update(&self, id: TagId, name: &str) -> RepoResult<Tag>;
    /// Deletes a tag together with its post associations.
    fn remove(&mut self, id: TagId) -> RepoResult<TagId>;
}

/// SQLite-backed tag repository.
pub struct SqliteTagRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteTagRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl TagRepository for SqliteTagRepository<'_> {
    fn count(&self, search: &str) -> RepoResult<i64> {
        let sql = format!(
            "SELECT COUNT(tag.id) FROM tag WHERE {};",
            contains_predicate("tag.name")
        );
        let count = self.conn.query_row(
            &sql,
            named_params! { ":search": escape_like(search) },
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn get_all(&self, search: &str, paging: Paging) -> RepoResult<Vec<Tag>> {
        let sql = format!(
            "SELECT tag.id AS id, tag.name AS name
             FROM tag
             WHERE {}
             ORDER BY tag.name ASC, tag.id ASC
             LIMIT :limit OFFSET :offset;",
            contains_predicate("tag.name")
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(named_params! {
            ":search": escape_like(search),
            ":limit": paging.limit(),
            ":offset": paging.offset(),
        })?;

        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(parse_tag_row(row)?);
        }
        Ok(tags)
    }

    fn create(&self, name: &str) -> RepoResult<Tag> {
        let name = normalize_tag_name(name)?;
        let raw = self.conn.query_row(
            "INSERT INTO tag (id, name) VALUES (:id, :name) RETURNING id, name;",
            named_params! { ":id": Uuid::new_v4().to_string(), ":name": name },
            read_tag_columns,
        )?;
        build_tag(raw)
    }

    fn update(&self, id: TagId, name: &str) -> RepoResult<Tag> {
        let name = normalize_tag_name(name)?;
        let raw = self
            .conn
            .query_row(
                "UPDATE tag SET name = :name WHERE id = :id RETURNING id, name;",
                named_params! { ":id": id.to_string(), ":name": name },
                read_tag_columns,
            )
            .optional()?;

        match raw {
            Some(raw) => build_tag(raw),
            None => Err(RepoError::not_found(ENTITY, id)),
        }
    }

    fn remove(&mut self, id: TagId) -> RepoResult<TagId> {
        let id_text = id.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute("DELETE FROM post_tag WHERE tag_id = ?1;", [id_text.as_str()])?;
        let removed: Option<String> = tx
            .query_row(
                "DELETE FROM tag WHERE id = ?1 RETURNING id;",
                [id_text.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        let Some(removed) = removed else {
            return Err(RepoError::not_found(ENTITY, id));
        };
        tx.commit()?;
        parse_uuid(&removed, "tag.id")
    }
}

fn read_tag_columns(row: &Row<'_>) -> rusqlite::Result<(String, String)> {
    Ok((row.get("id")?, row.get("name")?))
}

fn build_tag((id, name): (String, String)) -> RepoResult<Tag> {
    Ok(Tag {
        id: parse_uuid(&id, "tag.id")?,
        name,
    })
}

/// Maps a `(id, name)` tag row; shared with the post repository.
pub(crate) fn parse_tag_row(row: &Row<'_>) -> RepoResult<Tag> {
    build_tag(read_tag_columns(row)?)
}
