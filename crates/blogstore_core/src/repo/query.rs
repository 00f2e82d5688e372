//! Dynamic SQL assembly for post search, tag filtering and pagination.
//!
//! # Responsibility
//! - Build statement text plus named bound parameters for post count/list.
//! - Share the substring-search helpers with the tag repository.
//!
//! # Invariants
//! - Every client value is bound; only the tag placeholder list is generated.
//! - Each requested tag gets its own placeholder `:tag_{i}`.
//! - With tags, a post matches only when it carries every requested tag
//!   (`HAVING COUNT(DISTINCT tag.name) >= :tag_count`).
//! - Count statements never carry `LIMIT`/`OFFSET`.

use crate::db::CASEFOLD_FN;
use crate::model::paging::Paging;
use crate::model::tag::parse_tag_names;
use crate::model::validation::ValidationError;
use rusqlite::types::{ToSql, Value};
use std::collections::BTreeSet;

const LIKE_ESCAPE: char = '\\';
const TAG_PARAM_PREFIX: &str = ":tag_";

/// Summary columns of `post`, aliased to their bare names.
pub(crate) const POST_SUMMARY_COLUMNS: &str = "post.id AS id, post.title AS title, \
     post.slug AS slug, post.created_at AS created_at, post.updated_at AS updated_at, \
     post.is_draft AS is_draft";
pub(crate) const POST_CONTENT_COLUMN: &str = "post.content AS content";

/// Search and tag filter shared by post count and list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    /// Case-insensitive title substring; empty matches all.
    pub search: String,
    /// Tag names a post must all carry; empty disables the join.
    pub tags: Vec<String>,
}

impl PostFilter {
    pub fn new(search: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            search: search.into(),
            tags,
        }
    }
}

/// Post list request: filter plus normalized page window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostListQuery {
    pub filter: PostFilter,
    pub paging: Paging,
}

impl PostListQuery {
    /// Builds a list request from raw query-string values
    /// (`tags` is `;`-separated).
    pub fn parse(
        search: &str,
        tags: &str,
        limit: &str,
        page: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            filter: PostFilter::new(search, parse_tag_names(tags)),
            paging: Paging::parse(limit, page)?,
        })
    }
}

/// Column set returned by a post list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    Summary,
    WithContent,
}

/// Statement text with its named parameters, in binding order.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<(String, Value)>,
}

impl BuiltQuery {
    /// Borrowed `(name, value)` pairs accepted by `Statement::query`.
    pub fn named_params(&self) -> Vec<(&str, &dyn ToSql)> {
        self.params
            .iter()
            .map(|(name, value)| (name.as_str(), value as &dyn ToSql))
            .collect()
    }

    fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.params.push((name.into(), value));
    }
}

/// Assembles post statements for one [`PostFilter`].
#[derive(Debug, Clone)]
pub struct PostQueryBuilder<'a> {
    search: String,
    tags: BTreeSet<&'a str>,
}

impl<'a> PostQueryBuilder<'a> {
    /// Escapes the search text and trims/deduplicates tag names.
    pub fn new(filter: &'a PostFilter) -> Self {
        let tags = filter
            .tags
            .iter()
            .map(|tag| tag.trim())
            .filter(|tag| !tag.is_empty())
            .collect();
        Self {
            search: escape_like(&filter.search),
            tags,
        }
    }

    /// `SELECT COUNT(...)` over the filtered posts.
    pub fn count(&self) -> BuiltQuery {
        let mut query = BuiltQuery {
            sql: String::new(),
            params: Vec::new(),
        };
        if self.tags.is_empty() {
            query.sql.push_str("SELECT COUNT(post.id)");
            self.push_filter(&mut query);
        } else {
            query.sql.push_str("SELECT COUNT(*) FROM (SELECT post.id");
            self.push_filter(&mut query);
            query.sql.push(')');
        }
        query.sql.push(';');
        query
    }

    /// Paginated post rows in the requested projection.
    pub fn select(&self, projection: Projection, paging: Paging) -> BuiltQuery {
        let mut query = BuiltQuery {
            sql: format!("SELECT {POST_SUMMARY_COLUMNS}"),
            params: Vec::new(),
        };
        if projection == Projection::WithContent {
            query.sql.push_str(", ");
            query.sql.push_str(POST_CONTENT_COLUMN);
        }
        self.push_filter(&mut query);

        query
            .sql
            .push_str(" ORDER BY post.created_at DESC, post.id ASC LIMIT :limit OFFSET :offset;");
        query.bind(":limit", Value::Integer(paging.limit()));
        query.bind(":offset", Value::Integer(paging.offset()));
        query
    }

    fn push_filter(&self, query: &mut BuiltQuery) {
        query.sql.push_str(" FROM post");
        if !self.tags.is_empty() {
            query.sql.push_str(
                " INNER JOIN post_tag ON post_tag.post_id = post.id \
                 INNER JOIN tag ON tag.id = post_tag.tag_id",
            );
        }

        query.sql.push_str(" WHERE ");
        query.sql.push_str(&contains_predicate("post.title"));
        query.bind(":search", Value::Text(self.search.clone()));

        if self.tags.is_empty() {
            return;
        }

        let placeholders = tag_placeholders(self.tags.len());
        query.sql.push_str(" AND tag.name IN (");
        query.sql.push_str(&placeholders.join(", "));
        query.sql.push(')');
        for (name, tag) in placeholders.into_iter().zip(&self.tags) {
            query.bind(name, Value::Text((*tag).to_string()));
        }

        query
            .sql
            .push_str(" GROUP BY post.id HAVING COUNT(DISTINCT tag.name) >= :tag_count");
        let required = i64::try_from(self.tags.len()).unwrap_or(i64::MAX);
        query.bind(":tag_count", Value::Integer(required));
    }
}

/// `casefold(<column>) LIKE '%' || casefold(:search) || '%'` with backslash
/// escaping. Both sides are lowercased so non-ASCII letters match any case.
pub fn contains_predicate(column: &str) -> String {
    format!(
        "{CASEFOLD_FN}({column}) LIKE '%' || {CASEFOLD_FN}(:search) || '%' ESCAPE '{LIKE_ESCAPE}'"
    )
}

/// Escapes LIKE wildcards so `search` matches literally.
pub fn escape_like(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len());
    for ch in search.chars() {
        if matches!(ch, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(ch);
    }
    escaped
}

/// One unique named placeholder per requested tag.
pub fn tag_placeholders(count: usize) -> Vec<String> {
    (0..count)
        .map(|index| format!("{TAG_PARAM_PREFIX}{index}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{
        contains_predicate, escape_like, tag_placeholders, PostFilter, PostListQuery,
        PostQueryBuilder, Projection,
    };
    use crate::model::paging::Paging;
    use rusqlite::types::Value;

    fn param_names(params: &[(String, Value)]) -> Vec<&str> {
        params.iter().map(|(name, _)| name.as_str()).collect()
    }

    #[test]
    fn escape_like_protects_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn contains_predicate_folds_both_sides() {
        assert_eq!(
            contains_predicate("tag.name"),
            "casefold(tag.name) LIKE '%' || casefold(:search) || '%' ESCAPE '\\'"
        );
    }

    #[test]
    fn placeholders_are_unique_and_sized_to_tag_count() {
        assert_eq!(tag_placeholders(3), vec![":tag_0", ":tag_1", ":tag_2"]);
        assert!(tag_placeholders(0).is_empty());
    }

    #[test]
    fn untagged_select_has_no_join_and_binds_paging() {
        let filter = PostFilter::new("rust", Vec::new());
        let query = PostQueryBuilder::new(&filter).select(Projection::Summary, Paging::new(20, 3));

        assert!(!query.sql.contains("JOIN"));
        assert!(!query.sql.contains("GROUP BY"));
        assert!(!query.sql.contains("post.content"));
        assert_eq!(param_names(&query.params), vec![":search", ":limit", ":offset"]);
        assert_eq!(query.params[1].1, Value::Integer(20));
        assert_eq!(query.params[2].1, Value::Integer(40));
    }

    #[test]
    fn tagged_select_requires_every_distinct_tag() {
        let filter = PostFilter::new(
            "",
            vec!["web".to_string(), " rust ".to_string(), "web".to_string(), " ".to_string()],
        );
        let query =
            PostQueryBuilder::new(&filter).select(Projection::WithContent, Paging::default());

        assert!(query.sql.contains("INNER JOIN post_tag"));
        assert!(query.sql.contains("tag.name IN (:tag_0, :tag_1)"));
        assert!(query.sql.contains("HAVING COUNT(DISTINCT tag.name) >= :tag_count"));
        assert!(query.sql.contains("post.content"));
        assert_eq!(
            param_names(&query.params),
            vec![":search", ":tag_0", ":tag_1", ":tag_count", ":limit", ":offset"]
        );
        assert_eq!(query.params[1].1, Value::Text("rust".to_string()));
        assert_eq!(query.params[2].1, Value::Text("web".to_string()));
        assert_eq!(query.params[3].1, Value::Integer(2));
    }

    #[test]
    fn count_ignores_paging_and_wraps_grouped_filter() {
        let plain = PostQueryBuilder::new(&PostFilter::default()).count();
        assert!(plain.sql.starts_with("SELECT COUNT(post.id) FROM post WHERE"));
        assert!(!plain.sql.contains("LIMIT"));
        assert_eq!(param_names(&plain.params), vec![":search"]);

        let filter = PostFilter::new("x", vec!["a".to_string()]);
        let tagged = PostQueryBuilder::new(&filter).count();
        assert!(tagged.sql.starts_with("SELECT COUNT(*) FROM (SELECT post.id FROM post"));
        assert!(tagged.sql.ends_with(");"));
        assert!(!tagged.sql.contains("LIMIT"));
        assert_eq!(param_names(&tagged.params), vec![":search", ":tag_0", ":tag_count"]);
    }

    #[test]
    fn list_query_parses_raw_query_string_values() {
        let query = PostListQuery::parse("hello", "rust; web;", "5", "0").unwrap();
        assert_eq!(query.filter.tags, vec!["rust".to_string(), "web".to_string()]);
        assert_eq!(query.paging.limit(), 10);
        assert_eq!(query.paging.offset(), 0);

        assert!(PostListQuery::parse("", "", "abc", "1").is_err());
    }

    #[test]
    fn search_text_is_bound_not_inlined() {
        let filter = PostFilter::new("'; DROP TABLE post; --", vec!["x' OR 1=1".to_string()]);
        let query = PostQueryBuilder::new(&filter).select(Projection::Summary, Paging::default());
        assert!(!query.sql.contains("DROP TABLE"));
        assert!(!query.sql.contains("OR 1=1"));
    }
}
