//! Pagination normalization.
//!
//! Clients send `limit` and a 1-based `page`. Out-of-range values are
//! clamped, never rejected; only text that is not an integer fails.

use super::validation::ValidationError;

pub const LIMIT_MIN: i64 = 10;
pub const LIMIT_MAX: i64 = 50;

/// Normalized page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    limit: i64,
    page: i64,
}

impl Paging {
    /// Clamps `limit` into `[LIMIT_MIN, LIMIT_MAX]` and treats `page <= 0`
    /// as the first page.
    pub fn new(limit: i64, page: i64) -> Self {
        Self {
            limit: limit.clamp(LIMIT_MIN, LIMIT_MAX),
            page: page.max(1),
        }
    }

    /// Parses raw query-string values.
    ///
    /// Surrounding whitespace is ignored; anything else that is not an
    /// integer is a `ValidationError`.
    pub fn parse(limit: &str, page: &str) -> Result<Self, ValidationError> {
        let limit = parse_int("limit", limit)?;
        let page = parse_int("page", page)?;
        Ok(Self::new(limit, page))
    }

    /// Effective row limit.
    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Effective 1-based page.
    pub fn page(&self) -> i64 {
        self.page
    }

    /// Rows skipped before this page.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for Paging {
    fn default() -> Self {
        Self::new(LIMIT_MIN, 1)
    }
}

fn parse_int(field: &'static str, value: &str) -> Result<i64, ValidationError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidPagination {
            field,
            value: value.to_string(),
        })
}
