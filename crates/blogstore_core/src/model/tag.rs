//! Tag domain model.

use super::validation::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable tag identifier, assigned by the repository on insert.
pub type TagId = Uuid;

/// Persisted tag row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

/// Reference to an existing tag from post input.
///
/// Clients send whole tag objects; only `id` is significant, `name` is
/// accepted and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TagRef {
    pub id: TagId,
}

impl From<&Tag> for TagRef {
    fn from(tag: &Tag) -> Self {
        Self { id: tag.id }
    }
}

impl From<TagId> for TagRef {
    fn from(id: TagId) -> Self {
        Self { id }
    }
}

/// Trims a tag name, rejecting blank values.
pub fn normalize_tag_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTagName);
    }
    Ok(trimmed.to_string())
}

/// Splits the `;`-separated `tags` query value into trimmed names.
///
/// Empty segments are dropped, so `""` yields no filter.
pub fn parse_tag_names(input: &str) -> Vec<String> {
    input
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses a client-supplied id.
pub fn parse_id(value: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(value.trim()).map_err(|_| ValidationError::InvalidId(value.to_string()))
}
