//! Title-to-slug derivation.
//!
//! Slugs are lowercase ASCII alphanumeric runs joined by single hyphens.
//! Titles are transliterated to ASCII first (`Привет` reads as `Privet`);
//! whatever is still outside `[a-z0-9]` acts as a separator.

use super::validation::ValidationError;
use deunicode::deunicode;
use once_cell::sync::Lazy;
use regex::Regex;

static SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug separator regex"));

/// Derives the URL-safe slug for `title`. May return an empty string.
pub fn slugify(title: &str) -> String {
    let lowered = deunicode(title).to_ascii_lowercase();
    SEPARATOR_RE
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Derives the slug for a post title.
///
/// Blank titles are `EmptyTitle`; titles made only of symbols with no
/// alphanumeric transliteration are `UnsluggableTitle`.
pub fn derive_slug(title: &str) -> Result<String, ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    let slug = slugify(title);
    if slug.is_empty() {
        return Err(ValidationError::UnsluggableTitle(title.to_string()));
    }
    Ok(slug)
}
