//! Shared utility functions

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer};
use validator::ValidationError;

use crate::error::ApiError;

/// Maximum slug length.
pub const MAX_SLUG_LENGTH: usize = 200;

/// Generate URL-friendly slug from a title.
///
/// # Examples
///
/// ```
/// use palace_server::util::slugify;
///
/// assert_eq!(slugify("New Yam Festival 2026"), "new-yam-festival-2026");
/// ```
#[must_use]
pub fn slugify(title: &str) -> String {
    let slug = title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.len() <= MAX_SLUG_LENGTH {
        slug
    } else {
        slug.chars()
            .take(MAX_SLUG_LENGTH)
            .collect::<String>()
            .trim_end_matches('-')
            .to_string()
    }
}

/// Use the given slug when non-blank, otherwise derive one from `title`.
///
/// Fails when neither yields a URL-safe character.
pub fn slug_or_title(slug: Option<&str>, title: &str) -> Result<String, ApiError> {
    let slug = match slug.map(str::trim) {
        Some(s) if !s.is_empty() => slugify(s),
        _ => slugify(title),
    };
    if slug.is_empty() {
        return Err(ApiError::InvalidInput(
            "A slug needs at least one letter or digit".to_string(),
        ));
    }
    Ok(slug)
}

/// Truncate `text` to `max_chars` characters, appending `...` when cut.
#[must_use]
pub fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max_chars).collect();
        cut.push_str("...");
        cut
    }
}

/// Badge colours: a theme name (`primary`, `warning`) or `#RRGGBB`.
pub static BADGE_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-z][a-z-]{0,19}|#[0-9A-Fa-f]{6})$").expect("badge colour pattern")
});

/// Reject text that is empty once surrounding whitespace is removed.
///
/// Pairs with `length(min = 1)` on fields that are stored trimmed.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank").with_message("This field cannot be blank".into()))
    } else {
        Ok(())
    }
}

/// Serde default for flags that start switched on.
#[must_use]
pub const fn default_true() -> bool {
    true
}

/// Custom deserializer for `Option<Option<T>>` that distinguishes three JSON states:
/// - field absent → `None`
/// - field present with `null` → `Some(None)`
/// - field present with value → `Some(Some(value))`
#[allow(clippy::option_option)]
pub fn deserialize_double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
