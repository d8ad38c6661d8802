//! URL slugs derived from display names.
//!
//! A slug is non-empty and made of lowercase ASCII letters and digits joined
//! by single hyphens.

/// Return `true` when `value` is a valid slug.
pub(crate) fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with('-')
        && !value.ends_with('-')
        && !value.contains("--")
        && value
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}

/// Derive a slug from free text. Returns `None` when nothing usable remains.
///
/// Runs of anything other than ASCII letters and digits collapse into one
/// hyphen.
pub(crate) fn slugify(value: &str) -> Option<String> {
    let mut slug = String::with_capacity(value.len());
    let mut pending_hyphen = false;
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    (!slug.is_empty()).then_some(slug)
}
