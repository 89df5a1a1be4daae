//! Identifier and file-name derivation.

/// Stem used when a name sanitizes to nothing.
const FALLBACK_STEM: &str = "venue";

/// Keep alphanumerics, space, hyphen and underscore; trim the result.
///
/// Distinct names can sanitize to the same stem (`"Grand Hall!"` and
/// `"Grand Hall?"`). Collisions are not resolved: the later write wins.
pub fn sanitize_file_stem(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let trimmed = kept.trim();
    if trimmed.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        trimmed.to_string()
    }
}

/// File name of the drafted email for a venue.
pub fn email_file_name(venue_name: &str) -> String {
    format!("{}_email.txt", sanitize_file_stem(venue_name))
}

/// Lowercase identifier derived from a display name: runs of
/// non-alphanumerics become a single `_`.
pub fn venue_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.trim().chars() {
        if c.is_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_sep = true;
        }
    }
    if slug.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        slug
    }
}
