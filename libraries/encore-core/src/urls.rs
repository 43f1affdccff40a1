//! URL normalization and equivalence
//!
//! Track URLs may be stored relative (`/audio/a.mp3`) while the platform
//! reports them absolute (`https://host/audio/a.mp3`). Equivalence is a
//! deliberately loose policy: exact match, then match after resolving
//! against the page origin, then substring containment either way.

use url::Url;

/// Resolve a possibly-relative URL against the page origin
///
/// Absolute `http(s)` URLs and anything that fails to resolve are returned
/// unchanged.
pub fn normalize_url(raw: &str, origin: Option<&Url>) -> String {
    if raw.is_empty() {
        return String::new();
    }
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return raw.to_string();
    }
    match origin.map(|base| base.join(raw)) {
        Some(Ok(resolved)) => resolved.into(),
        _ => raw.to_string(),
    }
}

/// Whether two URLs refer to the same media
///
/// Empty URLs never match anything.
pub fn urls_equivalent(a: &str, b: &str, origin: Option<&Url>) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }
    if normalize_url(a, origin) == normalize_url(b, origin) {
        return true;
    }
    a.contains(b) || b.contains(a)
}

/// Whether two URLs name the same media, without the substring fallback
///
/// Used where a false match would attach the wrong resource.
pub fn same_media(a: &str, b: &str, origin: Option<&Url>) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a == b || normalize_url(a, origin) == normalize_url(b, origin)
}
