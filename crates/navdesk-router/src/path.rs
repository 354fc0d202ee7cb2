//! Path utilities for validation and normalization
//!
//! All functions are **pure**: given same input, always produce same output with no side effects.

use std::borrow::Cow;

/// Validates if a path is in canonical form
///
/// # Rules
///
/// - Must start with `/`
/// - Must not contain `//` or `\`
/// - Must not end with `/` (except root `/`)
/// - Must not be empty
///
/// # Examples
///
/// ```
/// use navdesk_router::path::is_valid_path;
///
/// assert!(is_valid_path("/"));
/// assert!(is_valid_path("/news"));
///
/// assert!(!is_valid_path(""));
/// assert!(!is_valid_path("news"));
/// assert!(!is_valid_path("/news/"));
/// assert!(!is_valid_path("/news//today"));
/// ```
pub fn is_valid_path(path: &str) -> bool {
    if path.is_empty() || !path.starts_with('/') {
        return false;
    }

    if path.contains("//") || path.contains('\\') {
        return false;
    }

    path == "/" || !path.ends_with('/')
}

/// Normalize a path to canonical form
///
/// Returns `Cow::Borrowed` when input is already valid (zero allocations).
///
/// - Trailing slashes: `/path/` → `/path`
/// - Double slashes: `/path//to` → `/path/to`
/// - Backslashes: `\path\to` → `/path/to`
///
/// # Examples
///
/// ```
/// use navdesk_router::path::normalize_path;
/// use std::borrow::Cow;
///
/// assert!(matches!(normalize_path("/trading"), Cow::Borrowed("/trading")));
/// assert_eq!(normalize_path("/trading/"), "/trading");
/// assert_eq!(normalize_path("\\analysis\\daily"), "/analysis/daily");
/// assert_eq!(normalize_path(""), "/");
/// ```
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if is_valid_path(path) {
        return Cow::Borrowed(path);
    }

    let normalized = path
        .replace('\\', "/")
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    if normalized.is_empty() {
        Cow::Borrowed("/")
    } else {
        Cow::Owned(format!("/{}", normalized))
    }
}

/// Iterates over the non-empty segments of a path
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// A location split into its routable path and its trailing parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location<'a> {
    /// Path component, not yet normalized
    pub path: &'a str,
    /// Query string without the leading `?`
    pub query: Option<&'a str>,
    /// Fragment without the leading `#`
    pub fragment: Option<&'a str>,
}

/// Splits `"/news?symbol=AAPL#top"` into path, query and fragment
///
/// # Examples
///
/// ```
/// use navdesk_router::path::split_location;
///
/// let loc = split_location("/news?symbol=AAPL#top");
/// assert_eq!(loc.path, "/news");
/// assert_eq!(loc.query, Some("symbol=AAPL"));
/// assert_eq!(loc.fragment, Some("top"));
/// ```
pub fn split_location(location: &str) -> Location<'_> {
    let (rest, fragment) = match location.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (location, None),
    };

    let (path, query) = match rest.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (rest, None),
    };

    Location {
        path,
        query: query.filter(|q| !q.is_empty()),
        fragment: fragment.filter(|f| !f.is_empty()),
    }
}

/// Strips a base path prefix from a normalized path
///
/// Only strips on a segment boundary, so base `/app` never strips `/apple`.
/// Returns `None` when the path lives outside the base.
pub fn strip_base<'a>(path: &'a str, base: &str) -> Option<&'a str> {
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        return Some(path);
    }

    match path.strip_prefix(base) {
        Some("") => Some("/"),
        Some(rest) if rest.starts_with('/') => Some(rest),
        _ => None,
    }
}

/// Prefixes a normalized path with a base path
pub fn join_base(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    match (base.is_empty(), path) {
        (true, _) => path.to_string(),
        (false, "/") => base.to_string(),
        (false, _) => format!("{}{}", base, path),
    }
}
