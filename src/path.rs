//! Logical path helpers
//!
//! Logical paths are `/`-delimited and rooted at the browsed root: the root
//! itself is `""`, a child is `/name`.

/// Non-empty segments of a logical path
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Canonical form: `""` for the root, `/a/b` otherwise
pub fn normalize(path: &str) -> String {
    segments(path).fold(String::new(), |mut acc, segment| {
        acc.push('/');
        acc.push_str(segment);
        acc
    })
}

pub fn join(parent: &str, name: &str) -> String {
    format!("{}/{}", parent.trim_end_matches('/'), name)
}

/// Split a path into its parent path and last segment
///
/// `"/a/b.txt"` → `("/a", "b.txt")`, `"b.txt"` → `("", "b.txt")`.
pub fn split_parent(path: &str) -> (&str, &str) {
    match path.rsplit_once('/') {
        Some((parent, name)) => (parent, name),
        None => ("", path),
    }
}

/// Whether `path` is `ancestor` or lies below it
pub fn is_within(path: &str, ancestor: &str) -> bool {
    path == ancestor || path.starts_with(&format!("{}/", ancestor))
}
