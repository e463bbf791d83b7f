//! URL fragment ⇄ (root CID, logical path)
//!
//! The browsed location lives in the URL fragment as
//! `<base><root cid><logical path>`, e.g. `#/bafy.../docs/readme.md`.

use super::ASSETS_PATH;
use parking_lot::Mutex;
use serde::Serialize;

/// Offset used when no base URL applies (`#/`)
const DEFAULT_PREFIX: &str = "#/";

/// Root CID and logical path parsed from a location
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlPath {
    pub cid: String,
    pub path: String,
}

/// Parse a location into `(cid, path)`
///
/// The fragment is everything from the first `#` (the whole input when there
/// is none). When the fragment starts with `base_url` the base is stripped,
/// with or without its trailing slash; otherwise the fixed `#/` offset applies.
pub fn extract_url_path(location: &str, base_url: Option<&str>) -> UrlPath {
    let fragment = match location.find('#') {
        Some(idx) => &location[idx..],
        None => location,
    };
    let rest = match base_url.filter(|b| !b.is_empty() && fragment.starts_with(b)) {
        Some(base) => {
            let offset = if base.ends_with('/') {
                base.len()
            } else {
                base.len() + 1
            };
            fragment.get(offset..).unwrap_or("")
        }
        None => fragment.get(DEFAULT_PREFIX.len()..).unwrap_or(""),
    };
    let mut parts = rest.split('/');
    let cid = parts.next().unwrap_or("").to_string();
    let paths: Vec<&str> = parts.collect();
    let path = if paths.is_empty() {
        String::new()
    } else {
        format!("/{}", paths.join("/"))
    };
    UrlPath { cid, path }
}

/// Build the location written to history for `root_cid` and `path`
///
/// Paths below the asset folder are written relative to it.
pub fn format_url_path(base_url: Option<&str>, root_cid: Option<&str>, path: Option<&str>) -> String {
    let mut url = match base_url.filter(|b| !b.is_empty()) {
        Some(base) if base.ends_with('/') => base.to_string(),
        Some(base) => format!("{}/", base),
        None => DEFAULT_PREFIX.to_string(),
    };
    if let Some(cid) = root_cid {
        url.push_str(cid);
    }
    if let Some(path) = path.filter(|p| !p.is_empty()) {
        url.push_str(path.strip_prefix(ASSETS_PATH).unwrap_or(path));
    }
    url
}

/// Browser history as seen by the file manager
pub trait NavigationHistory: Send + Sync {
    /// Current location (at least its fragment)
    fn location(&self) -> String;

    /// Replace the current entry without navigating
    fn replace_state(&self, url: &str);
}

/// History kept in memory; used by the CLI and tests
#[derive(Debug, Default)]
pub struct MemoryHistory {
    entries: Mutex<Vec<String>>,
}

impl MemoryHistory {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            entries: Mutex::new(vec![location.into()]),
        }
    }

    /// Every location written so far, oldest first
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }
}

impl NavigationHistory for MemoryHistory {
    fn location(&self) -> String {
        self.entries.lock().last().cloned().unwrap_or_default()
    }

    fn replace_state(&self, url: &str) {
        self.entries.lock().push(url.to_string());
    }
}
