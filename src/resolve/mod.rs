//! Path/CID resolution
//!
//! Collision-free naming against the remote tree, and the mapping between
//! browser locations and `(root cid, logical path)`.

pub mod naming;
pub mod url;

pub use naming::{
    next_file_name, next_folder_name, resolve_unique_name, resolve_upload_path, NameKind,
};
pub use url::{extract_url_path, format_url_path, MemoryHistory, NavigationHistory, UrlPath};

/// Folder that, when present at the root, is browsed instead of the root
pub const ASSETS_FOLDER: &str = "_assets";

/// Logical path of the asset folder
pub const ASSETS_PATH: &str = "/_assets";
