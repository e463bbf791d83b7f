//! Core types shared by the storage client, the upload queue and the tree index.

use serde::{Deserialize, Serialize};

/// Cid: content identifier of a file or directory snapshot
pub type Cid = String;

/// Node kind as reported by a directory listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Dir,
    File,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Dir => "dir",
            NodeKind::File => "file",
        }
    }
}

/// Descriptor of a resolved node and, for directories, its direct children.
///
/// Listings returned by a storage client may leave `kind` unset for children;
/// those are probed by the tree reconciler before they are indexed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CidInfo {
    pub cid: Cid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<NodeKind>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<CidInfo>,
    #[serde(default)]
    pub path: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub root: bool,
}

impl CidInfo {
    pub fn is_dir(&self) -> bool {
        self.kind == Some(NodeKind::Dir)
    }

    pub fn is_file(&self) -> bool {
        self.kind == Some(NodeKind::File)
    }

    /// Copy of this descriptor without its children
    pub fn without_links(&self) -> CidInfo {
        CidInfo {
            links: Vec::new(),
            ..self.clone()
        }
    }
}

/// A file queued for upload: its bytes plus the logical path it came from.
///
/// `path` always starts with `/`; for a file dropped from inside a directory it
/// carries the directory prefix (`/photos/a.png`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub path: String,
    pub data: Vec<u8>,
    /// Precomputed content identifier, when the source already hashed it
    pub cid: Option<Cid>,
}

impl UploadFile {
    pub fn new(path: impl Into<String>, data: Vec<u8>) -> Self {
        let raw: String = path.into();
        let path = if raw.starts_with('/') {
            raw
        } else {
            format!("/{}", raw)
        };
        let name = path.rsplit('/').next().unwrap_or_default().to_string();
        Self {
            name,
            path,
            data,
            cid: None,
        }
    }

    pub fn with_cid(mut self, cid: Cid) -> Self {
        self.cid = Some(cid);
        self
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}
