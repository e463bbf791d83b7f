//! Storage client capability
//!
//! The file manager never computes CIDs or moves bytes itself; it drives a
//! storage client through this trait. Mutations are staged by the client and
//! become a new content-addressed snapshot only on `apply_updates`, which
//! returns the new root CID.

pub mod memory;

pub use memory::MemoryStorage;

use crate::error::StorageError;
use crate::path;
use crate::types::{Cid, CidInfo, NodeKind, UploadFile};
use async_trait::async_trait;

/// Handle to a node of the client's working tree
#[derive(Debug, Clone, PartialEq)]
pub struct FileNode {
    pub cid: Cid,
    pub name: String,
    /// Logical path from the client root (`""` for the root itself)
    pub path: String,
    pub kind: NodeKind,
    /// Listing of the node; `links` is only populated for directories
    pub cid_info: CidInfo,
}

impl FileNode {
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    pub fn parent_path(&self) -> &str {
        path::split_parent(&self.path).0
    }
}

/// Storage client interface
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Root of the working tree
    async fn get_root_node(&self) -> Result<FileNode, StorageError>;

    /// Node at a logical path
    async fn get_file_node(&self, path: &str) -> Result<FileNode, StorageError>;

    /// Switch the working tree to a previously committed snapshot
    async fn set_root_cid(&self, cid: &str) -> Result<FileNode, StorageError>;

    /// Existence probe for a direct child of `parent`
    async fn find_item(&self, parent: &FileNode, name: &str)
        -> Result<Option<FileNode>, StorageError>;

    async fn is_folder(&self, node: &FileNode) -> Result<bool, StorageError>;

    /// Stage a file; missing parent folders are created
    async fn add_file(&self, path: &str, file: &UploadFile) -> Result<FileNode, StorageError>;

    /// Stage a text file (editor save)
    async fn add_file_content(&self, path: &str, content: &str)
        -> Result<FileNode, StorageError>;

    async fn add_folder(&self, parent: &FileNode, name: &str) -> Result<FileNode, StorageError>;

    async fn update_folder_name(
        &self,
        node: &FileNode,
        name: &str,
    ) -> Result<FileNode, StorageError>;

    async fn delete(&self, node: &FileNode) -> Result<(), StorageError>;

    /// Commit staged mutations as one snapshot and return its root CID
    async fn apply_updates(&self) -> Result<Cid, StorageError>;

    /// Drop staged mutations
    async fn reset(&self) -> Result<(), StorageError>;

    /// Precompute the CID a raw file would get
    fn hash_file(&self, data: &[u8]) -> Cid;
}
