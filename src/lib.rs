//! Cidnav: File Manager Core for Content-Addressed Storage
//!
//! Browses and edits an immutable, content-addressed directory tree through a
//! storage client. Every mutation produces a new root CID, so the folder tree,
//! the table and the URL are re-resolved after each commit.

pub mod config;
pub mod drop;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod path;
pub mod resolve;
pub mod session;
pub mod store;
pub mod table;
pub mod tooling;
pub mod tree;
pub mod types;
pub mod upload;

pub use error::{ApiError, StorageError};
pub use session::{StorageHooks, StorageSession};
pub use store::{FileNode, MemoryStorage, StorageClient};
pub use types::{Cid, CidInfo, NodeKind, UploadFile};
