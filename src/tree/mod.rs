//! Folder tree: CID hashing, the path-keyed index, and reconciliation

pub mod hasher;
pub mod index;
pub mod node;
pub mod reconcile;

pub use index::{TreeIndex, Upsert};
pub use node::{NodeHandle, TreeNode};
pub use reconcile::{construct_links, fetch_dir, TreeReconciler};
