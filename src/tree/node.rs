//! Tree index node types

use crate::types::{Cid, NodeKind};

/// Stable handle to a node of a `TreeIndex`
///
/// Handles stay valid until the index is cleared; reconciling refreshed data
/// updates the node behind a handle instead of replacing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(pub(crate) usize);

/// One folder (or file, when files are shown) of the rendered tree
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub cid: Cid,
    pub name: String,
    pub path: String,
    pub kind: NodeKind,
    pub size: u64,
    pub parent: Option<NodeHandle>,
    pub children: Vec<NodeHandle>,
    pub expanded: bool,
    pub active: bool,
    /// Top of the browsed hierarchy
    pub root: bool,
}

impl TreeNode {
    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Dir
    }
}
