//! Path-keyed tree index
//!
//! Maps logical paths to tree nodes. For a fixed root the mapping
//! `path → cid` is a function: an upsert for an existing path rewrites the
//! CID in place and keeps the node (and its expansion/selection state).

use super::node::{NodeHandle, TreeNode};
use crate::path;
use crate::types::{CidInfo, NodeKind};
use std::collections::HashMap;

/// Result of an upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted(NodeHandle),
    Updated(NodeHandle),
    /// Files are only indexed when the tree shows them
    Skipped,
}

#[derive(Debug, Default)]
pub struct TreeIndex {
    nodes: Vec<TreeNode>,
    by_path: HashMap<String, NodeHandle>,
    active: Option<NodeHandle>,
}

impl TreeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.by_path.clear();
        self.active = None;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<NodeHandle> {
        self.by_path.get(path).copied()
    }

    pub fn node(&self, handle: NodeHandle) -> &TreeNode {
        &self.nodes[handle.0]
    }

    pub(crate) fn node_mut(&mut self, handle: NodeHandle) -> &mut TreeNode {
        &mut self.nodes[handle.0]
    }

    pub fn lookup(&self, path: &str) -> Option<&TreeNode> {
        self.get(path).map(|h| self.node(h))
    }

    /// Nodes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (NodeHandle, &TreeNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeHandle(i), n))
    }

    /// Nodes without an indexed parent
    pub fn roots(&self) -> impl Iterator<Item = (NodeHandle, &TreeNode)> {
        self.iter().filter(|(_, n)| n.parent.is_none())
    }

    pub fn children(&self, handle: NodeHandle) -> impl Iterator<Item = &TreeNode> {
        self.node(handle).children.iter().map(|h| self.node(*h))
    }

    pub fn active(&self) -> Option<NodeHandle> {
        self.active
    }

    pub fn set_active(&mut self, handle: NodeHandle) {
        if let Some(prev) = self.active.replace(handle) {
            self.nodes[prev.0].active = false;
        }
        self.nodes[handle.0].active = true;
    }

    /// Insert a node for `info`, or refresh the CID of the node already at its path
    pub fn upsert(&mut self, info: &CidInfo, show_files: bool) -> Upsert {
        if let Some(handle) = self.get(&info.path) {
            let node = &mut self.nodes[handle.0];
            if node.cid != info.cid {
                node.cid = info.cid.clone();
                node.size = info.size;
            }
            return Upsert::Updated(handle);
        }

        let kind = info.kind.unwrap_or(NodeKind::File);
        if kind == NodeKind::File && !show_files {
            return Upsert::Skipped;
        }

        let parent = if info.root {
            None
        } else {
            self.get(path::split_parent(&info.path).0)
        };
        let handle = NodeHandle(self.nodes.len());
        self.nodes.push(TreeNode {
            cid: info.cid.clone(),
            name: info.name.clone(),
            path: info.path.clone(),
            kind,
            size: info.size,
            parent,
            children: Vec::new(),
            expanded: false,
            active: false,
            root: info.root,
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(handle);
        }
        self.by_path.insert(info.path.clone(), handle);
        Upsert::Inserted(handle)
    }
}
