//! Tree reconciliation
//!
//! Keeps the path index in step with directory listings fetched from the
//! storage client. Every mutation changes the root CID and every ancestor CID,
//! so callers rebuild from a fresh listing after a mutation and merge child
//! listings as folders are opened.

use super::index::{TreeIndex, Upsert};
use super::node::NodeHandle;
use crate::path;
use crate::store::{FileNode, StorageClient};
use crate::types::{CidInfo, NodeKind};
use futures::future::join_all;
use tracing::{debug, warn};

/// Assign child paths and resolve the kind of untyped children
///
/// Untyped children cost one probe each; a probe that fails leaves the child
/// typed as a file and never aborts the pass.
pub async fn construct_links(
    client: &dyn StorageClient,
    parent_path: &str,
    links: Vec<CidInfo>,
) -> Vec<CidInfo> {
    join_all(links.into_iter().map(|mut link| async move {
        link.path = path::join(parent_path, &link.name);
        if link.kind.is_none() {
            link.kind = Some(probe_kind(client, &link.path).await);
        }
        link
    }))
    .await
}

async fn probe_kind(client: &dyn StorageClient, link_path: &str) -> NodeKind {
    let probed = match client.get_file_node(link_path).await {
        Ok(node) => client.is_folder(&node).await,
        Err(e) => Err(e),
    };
    match probed {
        Ok(true) => NodeKind::Dir,
        Ok(false) => NodeKind::File,
        Err(e) => {
            warn!(path = %link_path, error = %e, "Kind probe failed, treating as file");
            NodeKind::File
        }
    }
}

/// Listing of `node` with children resolved, addressed at `logical_path`
///
/// `fallback_name` names nodes whose listing carries no name (roots).
pub async fn fetch_dir(
    client: &dyn StorageClient,
    node: FileNode,
    logical_path: &str,
    fallback_name: &str,
) -> CidInfo {
    let mut info = node.cid_info;
    let links = std::mem::take(&mut info.links);
    info.links = construct_links(client, logical_path, links).await;
    if info.name.is_empty() {
        info.name = if fallback_name.is_empty() {
            node.name
        } else {
            fallback_name.to_string()
        };
    }
    info.path = logical_path.to_string();
    info
}

/// Tree index plus the rules that decide expansion and selection
#[derive(Debug, Default)]
pub struct TreeReconciler {
    index: TreeIndex,
    show_files: bool,
}

impl TreeReconciler {
    pub fn new(show_files: bool) -> Self {
        Self {
            index: TreeIndex::new(),
            show_files,
        }
    }

    pub fn index(&self) -> &TreeIndex {
        &self.index
    }

    pub fn show_files(&self) -> bool {
        self.show_files
    }

    /// Rebuild the index from scratch for `nodes` (root first)
    pub fn rebuild(&mut self, nodes: &[CidInfo], display_path: Option<&str>) {
        self.index.clear();
        self.merge(nodes, display_path);
        debug!(nodes = self.index.len(), "Rebuilt tree index");
    }

    /// Merge nodes into the index
    ///
    /// New folders expand when they are the displayed path, lie on the way to
    /// it, or are the root; existing nodes only get their CID refreshed.
    pub fn merge(&mut self, nodes: &[CidInfo], display_path: Option<&str>) {
        for info in nodes {
            match self.index.upsert(info, self.show_files) {
                Upsert::Inserted(handle) => self.apply_display_state(handle, display_path),
                Upsert::Updated(handle) => {
                    if info.root {
                        self.index.node_mut(handle).expanded = true;
                    }
                }
                Upsert::Skipped => {}
            }
        }
    }

    fn apply_display_state(&mut self, handle: NodeHandle, display_path: Option<&str>) {
        let node = self.index.node(handle);
        let is_active = match display_path.filter(|p| !p.is_empty()) {
            Some(display) => node.path == display,
            None => node.root,
        };
        let on_display_path = display_path
            .map(|display| display.starts_with(&format!("{}/", node.path)))
            .unwrap_or(false);
        let expand = node.is_dir() && (is_active || on_display_path || node.root);
        let select = display_path.is_some_and(|display| node.path == display);

        if expand {
            self.index.node_mut(handle).expanded = true;
        }
        if select {
            self.index.set_active(handle);
        }
    }

    /// Merge an opened folder's children and select it
    ///
    /// `toggle` flips the folder's expansion, otherwise it is forced open.
    /// Returns `None` when the folder is not indexed.
    pub fn update_content(&mut self, dir: &CidInfo, toggle: bool) -> Option<NodeHandle> {
        let handle = self.index.get(&dir.path)?;
        self.index.set_active(handle);
        self.merge(&dir.links, None);
        let node = self.index.node_mut(handle);
        node.expanded = if toggle { !node.expanded } else { true };
        Some(handle)
    }
}
