//! In-memory content-addressed store
//!
//! Reference `StorageClient`: committed snapshots live in a block map keyed by
//! CID, mutations are staged on a working tree and hashed into new blocks on
//! `apply_updates`. Snapshots can be written to and read from JSON so the CLI
//! can keep state between invocations.

use super::{FileNode, StorageClient};
use crate::error::StorageError;
use crate::path;
use crate::tree::hasher::{compute_dir_cid, compute_file_cid};
use crate::types::{Cid, CidInfo, NodeKind, UploadFile};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum Block {
    File { size: u64 },
    Dir { links: Vec<BlockLink> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BlockLink {
    name: String,
    cid: Cid,
}

#[derive(Debug, Clone)]
enum WorkNode {
    File { cid: Cid, size: u64 },
    Dir { children: BTreeMap<String, WorkNode> },
}

impl WorkNode {
    fn empty_dir() -> Self {
        WorkNode::Dir {
            children: BTreeMap::new(),
        }
    }

    fn kind(&self) -> NodeKind {
        match self {
            WorkNode::File { .. } => NodeKind::File,
            WorkNode::Dir { .. } => NodeKind::Dir,
        }
    }

    fn cid(&self) -> Cid {
        match self {
            WorkNode::File { cid, .. } => cid.clone(),
            WorkNode::Dir { children } => {
                let cids: Vec<(&str, Cid)> = children
                    .iter()
                    .map(|(name, child)| (name.as_str(), child.cid()))
                    .collect();
                compute_dir_cid(cids.iter().map(|(name, cid)| (*name, cid.as_str())))
            }
        }
    }

    fn size(&self) -> u64 {
        match self {
            WorkNode::File { size, .. } => *size,
            WorkNode::Dir { children } => children.values().map(WorkNode::size).sum(),
        }
    }

    fn lookup(&self, logical_path: &str) -> Option<&WorkNode> {
        let mut node = self;
        for segment in path::segments(logical_path) {
            match node {
                WorkNode::Dir { children } => node = children.get(segment)?,
                WorkNode::File { .. } => return None,
            }
        }
        Some(node)
    }
}

/// Children map of the directory at `segments`, optionally creating missing folders
fn dir_mut<'a>(
    mut node: &'a mut WorkNode,
    segments: &[&str],
    create: bool,
    full_path: &str,
) -> Result<&'a mut BTreeMap<String, WorkNode>, StorageError> {
    for segment in segments {
        let children = match node {
            WorkNode::Dir { children } => children,
            WorkNode::File { .. } => return Err(StorageError::NotADirectory(full_path.to_string())),
        };
        node = if create {
            children
                .entry(segment.to_string())
                .or_insert_with(WorkNode::empty_dir)
        } else {
            children
                .get_mut(*segment)
                .ok_or_else(|| StorageError::NotFound(full_path.to_string()))?
        };
    }
    match node {
        WorkNode::Dir { children } => Ok(children),
        WorkNode::File { .. } => Err(StorageError::NotADirectory(full_path.to_string())),
    }
}

/// Hash a working tree into blocks, returning its CID
fn persist(node: &WorkNode, blocks: &mut HashMap<Cid, Block>) -> Cid {
    match node {
        WorkNode::File { cid, size } => {
            blocks
                .entry(cid.clone())
                .or_insert(Block::File { size: *size });
            cid.clone()
        }
        WorkNode::Dir { children } => {
            let links: Vec<BlockLink> = children
                .iter()
                .map(|(name, child)| BlockLink {
                    name: name.clone(),
                    cid: persist(child, blocks),
                })
                .collect();
            let cid = compute_dir_cid(links.iter().map(|l| (l.name.as_str(), l.cid.as_str())));
            blocks.entry(cid.clone()).or_insert(Block::Dir { links });
            cid
        }
    }
}

fn load(cid: &str, blocks: &HashMap<Cid, Block>) -> Result<WorkNode, StorageError> {
    match blocks.get(cid) {
        Some(Block::File { size }) => Ok(WorkNode::File {
            cid: cid.to_string(),
            size: *size,
        }),
        Some(Block::Dir { links }) => {
            let mut children = BTreeMap::new();
            for link in links {
                children.insert(link.name.clone(), load(&link.cid, blocks)?);
            }
            Ok(WorkNode::Dir { children })
        }
        None => Err(StorageError::UnknownCid(cid.to_string())),
    }
}

struct State {
    working: WorkNode,
    committed_root: Cid,
    blocks: HashMap<Cid, Block>,
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    root: Cid,
    blocks: BTreeMap<Cid, Block>,
}

/// In-memory storage client
pub struct MemoryStorage {
    state: RwLock<State>,
    typed_links: bool,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    /// Create a store holding a single empty root directory
    pub fn new() -> Self {
        let working = WorkNode::empty_dir();
        let mut blocks = HashMap::new();
        let committed_root = persist(&working, &mut blocks);
        Self {
            state: RwLock::new(State {
                working,
                committed_root,
                blocks,
            }),
            typed_links: true,
        }
    }

    /// Omit child types from directory listings, like gateways that only
    /// report names and CIDs
    pub fn with_untyped_links(mut self) -> Self {
        self.typed_links = false;
        self
    }

    /// Root CID of the last committed snapshot
    pub fn committed_root(&self) -> Cid {
        self.state.read().committed_root.clone()
    }

    /// Whether a block (file bytes or directory) has been stored
    pub fn contains_block(&self, cid: &str) -> bool {
        self.state.read().blocks.contains_key(cid)
    }

    /// Write the committed snapshot history as JSON
    pub fn save_snapshot(&self, file: &Path) -> Result<(), StorageError> {
        let state = self.state.read();
        let snapshot = Snapshot {
            root: state.committed_root.clone(),
            blocks: state
                .blocks
                .iter()
                .map(|(cid, block)| (cid.clone(), block.clone()))
                .collect(),
        };
        if let Some(parent) = file.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(file, serde_json::to_vec_pretty(&snapshot)?)?;
        debug!(file = %file.display(), root = %snapshot.root, "Saved snapshot");
        Ok(())
    }

    /// Load a store from a JSON snapshot
    pub fn load_snapshot(file: &Path) -> Result<Self, StorageError> {
        let bytes = std::fs::read(file)?;
        let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
        let blocks: HashMap<Cid, Block> = snapshot.blocks.into_iter().collect();
        let working = load(&snapshot.root, &blocks)?;
        Ok(Self {
            state: RwLock::new(State {
                working,
                committed_root: snapshot.root,
                blocks,
            }),
            typed_links: true,
        })
    }

    fn describe(&self, node: &WorkNode, logical_path: &str) -> FileNode {
        let name = path::split_parent(logical_path).1.to_string();
        let cid = node.cid();
        let links = match node {
            WorkNode::Dir { children } => children
                .iter()
                .map(|(child_name, child)| CidInfo {
                    cid: child.cid(),
                    name: child_name.clone(),
                    size: child.size(),
                    kind: self.typed_links.then(|| child.kind()),
                    ..Default::default()
                })
                .collect(),
            WorkNode::File { .. } => Vec::new(),
        };
        let cid_info = CidInfo {
            cid: cid.clone(),
            name: name.clone(),
            size: node.size(),
            kind: Some(node.kind()),
            links,
            path: logical_path.to_string(),
            root: false,
        };
        FileNode {
            cid,
            name,
            path: logical_path.to_string(),
            kind: node.kind(),
            cid_info,
        }
    }

    fn node_at(&self, logical_path: &str) -> Result<FileNode, StorageError> {
        let logical_path = path::normalize(logical_path);
        let state = self.state.read();
        let node = state
            .working
            .lookup(&logical_path)
            .ok_or_else(|| StorageError::NotFound(logical_path.clone()))?;
        Ok(self.describe(node, &logical_path))
    }

    fn stage_file(&self, logical_path: &str, data: &[u8]) -> Result<FileNode, StorageError> {
        let logical_path = path::normalize(logical_path);
        let segments: Vec<&str> = path::segments(&logical_path).collect();
        let Some((name, parents)) = segments.split_last() else {
            return Err(StorageError::InvalidPath(logical_path.clone()));
        };
        let cid = compute_file_cid(data);
        let size = data.len() as u64;
        {
            let mut state = self.state.write();
            let state = &mut *state;
            state
                .blocks
                .entry(cid.clone())
                .or_insert(Block::File { size });
            let children = dir_mut(&mut state.working, parents, true, &logical_path)?;
            if let Some(WorkNode::Dir { .. }) = children.get(*name) {
                return Err(StorageError::AlreadyExists(logical_path.clone()));
            }
            children.insert(name.to_string(), WorkNode::File { cid, size });
        }
        debug!(path = %logical_path, size, "Staged file");
        self.node_at(&logical_path)
    }
}

#[async_trait]
impl StorageClient for MemoryStorage {
    async fn get_root_node(&self) -> Result<FileNode, StorageError> {
        self.node_at("")
    }

    async fn get_file_node(&self, path: &str) -> Result<FileNode, StorageError> {
        self.node_at(path)
    }

    async fn set_root_cid(&self, cid: &str) -> Result<FileNode, StorageError> {
        {
            let mut state = self.state.write();
            match state.blocks.get(cid) {
                Some(Block::Dir { .. }) => {}
                Some(Block::File { .. }) => return Err(StorageError::NotADirectory(cid.to_string())),
                None => return Err(StorageError::UnknownCid(cid.to_string())),
            }
            state.working = load(cid, &state.blocks)?;
            state.committed_root = cid.to_string();
        }
        info!(root = %cid, "Switched root");
        self.node_at("")
    }

    async fn find_item(
        &self,
        parent: &FileNode,
        name: &str,
    ) -> Result<Option<FileNode>, StorageError> {
        let parent_path = path::normalize(&parent.path);
        let state = self.state.read();
        match state.working.lookup(&parent_path) {
            Some(WorkNode::Dir { children }) => Ok(children
                .get(name)
                .map(|child| self.describe(child, &path::join(&parent_path, name)))),
            Some(WorkNode::File { .. }) => Err(StorageError::NotADirectory(parent_path)),
            None => Err(StorageError::NotFound(parent_path)),
        }
    }

    async fn is_folder(&self, node: &FileNode) -> Result<bool, StorageError> {
        let logical_path = path::normalize(&node.path);
        let state = self.state.read();
        state
            .working
            .lookup(&logical_path)
            .map(|n| n.kind() == NodeKind::Dir)
            .ok_or(StorageError::NotFound(logical_path))
    }

    async fn add_file(&self, path: &str, file: &UploadFile) -> Result<FileNode, StorageError> {
        self.stage_file(path, &file.data)
    }

    async fn add_file_content(
        &self,
        path: &str,
        content: &str,
    ) -> Result<FileNode, StorageError> {
        self.stage_file(path, content.as_bytes())
    }

    async fn add_folder(&self, parent: &FileNode, name: &str) -> Result<FileNode, StorageError> {
        let parent_path = path::normalize(&parent.path);
        let folder_path = path::join(&parent_path, name);
        {
            let mut state = self.state.write();
            let segments: Vec<&str> = path::segments(&parent_path).collect();
            let children = dir_mut(&mut state.working, &segments, false, &parent_path)?;
            if children.contains_key(name) {
                return Err(StorageError::AlreadyExists(folder_path));
            }
            children.insert(name.to_string(), WorkNode::empty_dir());
        }
        debug!(path = %folder_path, "Staged folder");
        self.node_at(&folder_path)
    }

    async fn update_folder_name(
        &self,
        node: &FileNode,
        name: &str,
    ) -> Result<FileNode, StorageError> {
        let node_path = path::normalize(&node.path);
        if node_path.is_empty() || name.is_empty() || name.contains('/') {
            return Err(StorageError::InvalidPath(node_path));
        }
        let (parent_path, old_name) = path::split_parent(&node_path);
        let new_path = path::join(parent_path, name);
        if old_name != name {
            let mut state = self.state.write();
            let segments: Vec<&str> = path::segments(parent_path).collect();
            let children = dir_mut(&mut state.working, &segments, false, parent_path)?;
            if children.contains_key(name) {
                return Err(StorageError::AlreadyExists(new_path));
            }
            let moved = children
                .remove(old_name)
                .ok_or_else(|| StorageError::NotFound(node_path.clone()))?;
            children.insert(name.to_string(), moved);
        }
        debug!(from = %node_path, to = %new_path, "Staged rename");
        self.node_at(&new_path)
    }

    async fn delete(&self, node: &FileNode) -> Result<(), StorageError> {
        let node_path = path::normalize(&node.path);
        if node_path.is_empty() {
            return Err(StorageError::InvalidPath(node_path));
        }
        let (parent_path, name) = path::split_parent(&node_path);
        let mut state = self.state.write();
        let segments: Vec<&str> = path::segments(parent_path).collect();
        let children = dir_mut(&mut state.working, &segments, false, parent_path)?;
        children
            .remove(name)
            .ok_or_else(|| StorageError::NotFound(node_path.clone()))?;
        debug!(path = %node_path, "Staged delete");
        Ok(())
    }

    async fn apply_updates(&self) -> Result<Cid, StorageError> {
        let mut state = self.state.write();
        let state = &mut *state;
        let root = persist(&state.working, &mut state.blocks);
        state.committed_root = root.clone();
        info!(root = %root, blocks = state.blocks.len(), "Applied updates");
        Ok(root)
    }

    async fn reset(&self) -> Result<(), StorageError> {
        let mut state = self.state.write();
        let state = &mut *state;
        state.working = load(&state.committed_root, &state.blocks)?;
        debug!(root = %state.committed_root, "Discarded staged updates");
        Ok(())
    }

    fn hash_file(&self, data: &[u8]) -> Cid {
        compute_file_cid(data)
    }
}
