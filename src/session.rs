//! Storage session
//!
//! The explicit context object behind one file-manager view. It owns the
//! navigation state, the folder tree, the breadcrumb, the file table and the
//! upload queue, and drives the storage client for every mutation. Each
//! mutation is applied as one snapshot and followed by a refresh, because a
//! new root CID invalidates every cached CID on the way to the change.

use crate::config::StorageConfig;
use crate::drop::collect_dropped_files;
use crate::error::{ApiError, StorageError};
use crate::handlers::{FileConfig, FileHandler, FileMatcher, HandlerRegistry, OpenedFile};
use crate::path;
use crate::resolve::{
    extract_url_path, format_url_path, resolve_unique_name, resolve_upload_path, NameKind,
    NavigationHistory, ASSETS_FOLDER, ASSETS_PATH,
};
use crate::store::{FileNode, StorageClient};
use crate::table::{table_rows, TableRow};
use crate::tree::{fetch_dir, TreeReconciler};
use crate::types::{Cid, CidInfo, NodeKind, UploadFile};
use crate::upload::{CancelHandle, UploadOutcome, UploadQueue};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Name given to folders created from the tree
pub const NEW_FOLDER_NAME: &str = "New folder";

type UrlHook = Box<dyn Fn(&str) + Send + Sync>;
type Hook = Box<dyn Fn() + Send + Sync>;

/// Host callbacks
#[derive(Default)]
pub struct StorageHooks {
    pub on_open: Option<UrlHook>,
    pub on_cancel: Option<Hook>,
    pub on_preview: Option<Hook>,
    pub on_close_preview: Option<Hook>,
    pub on_uploaded_file: Option<UrlHook>,
}

impl StorageHooks {
    pub fn on_open(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_open = Some(Box::new(hook));
        self
    }

    pub fn on_cancel(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_cancel = Some(Box::new(hook));
        self
    }

    pub fn on_preview(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_preview = Some(Box::new(hook));
        self
    }

    pub fn on_close_preview(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_close_preview = Some(Box::new(hook));
        self
    }

    pub fn on_uploaded_file(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_uploaded_file = Some(Box::new(hook));
        self
    }
}

impl std::fmt::Debug for StorageHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageHooks")
            .field("on_open", &self.on_open.is_some())
            .field("on_cancel", &self.on_cancel.is_some())
            .field("on_preview", &self.on_preview.is_some())
            .field("on_close_preview", &self.on_close_preview.is_some())
            .field("on_uploaded_file", &self.on_uploaded_file.is_some())
            .finish()
    }
}

/// Where the view is
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NavigationState {
    /// CID of the browsed root (the asset folder when one is present)
    pub root_cid: Option<Cid>,
    /// CID of the folder shown in the table
    pub current_cid: Option<Cid>,
    /// Logical path of the folder shown in the table
    pub current_path: String,
    /// Viewing a foreign or historical snapshot; mutations are refused
    pub read_only: bool,
    /// Browsing the `/_assets` folder instead of the storage root
    pub asset_root: bool,
}

/// One breadcrumb entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Crumb {
    pub name: String,
    pub cid: Cid,
    pub path: String,
}

/// A file uploaded through the host API
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedFile {
    pub file_name: String,
    pub url: String,
}

/// Shortened CID for labels: first 6 and last 4 characters
pub fn truncate_cid(cid: &str) -> String {
    let chars: Vec<char> = cid.chars().collect();
    if chars.len() <= 13 {
        return cid.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Folder receiving uploads made through the bare upload modal on `date`
pub fn uploads_folder(date: NaiveDate) -> String {
    format!("{}/uploads_{}", ASSETS_PATH, date.format("%Y%m%d"))
}

pub struct StorageSession {
    config: StorageConfig,
    client: Option<Arc<dyn StorageClient>>,
    history: Arc<dyn NavigationHistory>,
    hooks: StorageHooks,
    handlers: HandlerRegistry,
    state: NavigationState,
    tree: TreeReconciler,
    breadcrumb: Vec<Crumb>,
    table: Vec<TableRow>,
    uploads: UploadQueue,
    preview: Option<CidInfo>,
    current_file: Option<String>,
}

impl StorageSession {
    pub fn new(
        config: StorageConfig,
        history: Arc<dyn NavigationHistory>,
    ) -> Result<Self, ApiError> {
        let tree = TreeReconciler::new(config.is_file_shown);
        let uploads = UploadQueue::new(config.upload_multiple);
        Ok(Self {
            config,
            client: None,
            history,
            hooks: StorageHooks::default(),
            handlers: HandlerRegistry::with_defaults()?,
            state: NavigationState::default(),
            tree,
            breadcrumb: Vec::new(),
            table: Vec::new(),
            uploads,
            preview: None,
            current_file: None,
        })
    }

    /// Bind the storage client every operation goes through
    pub fn with_client(mut self, client: Arc<dyn StorageClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_hooks(mut self, hooks: StorageHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn bind_client(&mut self, client: Arc<dyn StorageClient>) {
        self.client = Some(client);
    }

    pub fn register_handler(&mut self, matcher: FileMatcher, handler: Arc<dyn FileHandler>) {
        self.handlers.register(matcher, handler);
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn tree(&self) -> &TreeReconciler {
        &self.tree
    }

    pub fn breadcrumb(&self) -> &[Crumb] {
        &self.breadcrumb
    }

    pub fn table(&self) -> &[TableRow] {
        &self.table
    }

    pub fn uploads(&self) -> &UploadQueue {
        &self.uploads
    }

    pub fn uploads_mut(&mut self) -> &mut UploadQueue {
        &mut self.uploads
    }

    pub fn upload_cancel_handle(&self) -> CancelHandle {
        self.uploads.cancel_handle()
    }

    pub fn preview(&self) -> Option<&CidInfo> {
        self.preview.as_ref()
    }

    pub fn current_file(&self) -> Option<&str> {
        self.current_file.as_deref()
    }

    fn client(&self) -> Result<Arc<dyn StorageClient>, ApiError> {
        self.client.clone().ok_or(ApiError::StorageNotBound)
    }

    fn ensure_writable(&self) -> Result<(), ApiError> {
        if self.state.read_only {
            return Err(ApiError::ReadOnly(
                self.state.root_cid.clone().unwrap_or_default(),
            ));
        }
        Ok(())
    }

    /// Logical path of the browsed root
    fn root_path(&self) -> &'static str {
        if self.state.asset_root {
            ASSETS_PATH
        } else {
            ""
        }
    }

    /// Root node and whether it is the asset folder
    async fn asset_root_node(client: &dyn StorageClient) -> Result<(FileNode, bool), ApiError> {
        let root = client.get_root_node().await?;
        match client.find_item(&root, ASSETS_FOLDER).await {
            Ok(Some(assets)) if assets.kind == NodeKind::Dir => Ok((assets, true)),
            Ok(_) => Ok((root, false)),
            Err(e) => {
                warn!(error = %e, "Asset folder lookup failed, browsing the root");
                Ok((root, false))
            }
        }
    }

    async fn browse_root(&self, client: &dyn StorageClient) -> Result<FileNode, ApiError> {
        if self.state.asset_root {
            Ok(client.get_file_node(ASSETS_PATH).await?)
        } else {
            Ok(client.get_root_node().await?)
        }
    }

    /// Write `path` into history; embedded views never touch the URL
    pub fn update_url_path(&self, path: &str) {
        if self.config.is_embedded() {
            return;
        }
        let url = format_url_path(
            self.config.base_url.as_deref(),
            self.state.root_cid.as_deref(),
            Some(path),
        );
        debug!(url = %url, "Replacing history state");
        self.history.replace_state(&url);
    }

    /// Initial render from the current location
    ///
    /// A CID in the location that differs from the live root switches the
    /// client to that snapshot and makes the view read-only (outside the
    /// embedded modes).
    pub async fn init_content(&mut self) -> Result<(), ApiError> {
        let client = self.client()?;
        let location = self.history.location();
        let url = extract_url_path(&location, self.config.base_url.as_deref());
        let (mut root, asset_root) = Self::asset_root_node(&*client).await?;

        if self.config.is_upload_modal {
            self.uploads.reset();
            let destination = if asset_root {
                uploads_folder(Local::now().date_naive())
            } else {
                String::new()
            };
            self.uploads.show(&destination, Vec::new());
        }

        self.state.root_cid = Some(root.cid.clone());
        self.state.current_cid = Some(root.cid.clone());
        let requested = Some(url.cid.clone())
            .filter(|c| !c.is_empty())
            .or_else(|| self.config.cid.clone());
        self.state.read_only = !self.config.is_embedded()
            && requested.as_deref().is_some_and(|cid| cid != root.cid);

        if !self.config.is_embedded() {
            match requested.as_deref() {
                Some(cid) if self.state.read_only => {
                    root = client.set_root_cid(cid).await?;
                    self.state.root_cid = Some(cid.to_string());
                    info!(root = %cid, "Viewing foreign snapshot read-only");
                }
                Some(_) => {}
                None => self.update_url_path(""),
            }
        }
        self.state.asset_root = asset_root && !self.state.read_only;

        let display = if self.state.asset_root {
            format!("{}{}", ASSETS_PATH, url.path)
        } else {
            url.path
        };
        self.render(&*client, root, &display).await;
        Ok(())
    }

    /// Rebuild tree, breadcrumb and table for `display_path`
    ///
    /// Every folder on the way to the displayed path is fetched; a trailing
    /// file segment is previewed.
    async fn render(&mut self, client: &dyn StorageClient, root: FileNode, display_path: &str) {
        let root_path = self.root_path();
        let mut root_info = fetch_dir(client, root, root_path, "").await;
        if root_info.name.is_empty() {
            root_info.name = truncate_cid(&root_info.cid);
        }
        root_info.root = true;

        let mut nodes = vec![root_info.without_links()];
        nodes.extend(root_info.links.iter().cloned());
        self.breadcrumb = vec![Crumb {
            name: root_info.name.clone(),
            cid: root_info.cid.clone(),
            path: root_info.path.clone(),
        }];
        self.state.current_cid = Some(root_info.cid.clone());
        self.preview = None;
        let mut shown = root_info.clone();
        let mut preview = None;

        let below = display_path
            .strip_prefix(root_path)
            .filter(|rest| rest.is_empty() || rest.starts_with('/'))
            .unwrap_or("");
        if !below.is_empty() && !self.config.is_embedded() {
            let mut folder_path = root_path.to_string();
            for segment in path::segments(below) {
                let candidate = path::join(&folder_path, segment);
                let node = match client.get_file_node(&candidate).await {
                    Ok(node) => node,
                    Err(e) => {
                        warn!(path = %candidate, error = %e, "Displayed path no longer resolves");
                        break;
                    }
                };
                let is_folder = client.is_folder(&node).await.unwrap_or_else(|e| {
                    warn!(path = %candidate, error = %e, "Folder probe failed, treating as file");
                    false
                });
                if !is_folder {
                    preview = shown
                        .links
                        .iter()
                        .find(|l| l.is_file() && l.name == segment)
                        .cloned();
                    break;
                }
                let info = fetch_dir(client, node, &candidate, segment).await;
                nodes.extend(info.links.iter().cloned());
                self.breadcrumb.push(Crumb {
                    name: info.name.clone(),
                    cid: info.cid.clone(),
                    path: candidate.clone(),
                });
                self.state.current_cid = Some(info.cid.clone());
                shown = info;
                folder_path = candidate;
            }
        }

        let active = Some(display_path).filter(|p| !p.is_empty());
        self.tree.rebuild(&nodes, active);
        self.table = table_rows(&shown);
        self.state.current_path = shown.path.clone();
        if let Some(file) = preview {
            self.preview_file(file);
        }
        debug!(
            path = %self.state.current_path,
            rows = self.table.len(),
            "Rendered view"
        );
    }

    /// Re-resolve the view after a committed mutation
    async fn refresh(&mut self, display_path: &str) -> Result<(), ApiError> {
        let client = self.client()?;
        let (root, asset_root) = if self.state.read_only {
            (client.get_root_node().await?, false)
        } else {
            Self::asset_root_node(&*client).await?
        };
        self.state.asset_root = asset_root;
        self.state.root_cid = Some(root.cid.clone());
        self.state.current_cid = Some(root.cid.clone());
        let display = if self.state.asset_root && !path::is_within(display_path, ASSETS_PATH) {
            format!("{}{}", ASSETS_PATH, display_path)
        } else {
            display_path.to_string()
        };
        self.current_file = None;
        self.render(&*client, root, &display).await;
        self.update_url_path(&display);
        Ok(())
    }

    /// Open a folder: merge its children into the tree, select it, show it
    pub async fn open_folder(&mut self, folder_path: &str, toggle: bool) -> Result<CidInfo, ApiError> {
        let client = self.client()?;
        let mut folder_path = path::normalize(folder_path);
        if folder_path.is_empty() {
            folder_path = self.root_path().to_string();
        }
        let node = if folder_path == self.root_path() {
            self.browse_root(&*client).await?
        } else {
            client.get_file_node(&folder_path).await?
        };
        let name = self
            .tree
            .index()
            .lookup(&folder_path)
            .map(|n| n.name.clone())
            .unwrap_or_default();
        let info = fetch_dir(&*client, node, &folder_path, &name).await;

        self.state.current_cid = Some(info.cid.clone());
        self.state.current_path = folder_path.clone();
        if self.tree.update_content(&info, toggle).is_none() {
            debug!(path = %folder_path, "Opened folder is not in the tree");
        }
        self.breadcrumb = self.breadcrumb_for(&info);
        self.table = table_rows(&info);
        self.update_url_path(&folder_path);
        Ok(info)
    }

    fn breadcrumb_for(&self, info: &CidInfo) -> Vec<Crumb> {
        let root_path = self.root_path();
        let index = self.tree.index();
        let mut crumbs = Vec::new();
        if let Some(root) = index.lookup(root_path) {
            crumbs.push(Crumb {
                name: root.name.clone(),
                cid: root.cid.clone(),
                path: root.path.clone(),
            });
        }
        let below = info.path.strip_prefix(root_path).unwrap_or(&info.path);
        let mut current = root_path.to_string();
        for segment in path::segments(below) {
            current = path::join(&current, segment);
            let cid = if current == info.path {
                info.cid.clone()
            } else {
                index
                    .lookup(&current)
                    .map(|n| n.cid.clone())
                    .unwrap_or_default()
            };
            crumbs.push(Crumb {
                name: segment.to_string(),
                cid,
                path: current.clone(),
            });
        }
        crumbs
    }

    async fn parent_node(
        client: &dyn StorageClient,
        node_path: &str,
    ) -> Result<FileNode, StorageError> {
        let parent_path = path::split_parent(node_path).0;
        if parent_path.is_empty() {
            client.get_root_node().await
        } else {
            client.get_file_node(parent_path).await
        }
    }

    /// Rename a node, suffixing the name when a sibling already holds it
    pub async fn rename_node(&mut self, node_path: &str, new_name: &str) -> Result<Cid, ApiError> {
        self.ensure_writable()?;
        let client = self.client()?;
        let node = client.get_file_node(node_path).await?;
        if node.is_root() || new_name.is_empty() || new_name.contains('/') {
            return Err(StorageError::InvalidPath(node.path).into());
        }
        if node.name == new_name {
            debug!(path = %node.path, "Rename to same name skipped");
            return Ok(self.state.root_cid.clone().unwrap_or(node.cid));
        }
        let parent = Self::parent_node(&*client, &node.path).await?;
        let kind = match node.kind {
            NodeKind::Dir => NameKind::Folder,
            NodeKind::File => NameKind::File,
        };
        let name = resolve_unique_name(&*client, &parent, new_name, kind).await;
        let renamed = client.update_folder_name(&node, &name).await?;
        let root = client.apply_updates().await?;
        info!(from = %node.path, to = %renamed.path, root = %root, "Renamed node");

        let display = match renamed.kind {
            NodeKind::Dir => renamed.path.clone(),
            NodeKind::File => renamed.parent_path().to_string(),
        };
        self.refresh(&display).await?;
        Ok(root)
    }

    /// Delete a node and show its parent
    pub async fn delete_node(&mut self, node_path: &str) -> Result<Cid, ApiError> {
        self.ensure_writable()?;
        let client = self.client()?;
        let node = client.get_file_node(node_path).await?;
        if node.is_root() || node.path == self.root_path() {
            return Err(StorageError::InvalidPath(node.path).into());
        }
        client.delete(&node).await?;
        let root = client.apply_updates().await?;
        info!(path = %node.path, root = %root, "Deleted node");
        self.refresh(node.parent_path()).await?;
        Ok(root)
    }

    /// Create `New folder` (suffixed on collision) inside `parent_path`, or the browsed root
    pub async fn add_new_folder(&mut self, parent_path: Option<&str>) -> Result<Cid, ApiError> {
        self.ensure_writable()?;
        let client = self.client()?;
        let parent = match parent_path.map(path::normalize).filter(|p| !p.is_empty()) {
            Some(p) => client.get_file_node(&p).await?,
            None => self.browse_root(&*client).await?,
        };
        if parent.kind != NodeKind::Dir {
            return Err(StorageError::NotADirectory(parent.path).into());
        }
        let name = resolve_unique_name(&*client, &parent, NEW_FOLDER_NAME, NameKind::Folder).await;
        let folder = client.add_folder(&parent, &name).await?;
        let root = client.apply_updates().await?;
        info!(path = %folder.path, root = %root, "Added folder");

        let display = self.state.current_path.clone();
        self.refresh(&display).await?;
        Ok(root)
    }

    /// Editor save: stage the text at `file_path` and commit
    pub async fn save_file_content(&mut self, file_path: &str, content: &str) -> Result<Cid, ApiError> {
        self.ensure_writable()?;
        let client = self.client()?;
        let file_path = path::normalize(file_path);
        client.add_file_content(&file_path, content).await?;
        let root = client.apply_updates().await?;
        info!(path = %file_path, root = %root, "Saved file content");
        let display = self.state.current_path.clone();
        self.refresh(&display).await?;
        Ok(root)
    }

    /// Host upload API: stage every file under a collision-free path, commit once
    ///
    /// Returns each file's name with its gateway URL below the new root.
    pub async fn upload_files(&mut self, files: Vec<UploadFile>) -> Result<Vec<UploadedFile>, ApiError> {
        self.ensure_writable()?;
        let result = self.stage_and_commit(files).await;
        if let Err(e) = &result {
            error!(error = %e, "Host upload failed");
        }
        result
    }

    async fn stage_and_commit(&self, files: Vec<UploadFile>) -> Result<Vec<UploadedFile>, ApiError> {
        let client = self.client()?;
        let mut staged = Vec::with_capacity(files.len());
        for file in &files {
            let destination = resolve_upload_path(&*client, &file.path).await;
            let node = client.add_file(&destination, file).await?;
            staged.push((file.name.clone(), node.path));
        }
        let root = client.apply_updates().await?;
        info!(files = staged.len(), root = %root, "Uploaded files");
        let base = format!("{}/ipfs/{}", self.config.transport_endpoint, root);
        Ok(staged
            .into_iter()
            .map(|(file_name, dest)| UploadedFile {
                file_name,
                url: format!("{}/{}", base, dest.trim_start_matches('/')),
            })
            .collect())
    }

    /// Queue files for the upload modal at `folder_path` (the current folder by default)
    ///
    /// Refused in read-only views and when the session is the bare upload modal.
    pub fn open_upload_modal(&mut self, folder_path: Option<&str>, files: Vec<UploadFile>) -> bool {
        if self.state.read_only || self.config.is_upload_modal {
            return false;
        }
        let folder = folder_path
            .map(str::to_string)
            .unwrap_or_else(|| self.state.current_path.clone());
        self.uploads.reset();
        self.uploads.show(&folder, files);
        true
    }

    /// Folder uploads land in when the modal is opened without a path
    pub fn upload_destination(&self) -> String {
        if self.config.is_upload_modal && self.state.asset_root {
            uploads_folder(Local::now().date_naive())
        } else {
            self.state.current_path.clone()
        }
    }

    /// Read dropped filesystem entries into the upload modal
    pub fn drop_files(&mut self, entries: &[PathBuf], folder_path: Option<&str>) -> Result<usize, ApiError> {
        let client = self.client()?;
        let files = collect_dropped_files(&*client, entries)?;
        let count = files.len();
        if self.config.is_upload_modal {
            self.uploads.add_files(files);
        } else if !self.open_upload_modal(folder_path, files) {
            return Err(ApiError::ReadOnly(
                self.state.root_cid.clone().unwrap_or_default(),
            ));
        }
        Ok(count)
    }

    /// Submit the upload queue, then refresh and notify the host
    pub async fn submit_uploads(&mut self) -> Result<UploadOutcome, ApiError> {
        self.ensure_writable()?;
        let client = self.client.clone();
        let outcome = self.uploads.submit(client.as_deref()).await?;
        let display = self.state.current_path.clone();
        self.refresh(&display).await?;
        self.uploaded_file_url(&outcome.root_cid, &outcome.paths).await?;
        Ok(outcome)
    }

    /// Abort the running upload batch
    pub fn cancel_upload(&mut self) {
        self.uploads.cancel();
    }

    /// Single-file upload callback URL, built from the file's parent folder CID
    pub async fn uploaded_file_url(
        &self,
        root_cid: &str,
        paths: &[String],
    ) -> Result<Option<String>, ApiError> {
        if self.config.upload_multiple {
            return Ok(None);
        }
        let Some(first) = paths.first() else {
            return Ok(None);
        };
        let (parent_path, file_name) = path::split_parent(first);
        let parent_cid = if parent_path.is_empty() {
            root_cid.to_string()
        } else {
            self.client()?.get_file_node(parent_path).await?.cid
        };
        let url = format!(
            "{}/ipfs/{}/{}",
            self.config.transport_endpoint, parent_cid, file_name
        );
        if let Some(hook) = &self.hooks.on_uploaded_file {
            hook(&url);
        }
        Ok(Some(url))
    }

    /// Gateway URL of the selected file, handed to `on_open`
    pub fn open_url_for_current_file(&mut self) -> Option<String> {
        let cid = self.state.current_cid.clone()?;
        let file = self.current_file.take()?;
        let url = format!("{}/ipfs/{}/{}", self.config.transport_endpoint, cid, file);
        if let Some(hook) = &self.hooks.on_open {
            hook(&url);
        }
        Some(url)
    }

    /// Host cancelled the picker
    pub fn cancel(&mut self) {
        self.current_file = None;
        if let Some(hook) = &self.hooks.on_cancel {
            hook();
        }
    }

    fn file_config(&self, file: &CidInfo) -> FileConfig {
        let parent_path = path::split_parent(&file.path).0;
        let cid = self
            .tree
            .index()
            .lookup(parent_path)
            .map(|n| n.cid.clone())
            .or_else(|| self.state.root_cid.clone())
            .unwrap_or_default();
        FileConfig {
            transport_endpoint: self.config.transport_endpoint.clone(),
            signer: self.config.signer.clone(),
            base_url: self.config.base_url.clone(),
            cid,
        }
    }

    /// Open a record: folders are navigated, files go to their handler
    pub async fn open_file(&mut self, record: &CidInfo) -> Result<Option<OpenedFile>, ApiError> {
        if record.is_dir() {
            self.open_folder(&record.path, true).await?;
            return Ok(None);
        }
        let config = self.file_config(record);
        self.handlers.open(record, &config).await
    }

    /// Show a file in the preview pane; embedded views have none
    pub fn preview_file(&mut self, record: CidInfo) -> bool {
        if self.config.is_embedded() {
            self.preview = None;
            return false;
        }
        self.current_file = Some(record.name.clone());
        self.preview = Some(record);
        if let Some(hook) = &self.hooks.on_preview {
            hook();
        }
        true
    }

    pub fn close_preview(&mut self) {
        self.preview = None;
        if let Some(hook) = &self.hooks.on_close_preview {
            hook();
        }
    }

    /// Table click: folders open, files preview
    pub async fn select_row(&mut self, index: usize) -> Result<(), ApiError> {
        let row = self
            .table
            .get(index)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("table row {}", index)))?;
        self.update_url_path(&row.path);
        match row.kind {
            NodeKind::Dir => {
                self.close_preview();
                self.open_folder(&row.path, true).await?;
            }
            NodeKind::File => {
                let record = CidInfo {
                    cid: row.cid,
                    name: row.name,
                    size: row.size,
                    kind: Some(NodeKind::File),
                    path: row.path,
                    ..Default::default()
                };
                self.preview_file(record);
            }
        }
        Ok(())
    }

    /// Session shown again: drop staged edits and re-render from the location
    pub async fn on_show(&mut self) -> Result<(), ApiError> {
        let client = self.client()?;
        if let Err(e) = client.reset().await {
            warn!(error = %e, "Failed to reset storage client");
        }
        self.uploads.discard_staged();
        self.preview = None;
        self.init_content().await
    }
}

impl std::fmt::Debug for StorageSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageSession")
            .field("state", &self.state)
            .field("bound", &self.client.is_some())
            .field("hooks", &self.hooks)
            .field("handlers", &self.handlers)
            .finish()
    }
}
