//! Storage doubles and fixtures shared by the integration tests

use async_trait::async_trait;
use cidnav::config::StorageConfig;
use cidnav::resolve::MemoryHistory;
use cidnav::{Cid, FileNode, MemoryStorage, StorageClient, StorageError, StorageSession, UploadFile};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Store with `files` committed as one snapshot
pub async fn seeded(files: &[(&str, &str)]) -> Arc<MemoryStorage> {
    let store = MemoryStorage::new();
    for (path, content) in files {
        store.add_file_content(path, content).await.unwrap();
    }
    store.apply_updates().await.unwrap();
    Arc::new(store)
}

pub fn upload(path: &str, content: &str) -> UploadFile {
    UploadFile::new(path, content.as_bytes().to_vec())
}

/// Session over `client` at `location`, already initialized
pub async fn session_at(
    client: Arc<dyn StorageClient>,
    config: StorageConfig,
    location: &str,
) -> (StorageSession, Arc<MemoryHistory>) {
    let history = Arc::new(MemoryHistory::new(location));
    let mut session = StorageSession::new(config, history.clone())
        .unwrap()
        .with_client(client);
    session.init_content().await.unwrap();
    (session, history)
}

/// Delegates to a `MemoryStorage`
///
/// Transfers of file names marked failing return a transfer error; the
/// transfer of the gated file name never finishes. With lookups broken every
/// `find_item` errors.
pub struct TestStorage {
    pub inner: Arc<MemoryStorage>,
    failing: Mutex<Vec<String>>,
    gated: Mutex<Option<String>>,
    broken_lookups: AtomicBool,
    pub reached: Notify,
    applies: AtomicUsize,
    resets: AtomicUsize,
}

impl TestStorage {
    pub fn new(inner: Arc<MemoryStorage>) -> Self {
        Self {
            inner,
            failing: Mutex::new(Vec::new()),
            gated: Mutex::new(None),
            broken_lookups: AtomicBool::new(false),
            reached: Notify::new(),
            applies: AtomicUsize::new(0),
            resets: AtomicUsize::new(0),
        }
    }

    pub fn fail_on(&self, name: &str) {
        self.failing.lock().push(name.to_string());
    }

    pub fn heal(&self) {
        self.failing.lock().clear();
    }

    pub fn gate(&self, name: &str) {
        *self.gated.lock() = Some(name.to_string());
    }

    pub fn open_gate(&self) {
        *self.gated.lock() = None;
    }

    pub fn break_lookups(&self) {
        self.broken_lookups.store(true, Ordering::SeqCst);
    }

    pub fn applies(&self) -> usize {
        self.applies.load(Ordering::SeqCst)
    }

    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StorageClient for TestStorage {
    async fn get_root_node(&self) -> Result<FileNode, StorageError> {
        self.inner.get_root_node().await
    }

    async fn get_file_node(&self, path: &str) -> Result<FileNode, StorageError> {
        self.inner.get_file_node(path).await
    }

    async fn set_root_cid(&self, cid: &str) -> Result<FileNode, StorageError> {
        self.inner.set_root_cid(cid).await
    }

    async fn find_item(
        &self,
        parent: &FileNode,
        name: &str,
    ) -> Result<Option<FileNode>, StorageError> {
        if self.broken_lookups.load(Ordering::SeqCst) {
            return Err(StorageError::Transfer(format!("lookup of {} timed out", name)));
        }
        self.inner.find_item(parent, name).await
    }

    async fn is_folder(&self, node: &FileNode) -> Result<bool, StorageError> {
        self.inner.is_folder(node).await
    }

    async fn add_file(&self, path: &str, file: &UploadFile) -> Result<FileNode, StorageError> {
        let gated = self.gated.lock().as_deref() == Some(file.name.as_str());
        if gated {
            self.reached.notify_one();
            std::future::pending::<()>().await;
        }
        let failing = self.failing.lock().iter().any(|name| *name == file.name);
        if failing {
            return Err(StorageError::Transfer(format!("connection reset on {}", path)));
        }
        self.inner.add_file(path, file).await
    }

    async fn add_file_content(&self, path: &str, content: &str) -> Result<FileNode, StorageError> {
        self.inner.add_file_content(path, content).await
    }

    async fn add_folder(&self, parent: &FileNode, name: &str) -> Result<FileNode, StorageError> {
        self.inner.add_folder(parent, name).await
    }

    async fn update_folder_name(
        &self,
        node: &FileNode,
        name: &str,
    ) -> Result<FileNode, StorageError> {
        self.inner.update_folder_name(node, name).await
    }

    async fn delete(&self, node: &FileNode) -> Result<(), StorageError> {
        self.inner.delete(node).await
    }

    async fn apply_updates(&self) -> Result<Cid, StorageError> {
        self.applies.fetch_add(1, Ordering::SeqCst);
        self.inner.apply_updates().await
    }

    async fn reset(&self) -> Result<(), StorageError> {
        self.resets.fetch_add(1, Ordering::SeqCst);
        self.inner.reset().await
    }

    fn hash_file(&self, data: &[u8]) -> Cid {
        self.inner.hash_file(data)
    }
}
