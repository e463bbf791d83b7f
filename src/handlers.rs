//! File handler registry
//!
//! Hosts plug custom open/preview behaviour per file type. Handlers are keyed
//! by an exact extension or by a pattern; dispatch tries exact keys first and
//! then patterns in registration order.

use crate::error::ApiError;
use crate::types::{Cid, CidInfo};
use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Context handed to a handler when a file is opened
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileConfig {
    pub transport_endpoint: String,
    pub signer: Option<String>,
    pub base_url: Option<String>,
    /// CID of the folder holding the file
    pub cid: Cid,
}

impl FileConfig {
    /// Gateway URL of `file` inside its parent folder
    pub fn file_url(&self, file: &CidInfo) -> String {
        format!("{}/ipfs/{}/{}", self.transport_endpoint, self.cid, file.name)
    }
}

/// How an opened file is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenMode {
    Edit,
    Preview,
    Custom,
}

/// What a handler did with a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenedFile {
    pub handler: String,
    pub mode: OpenMode,
    pub url: String,
}

#[async_trait]
pub trait FileHandler: Send + Sync {
    fn name(&self) -> &str;

    async fn open_file(
        &self,
        file: &CidInfo,
        parent_cid: &str,
        config: &FileConfig,
    ) -> Result<OpenedFile, ApiError>;
}

/// Text editor for markdown and source files
#[derive(Debug, Default)]
pub struct EditorHandler;

#[async_trait]
impl FileHandler for EditorHandler {
    fn name(&self) -> &str {
        "editor"
    }

    async fn open_file(
        &self,
        file: &CidInfo,
        _parent_cid: &str,
        config: &FileConfig,
    ) -> Result<OpenedFile, ApiError> {
        Ok(OpenedFile {
            handler: self.name().to_string(),
            mode: OpenMode::Edit,
            url: config.file_url(file),
        })
    }
}

/// Media preview
#[derive(Debug, Default)]
pub struct PreviewHandler;

#[async_trait]
impl FileHandler for PreviewHandler {
    fn name(&self) -> &str {
        "preview"
    }

    async fn open_file(
        &self,
        file: &CidInfo,
        _parent_cid: &str,
        config: &FileConfig,
    ) -> Result<OpenedFile, ApiError> {
        Ok(OpenedFile {
            handler: self.name().to_string(),
            mode: OpenMode::Preview,
            url: config.file_url(file),
        })
    }
}

/// Key a handler is registered under
#[derive(Debug, Clone)]
pub enum FileMatcher {
    Exact(String),
    Pattern(Regex),
}

impl FileMatcher {
    pub fn pattern(pattern: &str) -> Result<Self, ApiError> {
        Ok(FileMatcher::Pattern(Regex::new(pattern)?))
    }

    fn same_key(&self, other: &FileMatcher) -> bool {
        match (self, other) {
            (FileMatcher::Exact(a), FileMatcher::Exact(b)) => a == b,
            (FileMatcher::Pattern(a), FileMatcher::Pattern(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

/// Type key of a file name: the text after its last `.`, lowercased
///
/// A name without a `.` is its own key.
pub fn file_type(name: &str) -> String {
    name.rsplit('.').next().unwrap_or_default().to_lowercase()
}

/// Ordered `(matcher, handler)` registry
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    entries: Vec<(FileMatcher, Arc<dyn FileHandler>)>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in editor and preview handlers
    pub fn with_defaults() -> Result<Self, ApiError> {
        let mut registry = Self::new();
        let editor: Arc<dyn FileHandler> = Arc::new(EditorHandler);
        registry.register(FileMatcher::Exact("md".to_string()), editor.clone());
        registry.register(FileMatcher::Exact("tsx".to_string()), editor.clone());
        registry.register(
            FileMatcher::pattern("(?i)(yml|yaml|json|js|s?css|ts)")?,
            editor,
        );
        registry.register(
            FileMatcher::pattern("(?i)(mp4|webm|mov|m3u8|jpeg|jpg|png|gif|bmp|svg)$")?,
            Arc::new(PreviewHandler),
        );
        Ok(registry)
    }

    /// Register a handler; re-registering a key replaces it in place
    pub fn register(&mut self, matcher: FileMatcher, handler: Arc<dyn FileHandler>) {
        match self.entries.iter_mut().find(|(m, _)| m.same_key(&matcher)) {
            Some(entry) => entry.1 = handler,
            None => self.entries.push((matcher, handler)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Handler for a type key: exact match first, then the first matching pattern
    pub fn resolve(&self, file_type: &str) -> Option<Arc<dyn FileHandler>> {
        let exact = self.entries.iter().find(|(m, _)| match m {
            FileMatcher::Exact(key) => key == file_type,
            FileMatcher::Pattern(_) => false,
        });
        let found = exact.or_else(|| {
            self.entries.iter().find(|(m, _)| match m {
                FileMatcher::Exact(_) => false,
                FileMatcher::Pattern(re) => re.is_match(file_type),
            })
        });
        found.map(|(_, handler)| handler.clone())
    }

    /// Dispatch `file` to its handler; `None` when no handler claims it
    pub async fn open(
        &self,
        file: &CidInfo,
        config: &FileConfig,
    ) -> Result<Option<OpenedFile>, ApiError> {
        let key = file_type(&file.name);
        let Some(handler) = self.resolve(&key) else {
            debug!(file = %file.name, file_type = %key, "No handler registered");
            return Ok(None);
        };
        debug!(file = %file.name, handler = handler.name(), "Opening file");
        handler.open_file(file, &config.cid, config).await.map(Some)
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(m, h)| (m, h.name())))
            .finish()
    }
}
