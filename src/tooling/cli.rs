//! CLI Tooling
//!
//! Every command opens a `StorageSession` over the local snapshot, performs
//! one operation, and writes the snapshot back when the root changed.

use crate::config::xdg::default_snapshot_path;
use crate::config::{CidnavConfig, ConfigLoader};
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::resolve::{extract_url_path, MemoryHistory};
use crate::session::StorageSession;
use crate::store::MemoryStorage;
use crate::table::{format_bytes, TableRow};
use crate::tree::TreeIndex;
use crate::types::NodeKind;
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Cidnav CLI - browse and edit a content-addressed file tree
#[derive(Parser)]
#[command(name = "cidnav")]
#[command(about = "File manager for content-addressed storage")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Snapshot file backing the store
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List a folder
    Ls {
        /// Folder path (defaults to the browsed root)
        path: Option<String>,
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the folder tree down to a path
    Tree {
        /// Path to expand
        path: Option<String>,
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Upload local files and folders
    Upload {
        /// Files or folders to upload
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Destination folder (defaults to the browsed root)
        #[arg(long)]
        to: Option<String>,
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Create a new folder
    Mkdir {
        /// Parent folder (defaults to the browsed root)
        parent: Option<String>,
    },
    /// Rename a file or folder
    Rename { path: String, name: String },
    /// Delete a file or folder
    Rm { path: String },
    /// Open a file with its registered handler
    Open {
        path: String,
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Decode a browser location into root CID and path
    Url {
        location: String,
        #[arg(long)]
        base_url: Option<String>,
    },
}

/// Logging config from the loaded config with CLI flags applied
pub fn logging_config(cli: &Cli, config: &CidnavConfig) -> LoggingConfig {
    let mut logging = config.logging.clone();
    if let Some(level) = &cli.log_level {
        logging.level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        logging.format = format.clone();
    }
    if let Some(output) = &cli.log_output {
        logging.output = output.clone();
    }
    if let Some(file) = &cli.log_file {
        logging.file = Some(file.clone());
    }
    logging
}

/// Load configuration, explicit file first
pub fn load_config(config_path: Option<&Path>) -> Result<CidnavConfig, ApiError> {
    let loaded = match config_path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    };
    loaded.map_err(|e| ApiError::ConfigError(e.to_string()))
}

pub struct CliContext {
    config: CidnavConfig,
    store_path: PathBuf,
    storage: Arc<MemoryStorage>,
}

impl CliContext {
    /// Open the snapshot at `store_path`, the configured path, or the XDG default
    pub fn new(config: CidnavConfig, store_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let store_path = match store_path.or_else(|| config.storage.snapshot_path.clone()) {
            Some(path) => path,
            None => default_snapshot_path()?,
        };
        let storage = if store_path.exists() {
            MemoryStorage::load_snapshot(&store_path)?
        } else {
            debug!(path = %store_path.display(), "No snapshot yet, starting empty");
            MemoryStorage::new()
        };
        Ok(Self {
            config,
            store_path,
            storage: Arc::new(storage),
        })
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    async fn session(&self) -> Result<StorageSession, ApiError> {
        let history = Arc::new(MemoryHistory::new("/"));
        let mut session = StorageSession::new(self.config.storage.clone(), history)?
            .with_client(self.storage.clone());
        session.init_content().await?;
        Ok(session)
    }

    fn persist(&self) -> Result<(), ApiError> {
        self.storage.save_snapshot(&self.store_path)?;
        info!(
            path = %self.store_path.display(),
            root = %self.storage.committed_root(),
            "Snapshot written"
        );
        Ok(())
    }

    /// Execute a CLI command
    pub async fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Ls { path, format } => {
                let mut session = self.session().await?;
                if let Some(path) = path {
                    session.open_folder(path, false).await?;
                }
                let path = session.state().current_path.clone();
                format_listing(&path, session.table(), format)
            }
            Commands::Tree { path, format } => {
                let mut session = self.session().await?;
                if let Some(path) = path {
                    session.open_folder(path, false).await?;
                }
                if format == "json" {
                    let nodes: Vec<_> = session
                        .tree()
                        .index()
                        .iter()
                        .map(|(_, n)| {
                            json!({
                                "path": n.path,
                                "cid": n.cid,
                                "type": n.kind,
                                "expanded": n.expanded,
                                "active": n.active,
                            })
                        })
                        .collect();
                    to_json(&nodes)
                } else {
                    Ok(format_tree_text(session.tree().index()))
                }
            }
            Commands::Upload { paths, to, format } => {
                let mut session = self.session().await?;
                let count = session.drop_files(paths, to.as_deref())?;
                let outcome = session.submit_uploads().await?;
                self.persist()?;
                if format == "json" {
                    to_json(&outcome)
                } else {
                    let mut out = format!(
                        "Uploaded {} file(s), root {}\n",
                        count,
                        outcome.root_cid.bold()
                    );
                    for path in &outcome.paths {
                        out.push_str(&format!("  {}\n", path));
                    }
                    Ok(out.trim_end().to_string())
                }
            }
            Commands::Mkdir { parent } => {
                let mut session = self.session().await?;
                let root = session.add_new_folder(parent.as_deref()).await?;
                self.persist()?;
                Ok(format!("Created folder, root {}", root))
            }
            Commands::Rename { path, name } => {
                let mut session = self.session().await?;
                let root = session.rename_node(path, name).await?;
                self.persist()?;
                Ok(format!("Renamed {}, root {}", path, root))
            }
            Commands::Rm { path } => {
                let mut session = self.session().await?;
                let root = session.delete_node(path).await?;
                self.persist()?;
                Ok(format!("Deleted {}, root {}", path, root))
            }
            Commands::Open { path, format } => {
                let mut session = self.session().await?;
                let (parent, name) = crate::path::split_parent(path);
                let folder = session.open_folder(parent, false).await?;
                let record = folder
                    .links
                    .into_iter()
                    .find(|l| l.name == name)
                    .ok_or_else(|| ApiError::NotFound(path.clone()))?;
                match session.open_file(&record).await? {
                    Some(opened) if format == "json" => to_json(&opened),
                    Some(opened) => Ok(format!("{} ({}): {}", opened.handler, record.name, opened.url)),
                    None if record.kind == Some(NodeKind::Dir) => {
                        let path = session.state().current_path.clone();
                        format_listing(&path, session.table(), format)
                    }
                    None => Ok(format!("No handler for {}", record.name)),
                }
            }
            Commands::Url { location, base_url } => {
                let url = extract_url_path(location, base_url.as_deref());
                to_json(&json!({ "cid": url.cid, "path": url.path }))
            }
        }
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::Storage(crate::error::StorageError::Serialization(e)))
}

fn format_listing(path: &str, rows: &[TableRow], format: &str) -> Result<String, ApiError> {
    if format == "json" {
        return to_json(rows);
    }
    let title = if path.is_empty() { "/" } else { path };
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Name", "Type", "Size", "CID"]);
    for row in rows {
        let size = match row.kind {
            NodeKind::Dir => "-".to_string(),
            NodeKind::File => format_bytes(row.size),
        };
        table.add_row(vec![
            row.name.clone(),
            row.kind.as_str().to_string(),
            size,
            row.cid.clone(),
        ]);
    }
    Ok(format!("{}\n{}", title.bold().underline(), table))
}

fn format_tree_text(index: &TreeIndex) -> String {
    let mut out = String::new();
    for (handle, root) in index.roots() {
        push_tree_line(&mut out, 0, &root.name, root.active, root.expanded);
        if root.expanded {
            push_children(index, handle, 1, &mut out);
        }
    }
    out.trim_end().to_string()
}

fn push_children(index: &TreeIndex, handle: crate::tree::NodeHandle, depth: usize, out: &mut String) {
    for child in index.node(handle).children.iter().copied() {
        let node = index.node(child);
        push_tree_line(out, depth, &node.name, node.active, node.expanded && node.is_dir());
        if node.expanded {
            push_children(index, child, depth + 1, out);
        }
    }
}

fn push_tree_line(out: &mut String, depth: usize, name: &str, active: bool, expanded: bool) {
    let marker = if expanded { "v" } else { ">" };
    let line = format!("{}{} {}", "  ".repeat(depth), marker, name);
    if active {
        out.push_str(&format!("{}\n", line.bold()));
    } else {
        out.push_str(&format!("{}\n", line));
    }
}
