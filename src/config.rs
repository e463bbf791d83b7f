//! Configuration
//!
//! `CidnavConfig` is layered from defaults, the global config file, an
//! optional explicit file and `CIDNAV__*` environment variables.

pub mod facade;
pub mod merge;
pub mod sources;
pub mod xdg;

pub use facade::ConfigLoader;

use crate::logging::LoggingConfig;
use crate::types::Cid;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_transport_endpoint() -> String {
    "https://ipfs.io".to_string()
}

fn default_true() -> bool {
    true
}

/// Host options of a storage session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Gateway used to build file URLs (`{endpoint}/ipfs/{cid}/{name}`)
    #[serde(default = "default_transport_endpoint")]
    pub transport_endpoint: String,

    /// Opaque signer identity handed to file handlers
    #[serde(default)]
    pub signer: Option<String>,

    /// Prefix of the locations written to history; `#/` when unset
    #[serde(default)]
    pub base_url: Option<String>,

    /// Embedded as a picker: no URL writes, no read-only switch
    #[serde(default)]
    pub is_modal: bool,

    /// Embedded as a bare upload modal
    #[serde(default)]
    pub is_upload_modal: bool,

    /// Allow more than one file per upload
    #[serde(default = "default_true")]
    pub upload_multiple: bool,

    /// Show files in the folder tree, not only folders
    #[serde(default)]
    pub is_file_shown: bool,

    /// Root CID requested by the host
    #[serde(default)]
    pub cid: Option<Cid>,

    /// JSON snapshot backing the CLI store; None means the XDG data default
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}

impl StorageConfig {
    /// Whether URL writes and read-only switching are suppressed
    pub fn is_embedded(&self) -> bool {
        self.is_modal || self.is_upload_modal
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            transport_endpoint: default_transport_endpoint(),
            signer: None,
            base_url: None,
            is_modal: false,
            is_upload_modal: false,
            upload_multiple: default_true(),
            is_file_shown: false,
            cid: None,
            snapshot_path: None,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CidnavConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}
