//! Dropped filesystem entries
//!
//! Turns files and folders dropped on the upload zone into upload blobs. The
//! walk is breadth-first across all dropped entries, and every blob keeps its
//! path relative to the drop (`/photos/2024/a.png`).

use crate::error::{ApiError, StorageError};
use crate::store::StorageClient;
use crate::types::UploadFile;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Logical path of `entry` below the folder the drop came from
fn drop_path(entry: &Path, drop_parent: &Path) -> String {
    let relative = entry.strip_prefix(drop_parent).unwrap_or(entry);
    let segments: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    format!("/{}", segments.join("/"))
}

/// Read every file below `entries`, breadth-first, with precomputed CIDs
pub fn collect_dropped_files(
    client: &dyn StorageClient,
    entries: &[PathBuf],
) -> Result<Vec<UploadFile>, ApiError> {
    let mut found: Vec<(usize, PathBuf, String)> = Vec::new();
    for entry in entries {
        if !entry.exists() {
            warn!(path = %entry.display(), "Dropped entry does not exist, skipping");
            continue;
        }
        let drop_parent = entry.parent().unwrap_or_else(|| Path::new(""));
        for item in WalkDir::new(entry).sort_by_file_name() {
            let item = item.map_err(|e| StorageError::Io(e.into()))?;
            if !item.file_type().is_file() {
                continue;
            }
            let logical = drop_path(item.path(), drop_parent);
            found.push((item.depth(), item.path().to_path_buf(), logical));
        }
    }
    // stable: keeps drop order, then name order, within one depth
    found.sort_by_key(|(depth, _, _)| *depth);

    let mut files = Vec::with_capacity(found.len());
    for (_, source, logical) in found {
        let data = std::fs::read(&source).map_err(StorageError::from)?;
        let cid = client.hash_file(&data);
        debug!(path = %logical, cid = %cid, "Read dropped file");
        files.push(UploadFile::new(logical, data).with_cid(cid));
    }
    Ok(files)
}
