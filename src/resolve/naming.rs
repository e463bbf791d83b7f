//! Collision-free naming
//!
//! Files and folders use different suffix grammars, and existing stored data
//! depends on both:
//! - files: `report.pdf` → `report(1).pdf` → `report(2).pdf`
//! - folders: `New folder` → `New folder 1` → `New folder 2`

use crate::error::StorageError;
use crate::path;
use crate::store::{FileNode, StorageClient};
use tracing::{debug, warn};

/// Which suffix grammar applies to a name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    File,
    Folder,
}

/// Trailing `(n)` counter of a stem: the stem without it, and `n`
fn file_counter(stem: &str) -> Option<(&str, u64)> {
    let inner = stem.strip_suffix(')')?;
    let open = inner.rfind('(')?;
    let digits = &inner[open + 1..];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().map(|n| (&stem[..open], n))
}

/// Trailing digits of a name: the byte offset where they start, and their value
fn trailing_number(name: &str) -> Option<(usize, u64)> {
    let digits = name.bytes().rev().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let start = name.len() - digits;
    name[start..].parse().ok().map(|n| (start, n))
}

/// Split a file name at its last `.`
///
/// A name without any `.` has no extension.
fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (name, None),
    }
}

/// One step of the file suffix policy
pub fn next_file_name(name: &str) -> String {
    let (stem, ext) = split_extension(name);
    let stem = match file_counter(stem) {
        Some((base, n)) => format!("{}({})", base, n.saturating_add(1)),
        None => format!("{}(1)", stem),
    };
    match ext {
        Some(ext) => format!("{}.{}", stem, ext),
        None => stem,
    }
}

/// One step of the folder suffix policy
///
/// Only a whitespace-separated trailing number is replaced: `Photos 2` becomes
/// `Photos 3`, while `v2` becomes `v2 3`.
pub fn next_folder_name(name: &str) -> String {
    match trailing_number(name) {
        Some((start, n)) => {
            let head = &name[..start];
            let base = match head.chars().last() {
                Some(c) if c.is_whitespace() => &head[..head.len() - c.len_utf8()],
                _ => name,
            };
            format!("{} {}", base, n.saturating_add(1))
        }
        None => format!("{} 1", name),
    }
}

fn next_name(name: &str, kind: NameKind) -> String {
    match kind {
        NameKind::File => next_file_name(name),
        NameKind::Folder => next_folder_name(name),
    }
}

/// Existence probe; lookup failures count as "does not exist"
async fn exists(client: &dyn StorageClient, parent: &FileNode, name: &str) -> bool {
    match client.find_item(parent, name).await {
        Ok(found) => found.is_some(),
        Err(e) => {
            warn!(parent = %parent.path, name, error = %e, "Existence probe failed, assuming free");
            false
        }
    }
}

/// Apply the suffix policy until `desired` no longer collides inside `parent`
pub async fn resolve_unique_name(
    client: &dyn StorageClient,
    parent: &FileNode,
    desired: &str,
    kind: NameKind,
) -> String {
    let mut candidate = desired.to_string();
    while exists(client, parent, &candidate).await {
        candidate = next_name(&candidate, kind);
    }
    if candidate != desired {
        debug!(parent = %parent.path, desired, resolved = %candidate, "Renamed on collision");
    }
    candidate
}

/// Collision-free destination for an upload at `file_path`
///
/// The parent folder may not exist yet (dropped directories are created by
/// the upload itself); in that case the path is used as is.
pub async fn resolve_upload_path(client: &dyn StorageClient, file_path: &str) -> String {
    let (parent_path, file_name) = path::split_parent(file_path);
    let parent = match lookup_parent(client, parent_path).await {
        Ok(parent) => parent,
        Err(StorageError::NotFound(_)) => return file_path.to_string(),
        Err(e) => {
            warn!(path = %file_path, error = %e, "Parent lookup failed, keeping upload path");
            return file_path.to_string();
        }
    };
    let name = resolve_unique_name(client, &parent, file_name, NameKind::File).await;
    if name == file_name {
        file_path.to_string()
    } else {
        path::join(parent_path, &name)
    }
}

async fn lookup_parent(
    client: &dyn StorageClient,
    parent_path: &str,
) -> Result<FileNode, StorageError> {
    if parent_path.is_empty() {
        client.get_root_node().await
    } else {
        client.get_file_node(parent_path).await
    }
}
