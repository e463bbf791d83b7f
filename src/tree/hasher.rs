//! CID computation for files and directories
//!
//! Files hash their raw bytes; directories hash their sorted `(name, cid)`
//! links, so a change anywhere below a directory changes its CID and every
//! ancestor's.

use crate::types::Cid;

const FILE_PREFIX: &str = "bafk";
const DIR_PREFIX: &str = "bafy";

/// Compute the CID of a raw file
pub fn compute_file_cid(content: &[u8]) -> Cid {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"file\0");
    hasher.update(content);
    format!("{}{}", FILE_PREFIX, hex::encode(hasher.finalize().as_bytes()))
}

/// Compute the CID of a directory from its links
///
/// `links` must be sorted by name; the in-memory store keeps children in a
/// `BTreeMap` so this holds for every caller.
pub fn compute_dir_cid<'a>(links: impl IntoIterator<Item = (&'a str, &'a str)>) -> Cid {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"dir\0");
    for (name, cid) in links {
        hasher.update(name.as_bytes());
        hasher.update(b"\0");
        hasher.update(cid.as_bytes());
        hasher.update(b"\n");
    }
    format!("{}{}", DIR_PREFIX, hex::encode(hasher.finalize().as_bytes()))
}
