//! File table rows and size formatting

use crate::types::{Cid, CidInfo, NodeKind};
use serde::Serialize;

/// One row of the file table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub name: String,
    pub cid: Cid,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub size: u64,
    pub path: String,
}

impl From<&CidInfo> for TableRow {
    fn from(info: &CidInfo) -> Self {
        Self {
            name: info.name.clone(),
            cid: info.cid.clone(),
            kind: info.kind.unwrap_or(NodeKind::File),
            size: info.size,
            path: info.path.clone(),
        }
    }
}

/// Children of `info`: folders first, then files, each by name
pub fn table_rows(info: &CidInfo) -> Vec<TableRow> {
    let mut rows: Vec<TableRow> = info.links.iter().map(TableRow::from).collect();
    rows.sort_by(|a, b| {
        let rank = |k: NodeKind| matches!(k, NodeKind::File) as u8;
        rank(a.kind)
            .cmp(&rank(b.kind))
            .then_with(|| a.name.cmp(&b.name))
    });
    rows
}

const UNITS: [&str; 9] = ["Bytes", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Human readable size with at most two decimals (`1.5 KB`, `0 Bytes`)
pub fn format_bytes(size: u64) -> String {
    if size == 0 {
        return "0 Bytes".to_string();
    }
    let mut exponent = 0;
    let mut scaled = size;
    while scaled >= 1024 && exponent < UNITS.len() - 1 {
        scaled /= 1024;
        exponent += 1;
    }
    let value = size as f64 / 1024f64.powi(exponent as i32);
    let rendered = format!("{:.2}", value);
    let trimmed = rendered.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[exponent])
}
