//! Upload queue
//!
//! Client-side bookkeeping for one upload modal session: the records dropped
//! or picked by the user, their status, the status filter, pagination, and
//! the sequential submit that hands bytes to the storage client.

pub mod cancel;
pub mod pagination;
pub mod queue;

pub use cancel::CancelHandle;
pub use pagination::{get_pagination, PageButton, ITEMS_PER_PAGE};
pub use queue::{UploadOutcome, UploadQueue};

use crate::types::UploadFile;
use serde::Serialize;
use std::fmt;

/// Status of a queued record
///
/// `Listed` is both the pending state of a record that has not been submitted
/// and the "show all" filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    #[default]
    Listed,
    Success,
    Failed,
    Uploading,
}

impl FileStatus {
    pub const ALL: [FileStatus; 4] = [
        FileStatus::Listed,
        FileStatus::Success,
        FileStatus::Failed,
        FileStatus::Uploading,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Listed => "listed",
            FileStatus::Success => "success",
            FileStatus::Failed => "failed",
            FileStatus::Uploading => "uploading",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the upload queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub file: UploadFile,
    pub status: FileStatus,
    /// Transfer progress, 0-100
    pub percentage: u8,
    /// Transferred to the client but not committed yet
    pub(crate) staged: bool,
}

impl FileRecord {
    pub fn new(file: UploadFile) -> Self {
        Self {
            file,
            status: FileStatus::Listed,
            percentage: 0,
            staged: false,
        }
    }

    pub fn is_staged(&self) -> bool {
        self.staged
    }

    fn unstage(&mut self, status: FileStatus) {
        self.status = status;
        self.percentage = 0;
        self.staged = false;
    }

    /// Whether the record passes `filter`
    pub fn matches(&self, filter: FileStatus) -> bool {
        filter == FileStatus::Listed || self.status == filter
    }
}

/// Record counts shown on the filter bar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    /// Every record (the `Listed` filter)
    pub all: usize,
    /// Records not yet submitted
    pub pending: usize,
    pub success: usize,
    pub failed: usize,
    pub uploading: usize,
}

/// Which surface the modal shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueView {
    DropZone,
    FileList,
}
