//! Upload queue state and the sequential submit

use super::cancel::CancelHandle;
use super::pagination::{get_pagination, page_count, PageButton, ITEMS_PER_PAGE};
use super::{FileRecord, FileStatus, QueueView, StatusCounts};
use crate::error::{ApiError, StorageError};
use crate::resolve::resolve_upload_path;
use crate::store::StorageClient;
use crate::types::{Cid, UploadFile};
use serde::Serialize;
use tracing::{debug, error, info, warn};

/// Result of a committed batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadOutcome {
    /// Root CID after the batch was applied
    pub root_cid: Cid,
    /// Collision-free destination of every transferred record, in queue order
    pub paths: Vec<String>,
}

enum Interrupt {
    Cancelled,
    Failed { index: usize, source: StorageError },
}

/// Upload queue for one modal session
#[derive(Debug)]
pub struct UploadQueue {
    records: Vec<FileRecord>,
    filter: FileStatus,
    /// 1-based
    current_page: usize,
    /// Narrow layout: no pagination, the whole filtered list is shown
    compact: bool,
    /// Single mode keeps at most one record
    multiple: bool,
    /// Folder the queued paths are resolved against (`""` for the root)
    folder_path: String,
    cancel: CancelHandle,
}

impl Default for UploadQueue {
    fn default() -> Self {
        Self::new(true)
    }
}

impl UploadQueue {
    pub fn new(multiple: bool) -> Self {
        Self {
            records: Vec::new(),
            filter: FileStatus::Listed,
            current_page: 1,
            compact: false,
            multiple,
            folder_path: String::new(),
            cancel: CancelHandle::new(),
        }
    }

    /// Open the queue for `folder_path`, optionally seeded with files
    pub fn show(&mut self, folder_path: &str, files: Vec<UploadFile>) {
        self.folder_path = folder_path.trim_end_matches('/').to_string();
        self.current_page = 1;
        self.add_files(files);
    }

    /// Drop every record and return to the drop zone
    pub fn reset(&mut self) {
        self.records.clear();
        self.filter = FileStatus::Listed;
        self.current_page = 1;
        self.cancel.clear();
    }

    /// Append records in order; names are not deduplicated here
    ///
    /// In single mode the latest file replaces whatever was queued.
    pub fn add_files(&mut self, files: Vec<UploadFile>) -> usize {
        if !self.multiple {
            let Some(latest) = files.into_iter().last() else {
                return 0;
            };
            self.records.clear();
            self.records.push(FileRecord::new(latest));
            self.current_page = 1;
            debug!(path = %self.records[0].file.path, "Queued single file");
            return 1;
        }
        let added = files.len();
        self.records.extend(files.into_iter().map(FileRecord::new));
        if added > 0 {
            debug!(added, total = self.records.len(), "Queued files");
        }
        added
    }

    /// Remove the record at `index` (queue order)
    pub fn remove_file(&mut self, index: usize) -> Option<FileRecord> {
        if index >= self.records.len() {
            return None;
        }
        let removed = self.records.remove(index);
        self.clamp_page();
        Some(removed)
    }

    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn view(&self) -> QueueView {
        if self.records.is_empty() {
            QueueView::DropZone
        } else {
            QueueView::FileList
        }
    }

    pub fn folder_path(&self) -> &str {
        &self.folder_path
    }

    pub fn filter(&self) -> FileStatus {
        self.filter
    }

    /// Change the status filter; records are untouched
    pub fn set_filter(&mut self, filter: FileStatus) {
        self.filter = filter;
        self.current_page = 1;
    }

    /// Records passing the filter, with their queue index
    pub fn filtered(&self) -> Vec<(usize, &FileRecord)> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.matches(self.filter))
            .collect()
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts {
            all: self.records.len(),
            ..Default::default()
        };
        for record in &self.records {
            match record.status {
                FileStatus::Listed => counts.pending += 1,
                FileStatus::Success => counts.success += 1,
                FileStatus::Failed => counts.failed += 1,
                FileStatus::Uploading => counts.uploading += 1,
            }
        }
        counts
    }

    /// Bulk clear for the current filter, returning how many records went
    ///
    /// Under `Listed` everything except in-flight records is removed; under
    /// `Uploading` nothing is.
    pub fn clear_filtered(&mut self) -> usize {
        let before = self.records.len();
        match self.filter {
            FileStatus::Listed => self.records.retain(|r| r.status == FileStatus::Uploading),
            FileStatus::Success | FileStatus::Failed => {
                let filter = self.filter;
                self.records.retain(|r| r.status != filter);
            }
            FileStatus::Uploading => {}
        }
        self.clamp_page();
        before - self.records.len()
    }

    /// Abort the in-flight transfer and revert uploading records
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        self.revert_uploading();
    }

    /// Handle that cancels a running `submit` from outside the queue
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    pub fn is_compact(&self) -> bool {
        self.compact
    }

    pub fn set_compact(&mut self, compact: bool) {
        self.compact = compact;
    }

    pub fn num_pages(&self) -> usize {
        page_count(self.filtered().len())
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Move to `page`; out-of-range pages are ignored
    pub fn set_current_page(&mut self, page: usize) -> bool {
        if page >= 1 && page <= self.num_pages() {
            self.current_page = page;
            true
        } else {
            false
        }
    }

    /// Records rendered for the current page
    pub fn page(&self) -> Vec<(usize, &FileRecord)> {
        let filtered = self.filtered();
        if self.compact {
            return filtered;
        }
        filtered
            .into_iter()
            .skip((self.current_page - 1) * ITEMS_PER_PAGE)
            .take(ITEMS_PER_PAGE)
            .collect()
    }

    /// Pagination controls; none in compact mode
    pub fn page_buttons(&self) -> Vec<PageButton> {
        if self.compact {
            return Vec::new();
        }
        get_pagination(self.current_page, self.num_pages())
    }

    fn clamp_page(&mut self) {
        let pages = self.num_pages().max(1);
        if self.current_page > pages {
            self.current_page = pages;
        }
    }

    /// Revert records whose staged transfer was dropped by a client reset
    ///
    /// Returns how many records went back to pending.
    pub fn discard_staged(&mut self) -> usize {
        let mut reverted = 0;
        for record in self.records.iter_mut().filter(|r| r.staged) {
            record.unstage(FileStatus::Listed);
            reverted += 1;
        }
        if reverted > 0 {
            debug!(reverted, "Staged records returned to pending");
        }
        reverted
    }

    fn revert_uploading(&mut self) {
        for record in self
            .records
            .iter_mut()
            .filter(|r| r.status == FileStatus::Uploading)
        {
            record.status = FileStatus::Listed;
            record.percentage = 0;
        }
    }

    /// Upload every record that has not succeeded yet, then commit once
    ///
    /// Records are transferred strictly in queue order. A transfer failure
    /// marks that record failed and stops the batch without committing;
    /// records transferred before it stay staged in the client. Cancelling
    /// resets the client, which discards every staged record including those
    /// left over from an earlier failed batch, and returns them to pending.
    pub async fn submit(
        &mut self,
        client: Option<&dyn StorageClient>,
    ) -> Result<UploadOutcome, ApiError> {
        if self.records.is_empty() {
            return Err(ApiError::QueueEmpty);
        }
        let client = client.ok_or(ApiError::StorageNotBound)?;
        let batch: Vec<usize> = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.status != FileStatus::Success)
            .map(|(i, _)| i)
            .collect();
        if batch.is_empty() {
            return Err(ApiError::QueueEmpty);
        }

        self.cancel.clear();
        let cancel = self.cancel.clone();
        info!(files = batch.len(), folder = %self.folder_path, "Submitting upload batch");

        let mut paths = Vec::with_capacity(batch.len());
        let interrupted = tokio::select! {
            biased;
            _ = cancel.cancelled() => Some(Interrupt::Cancelled),
            result = self.transfer(client, &batch, &mut paths) => result.err(),
        };

        match interrupted {
            None => {}
            Some(Interrupt::Cancelled) => {
                warn!(transferred = paths.len(), "Upload batch cancelled, discarding staged files");
                if let Err(e) = client.reset().await {
                    error!(error = %e, "Failed to discard staged files");
                }
                self.revert_uploading();
                self.discard_staged();
                return Err(ApiError::Cancelled);
            }
            Some(Interrupt::Failed { index, source }) => {
                error!(index, path = %self.records[index].file.path, error = %source, "Upload failed");
                return Err(ApiError::UploadFailed { index, source });
            }
        }

        let root_cid = match client.apply_updates().await {
            Ok(cid) => cid,
            Err(e) => {
                error!(error = %e, "Failed to apply uploaded files");
                for record in self.records.iter_mut().filter(|r| r.staged) {
                    record.unstage(FileStatus::Failed);
                }
                return Err(e.into());
            }
        };
        for record in &mut self.records {
            record.staged = false;
        }
        info!(root = %root_cid, files = paths.len(), "Upload batch committed");
        Ok(UploadOutcome { root_cid, paths })
    }

    async fn transfer(
        &mut self,
        client: &dyn StorageClient,
        batch: &[usize],
        paths: &mut Vec<String>,
    ) -> Result<(), Interrupt> {
        for &index in batch {
            let desired = format!("{}{}", self.folder_path, self.records[index].file.path);
            let destination = resolve_upload_path(client, &desired).await;

            let record = &mut self.records[index];
            record.status = FileStatus::Uploading;
            record.percentage = 0;
            match client.add_file(&destination, &record.file).await {
                Ok(node) => {
                    record.percentage = 100;
                    record.status = FileStatus::Success;
                    record.staged = true;
                    debug!(path = %destination, cid = %node.cid, "Transferred file");
                    paths.push(destination);
                }
                Err(source) => {
                    record.status = FileStatus::Failed;
                    record.percentage = 0;
                    return Err(Interrupt::Failed { index, source });
                }
            }
        }
        Ok(())
    }
}
