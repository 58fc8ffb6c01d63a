//! Selection list, per-file rows and the submit control.
//!
//! Rows are keyed by file name: selecting a second file with a name already
//! listed adds it to the selection but not to the list. Only the selection a
//! row was created for is ever uploaded under that row.

use crate::error::UploadError;
use crate::upload::types::{
    FileId, FileRow, FileStatus, RowStatus, SelectedFile, UploadEvent, UploadJob, UploadStatus,
};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmitControl {
    pub visible: bool,
    pub enabled: bool,
}

#[derive(Debug)]
pub struct UploadCoordinator {
    max_file_size: u64,
    copy_feedback: Duration,
    files: Vec<SelectedFile>,
    rows: Vec<FileRow>,
    submit: SubmitControl,
    in_flight: HashMap<FileId, CancellationToken>,
    submitting: bool,
}

impl UploadCoordinator {
    pub fn new(max_file_size: u64, copy_feedback: Duration) -> Self {
        Self {
            max_file_size,
            copy_feedback,
            files: Vec::new(),
            rows: Vec::new(),
            submit: SubmitControl {
                visible: false,
                enabled: true,
            },
            in_flight: HashMap::new(),
            submitting: false,
        }
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    pub fn rows(&self) -> &[FileRow] {
        &self.rows
    }

    pub fn row(&self, name: &str) -> Option<&FileRow> {
        self.rows.iter().find(|row| row.name == name)
    }

    pub fn submit_control(&self) -> SubmitControl {
        self.submit
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    fn row_mut(&mut self, name: &str) -> Option<&mut FileRow> {
        self.rows.iter_mut().find(|row| row.name == name)
    }

    pub fn add_files(&mut self, new_files: Vec<SelectedFile>) {
        self.files.extend(new_files);

        for file in &self.files {
            if self.rows.iter().any(|row| row.name == file.name) {
                continue;
            }

            let mut row = FileRow::for_file(file);
            if file.size > self.max_file_size {
                let err = UploadError::OversizeFile {
                    size: file.size,
                    limit: self.max_file_size,
                };
                row.reject(err.to_string());
            }
            debug!(file = %file.name, size = file.size, status = %row.status, "listed file");
            self.rows.push(row);
        }

        self.submit.visible = self.files.iter().any(|f| f.size <= self.max_file_size);
    }

    /// Drops the row and the selection it was created for. A queued or
    /// in-flight upload of that selection is cancelled.
    pub fn remove_file(&mut self, name: &str) -> Option<SelectedFile> {
        let index = self.rows.iter().position(|row| row.name == name)?;
        let row = self.rows.remove(index);

        if let Some(token) = self.in_flight.remove(&row.file_id) {
            debug!(file = %row.name, "cancelling upload of removed file");
            token.cancel();
        }

        let removed = self
            .files
            .iter()
            .position(|f| f.id == row.file_id)
            .map(|i| self.files.remove(i));

        if self.files.is_empty() {
            self.submit.visible = false;
        }
        removed
    }

    /// Files that a submit would upload, in selection order
    pub fn pending(&self) -> Vec<&SelectedFile> {
        self.files
            .iter()
            .filter(|file| self.is_pending(file))
            .collect()
    }

    fn is_pending(&self, file: &SelectedFile) -> bool {
        file.size <= self.max_file_size
            && self.row(&file.name).is_some_and(|row| {
                row.file_id == file.id && !row.uploaded && row.error_message.is_none()
            })
    }

    /// Starts a pass over the pending files. Returns `None` when a pass is
    /// already running or nothing is pending.
    pub fn begin_submit(&mut self) -> Option<Vec<UploadJob>> {
        if self.submitting {
            return None;
        }

        let jobs: Vec<UploadJob> = self
            .pending()
            .into_iter()
            .map(|file| UploadJob {
                file: file.clone(),
                cancel: CancellationToken::new(),
            })
            .collect();

        if jobs.is_empty() {
            self.submit.enabled = true;
            return None;
        }

        info!(count = jobs.len(), "starting upload pass");
        self.submitting = true;
        self.submit.enabled = false;
        self.in_flight = jobs
            .iter()
            .map(|job| (job.file.id, job.cancel.clone()))
            .collect();
        Some(jobs)
    }

    pub fn finish_submit(&mut self) {
        self.submitting = false;
        self.submit.enabled = true;
        self.in_flight.clear();

        let any_pending = self.files.iter().any(|f| self.is_pending(f));
        if !any_pending {
            self.submit.visible = false;
        }
        info!(pending = any_pending, "upload pass finished");
    }

    pub fn apply(&mut self, event: UploadEvent) {
        match event {
            UploadEvent::Status(status) => self.apply_status(status),
            UploadEvent::Finished => self.finish_submit(),
        }
    }

    fn apply_status(&mut self, event: FileStatus) {
        let Some(row) = self.row_mut(&event.name) else {
            debug!(file = %event.name, "ignoring event for removed row");
            return;
        };
        if row.file_id != event.file_id {
            debug!(file = %event.name, id = %event.file_id, "ignoring event for replaced row");
            return;
        }
        // TooLarge, Failed and Complete are terminal
        if row.status.is_error() || row.uploaded {
            debug!(file = %event.name, status = %row.status, "ignoring event for settled row");
            return;
        }

        match event.status {
            UploadStatus::Preparing => {
                row.status = RowStatus::Preparing;
                row.progress = 0;
            }
            UploadStatus::Uploading(percent) => {
                let percent = percent.min(100);
                row.status = RowStatus::Uploading(percent);
                row.progress = percent;
            }
            UploadStatus::Succeeded(url) => {
                row.status = RowStatus::Complete;
                row.progress = 100;
                row.uploaded = true;
                row.result_url = Some(url);
            }
            UploadStatus::Rejected(message) => row.reject(message),
            UploadStatus::Failed(message) => row.fail(message),
            UploadStatus::Skipped | UploadStatus::Cancelled => {}
        }
    }

    /// URL to place on the clipboard; starts the confirmation window
    pub fn copy_result_url(&mut self, name: &str, now: Instant) -> Option<String> {
        let row = self.row_mut(name)?;
        let url = row.result_url.clone()?;
        row.copied_at = Some(now);
        Some(url)
    }

    pub fn is_showing_copied(&self, name: &str, now: Instant) -> bool {
        self.row(name)
            .and_then(|row| row.copied_at)
            .is_some_and(|at| now.saturating_duration_since(at) < self.copy_feedback)
    }

    /// Clears elapsed confirmations. Returns true while any is still showing.
    pub fn expire_copy_feedback(&mut self, now: Instant) -> bool {
        let window = self.copy_feedback;
        let mut any_active = false;
        for row in &mut self.rows {
            if let Some(at) = row.copied_at {
                if now.saturating_duration_since(at) >= window {
                    row.copied_at = None;
                } else {
                    any_active = true;
                }
            }
        }
        any_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_COPY_FEEDBACK_MS, DEFAULT_MAX_FILE_SIZE};

    const GIB: u64 = 1024 * 1024 * 1024;

    fn coordinator() -> UploadCoordinator {
        UploadCoordinator::new(
            DEFAULT_MAX_FILE_SIZE,
            Duration::from_millis(DEFAULT_COPY_FEEDBACK_MS),
        )
    }

    fn file(name: &str, size: u64) -> SelectedFile {
        SelectedFile::new(name, size, format!("/tmp/{}", name))
    }

    fn status(file: &SelectedFile, status: UploadStatus) -> UploadEvent {
        UploadEvent::status(file, status)
    }

    #[test]
    fn test_small_file_shows_submit() {
        let mut c = coordinator();
        c.add_files(vec![file("a.txt", 10)]);

        assert!(c.submit_control().visible);
        assert!(c.submit_control().enabled);
        assert_eq!(c.row("a.txt").unwrap().status, RowStatus::Ready);
    }

    #[test]
    fn test_only_oversize_file_keeps_submit_hidden() {
        let mut c = coordinator();
        c.add_files(vec![file("movie.mkv", 6 * GIB)]);

        assert!(!c.submit_control().visible);
        let row = c.row("movie.mkv").unwrap();
        assert_eq!(row.status, RowStatus::TooLarge);
        assert_eq!(
            row.error_message.as_deref(),
            Some("File size exceeds 5 GB limit")
        );
    }

    #[test]
    fn test_one_byte_over_limit_is_never_pending() {
        let mut c = coordinator();
        c.add_files(vec![file("big.iso", DEFAULT_MAX_FILE_SIZE + 1)]);

        let row = c.row("big.iso").unwrap();
        assert_eq!(row.status, RowStatus::TooLarge);
        assert!(!row.error_message.as_deref().unwrap_or_default().is_empty());
        assert!(c.pending().is_empty());
        assert!(c.begin_submit().is_none());
    }

    #[test]
    fn test_exactly_at_limit_is_accepted() {
        let mut c = coordinator();
        c.add_files(vec![file("edge.bin", DEFAULT_MAX_FILE_SIZE)]);
        assert_eq!(c.row("edge.bin").unwrap().status, RowStatus::Ready);
        assert_eq!(c.pending().len(), 1);
    }

    #[test]
    fn test_removing_only_file_hides_submit() {
        let mut c = coordinator();
        c.add_files(vec![file("a.txt", 10)]);
        let removed = c.remove_file("a.txt").unwrap();

        assert_eq!(removed.name, "a.txt");
        assert!(c.rows().is_empty());
        assert!(c.files().is_empty());
        assert!(!c.submit_control().visible);
    }

    #[test]
    fn test_removing_one_of_two_keeps_submit() {
        let mut c = coordinator();
        c.add_files(vec![file("a.txt", 10), file("b.txt", 20)]);
        c.remove_file("a.txt");

        assert!(c.submit_control().visible);
        assert_eq!(c.rows().len(), 1);
        assert!(c.remove_file("missing.txt").is_none());
    }

    #[test]
    fn test_duplicate_name_keeps_single_row() {
        let mut c = coordinator();
        let first = file("a.txt", 10);
        let first_id = first.id;
        c.add_files(vec![first]);
        c.add_files(vec![file("a.txt", 99)]);

        assert_eq!(c.rows().len(), 1);
        assert_eq!(c.files().len(), 2);
        let row = c.row("a.txt").unwrap();
        assert_eq!(row.file_id, first_id);
        assert_eq!(row.size, 10);

        let pending = c.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, first_id);
    }

    #[test]
    fn test_duplicate_gets_row_after_original_removed() {
        let mut c = coordinator();
        let second = file("a.txt", 99);
        let second_id = second.id;
        c.add_files(vec![file("a.txt", 10)]);
        c.add_files(vec![second]);

        c.remove_file("a.txt");
        assert!(c.rows().is_empty());
        assert_eq!(c.files().len(), 1);
        // Survives in the selection and is listed again on the next add
        c.add_files(vec![file("b.txt", 1)]);
        assert_eq!(c.row("a.txt").unwrap().file_id, second_id);
    }

    #[test]
    fn test_pending_preserves_selection_order() {
        let mut c = coordinator();
        c.add_files(vec![file("c.txt", 1), file("a.txt", 1)]);
        c.add_files(vec![file("b.txt", 1)]);

        let names: Vec<_> = c.pending().iter().map(|f| f.name.clone()).collect();
        assert_eq!(names, ["c.txt", "a.txt", "b.txt"]);
    }

    #[test]
    fn test_submit_with_nothing_pending_is_noop() {
        let mut c = coordinator();
        assert!(c.begin_submit().is_none());
        assert!(c.submit_control().enabled);
        assert!(!c.is_submitting());
    }

    #[test]
    fn test_submit_disables_then_hides_when_done() {
        let mut c = coordinator();
        let a = file("a.txt", 100);
        c.add_files(vec![a.clone()]);

        let jobs = c.begin_submit().unwrap();
        assert_eq!(jobs.len(), 1);
        assert!(!c.submit_control().enabled);
        assert!(c.begin_submit().is_none());

        c.apply(status(&a, UploadStatus::Preparing));
        assert_eq!(c.row("a.txt").unwrap().status, RowStatus::Preparing);
        c.apply(status(&a, UploadStatus::Uploading(40)));
        let row = c.row("a.txt").unwrap();
        assert_eq!(row.status, RowStatus::Uploading(40));
        assert_eq!(row.progress, 40);

        c.apply(status(&a, UploadStatus::Succeeded("https://x/y".into())));
        c.apply(UploadEvent::Finished);

        let row = c.row("a.txt").unwrap();
        assert_eq!(row.status, RowStatus::Complete);
        assert_eq!(row.progress, 100);
        assert!(row.uploaded);
        assert_eq!(row.result_url.as_deref(), Some("https://x/y"));
        assert!(c.submit_control().enabled);
        assert!(!c.submit_control().visible);
    }

    #[test]
    fn test_failed_row_is_not_retried() {
        let mut c = coordinator();
        let a = file("a.txt", 100);
        c.add_files(vec![a.clone()]);

        c.begin_submit().unwrap();
        c.apply(status(&a, UploadStatus::Preparing));
        c.apply(status(&a, UploadStatus::Failed("disk full".into())));
        c.apply(UploadEvent::Finished);

        let row = c.row("a.txt").unwrap();
        assert_eq!(row.status, RowStatus::Failed);
        assert_eq!(row.error_message.as_deref(), Some("disk full"));
        assert!(!row.uploaded);
        assert!(c.pending().is_empty());
        assert!(!c.submit_control().visible);
        assert!(c.begin_submit().is_none());
    }

    #[test]
    fn test_failed_row_never_moves_to_uploading() {
        let mut c = coordinator();
        let a = file("a.txt", 100);
        c.add_files(vec![a.clone()]);
        c.begin_submit().unwrap();
        c.apply(status(&a, UploadStatus::Failed("boom".into())));
        c.apply(status(&a, UploadStatus::Uploading(50)));
        c.apply(status(&a, UploadStatus::Succeeded("https://late".into())));

        let row = c.row("a.txt").unwrap();
        assert_eq!(row.status, RowStatus::Failed);
        assert!(row.result_url.is_none());
    }

    #[test]
    fn test_rejected_at_upload_time_marks_too_large() {
        let mut c = coordinator();
        let a = file("a.txt", 100);
        c.add_files(vec![a.clone()]);
        c.begin_submit().unwrap();
        c.apply(status(
            &a,
            UploadStatus::Rejected("File size exceeds 5 GB limit".into()),
        ));

        let row = c.row("a.txt").unwrap();
        assert_eq!(row.status, RowStatus::TooLarge);
        assert!(row.error_message.is_some());
    }

    #[test]
    fn test_one_failure_keeps_other_files_pending_state() {
        let mut c = coordinator();
        let a = file("a.txt", 1);
        let b = file("b.txt", 1);
        c.add_files(vec![a.clone(), b.clone()]);

        c.begin_submit().unwrap();
        c.apply(status(&a, UploadStatus::Failed("nope".into())));
        c.apply(status(&b, UploadStatus::Succeeded("https://x/b".into())));
        c.apply(UploadEvent::Finished);

        assert_eq!(c.row("a.txt").unwrap().status, RowStatus::Failed);
        assert_eq!(c.row("b.txt").unwrap().status, RowStatus::Complete);
    }

    #[test]
    fn test_new_file_after_pass_reappears_pending() {
        let mut c = coordinator();
        let a = file("a.txt", 1);
        c.add_files(vec![a.clone()]);
        c.begin_submit().unwrap();
        c.apply(status(&a, UploadStatus::Succeeded("https://x/a".into())));
        c.apply(UploadEvent::Finished);
        assert!(!c.submit_control().visible);

        c.add_files(vec![file("b.txt", 1)]);
        assert!(c.submit_control().visible);
        let names: Vec<_> = c.pending().iter().map(|f| f.name.clone()).collect();
        assert_eq!(names, ["b.txt"]);
    }

    #[test]
    fn test_remove_cancels_queued_upload_and_ignores_late_events() {
        let mut c = coordinator();
        let a = file("a.txt", 1);
        c.add_files(vec![a.clone()]);

        let jobs = c.begin_submit().unwrap();
        c.apply(status(&a, UploadStatus::Preparing));
        c.remove_file("a.txt");
        assert!(jobs[0].cancel.is_cancelled());

        c.apply(status(&a, UploadStatus::Uploading(80)));
        c.apply(status(&a, UploadStatus::Succeeded("https://x/a".into())));
        assert!(c.row("a.txt").is_none());
    }

    #[test]
    fn test_late_event_does_not_touch_reused_name() {
        let mut c = coordinator();
        let old = file("a.txt", 1);
        c.add_files(vec![old.clone()]);
        c.begin_submit().unwrap();
        c.remove_file("a.txt");

        let new = file("a.txt", 2);
        c.add_files(vec![new]);
        c.apply(status(&old, UploadStatus::Succeeded("https://x/old".into())));

        let row = c.row("a.txt").unwrap();
        assert_eq!(row.status, RowStatus::Ready);
        assert!(row.result_url.is_none());
    }

    #[test]
    fn test_copy_feedback_lasts_one_and_a_half_seconds() {
        let mut c = coordinator();
        let a = file("a.txt", 1);
        c.add_files(vec![a.clone()]);
        c.begin_submit().unwrap();
        c.apply(status(&a, UploadStatus::Succeeded("https://x/y".into())));

        let start = Instant::now();
        assert_eq!(
            c.copy_result_url("a.txt", start).as_deref(),
            Some("https://x/y")
        );
        assert!(c.is_showing_copied("a.txt", start));
        assert!(c.is_showing_copied("a.txt", start + Duration::from_millis(1499)));
        assert!(c.expire_copy_feedback(start + Duration::from_millis(1000)));

        let later = start + Duration::from_millis(1500);
        assert!(!c.is_showing_copied("a.txt", later));
        assert!(!c.expire_copy_feedback(later));
        assert!(c.row("a.txt").unwrap().copied_at.is_none());
    }

    #[test]
    fn test_copy_without_url_does_nothing() {
        let mut c = coordinator();
        c.add_files(vec![file("a.txt", 1)]);
        let now = Instant::now();
        assert!(c.copy_result_url("a.txt", now).is_none());
        assert!(!c.is_showing_copied("a.txt", now));
        assert!(c.copy_result_url("missing.txt", now).is_none());
    }
}
