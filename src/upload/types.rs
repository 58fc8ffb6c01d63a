use crate::utils::file_kind::FileKind;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Identity of one selection, unique for the life of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(u64);

impl FileId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file-{}", self.0)
    }
}

/// A file picked or dropped by the user
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub id: FileId,
    pub name: String,
    pub size: u64,
    pub path: PathBuf,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, size: u64, path: impl Into<PathBuf>) -> Self {
        Self {
            id: FileId::next(),
            name: name.into(),
            size,
            path: path.into(),
        }
    }

    pub fn from_path(path: &Path) -> io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        let name = path
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?
            .to_string_lossy()
            .to_string();
        Ok(Self::new(name, metadata.len(), path))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    Ready,
    TooLarge,
    Preparing,
    Uploading(u8),
    Complete,
    Failed,
}

impl RowStatus {
    pub fn is_error(self) -> bool {
        matches!(self, RowStatus::TooLarge | RowStatus::Failed)
    }
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowStatus::Ready => write!(f, "Ready"),
            RowStatus::TooLarge => write!(f, "Too Large"),
            RowStatus::Preparing => write!(f, "Preparing..."),
            RowStatus::Uploading(percent) => write!(f, "Uploading... {}%", percent),
            RowStatus::Complete => write!(f, "Complete"),
            RowStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// View state of one listed file
#[derive(Debug, Clone)]
pub struct FileRow {
    pub file_id: FileId,
    pub name: String,
    pub size: u64,
    pub kind: FileKind,
    pub status: RowStatus,
    pub error_message: Option<String>,
    pub uploaded: bool,
    pub result_url: Option<String>,
    pub progress: u8,
    pub copied_at: Option<Instant>,
}

impl FileRow {
    pub fn for_file(file: &SelectedFile) -> Self {
        Self {
            file_id: file.id,
            name: file.name.clone(),
            size: file.size,
            kind: FileKind::from_name(&file.name),
            status: RowStatus::Ready,
            error_message: None,
            uploaded: false,
            result_url: None,
            progress: 0,
            copied_at: None,
        }
    }

    pub(crate) fn reject(&mut self, message: String) {
        self.status = RowStatus::TooLarge;
        self.error_message = Some(message);
    }

    pub(crate) fn fail(&mut self, message: String) {
        self.status = RowStatus::Failed;
        self.error_message = Some(message);
    }
}

/// One queued upload handed to the worker
#[derive(Debug, Clone)]
pub struct UploadJob {
    pub file: SelectedFile,
    pub cancel: CancellationToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    Preparing,
    Uploading(u8),
    Succeeded(String),
    Rejected(String),
    Failed(String),
    /// Removed while queued; never sent
    Skipped,
    /// Removed while its request was in flight
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStatus {
    pub file_id: FileId,
    pub name: String,
    pub status: UploadStatus,
}

/// Message from the upload worker to the UI thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    Status(FileStatus),
    Finished,
}

impl UploadEvent {
    pub fn status(file: &SelectedFile, status: UploadStatus) -> Self {
        UploadEvent::Status(FileStatus {
            file_id: file.id,
            name: file.name.clone(),
            status,
        })
    }
}
