mod client;
mod coordinator;
mod selection;
mod types;
mod worker;

pub use client::{error_detail, parse_success_body, percent_complete, ProgressFn, UploadClient};
pub use coordinator::{SubmitControl, UploadCoordinator};
pub use selection::{collect_selection, Selection};
pub use types::{
    FileId, FileRow, FileStatus, RowStatus, SelectedFile, UploadEvent, UploadJob, UploadStatus,
};
pub use worker::UploadWorker;
