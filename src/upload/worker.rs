use crate::error::UploadError;
use crate::upload::client::{ProgressFn, UploadClient};
use crate::upload::types::{UploadEvent, UploadJob, UploadStatus};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// Uploads a queue of files one at a time, reporting over a channel.
#[derive(Clone)]
pub struct UploadWorker {
    client: UploadClient,
}

impl UploadWorker {
    pub fn new(client: UploadClient) -> Self {
        Self { client }
    }

    /// Detached; the UI learns the worker is gone when the channel closes.
    pub fn spawn(self, runtime: &Handle, jobs: Vec<UploadJob>, events: Sender<UploadEvent>) {
        runtime.spawn(async move { self.run(jobs, events).await });
    }

    /// Each upload is awaited to completion before the next one starts.
    /// Always ends with `UploadEvent::Finished`.
    pub async fn run(&self, jobs: Vec<UploadJob>, events: Sender<UploadEvent>) {
        let total = jobs.len();
        let mut succeeded = 0;

        for job in jobs {
            let file = &job.file;
            if job.cancel.is_cancelled() {
                debug!(file = %file.name, "skipping removed file");
                events
                    .send(UploadEvent::status(file, UploadStatus::Skipped))
                    .unwrap_or_default();
                continue;
            }

            events
                .send(UploadEvent::status(file, UploadStatus::Preparing))
                .unwrap_or_default();

            let progress_events = events.clone();
            let progress_file = file.clone();
            let on_progress: ProgressFn = Arc::new(move |percent: u8| {
                progress_events
                    .send(UploadEvent::status(
                        &progress_file,
                        UploadStatus::Uploading(percent),
                    ))
                    .unwrap_or_default();
            });

            let status = match self.client.upload_file(file, &job.cancel, on_progress).await {
                Ok(url) => {
                    info!(file = %file.name, %url, "upload complete");
                    succeeded += 1;
                    UploadStatus::Succeeded(url)
                }
                Err(UploadError::Cancelled) => {
                    debug!(file = %file.name, "upload cancelled");
                    UploadStatus::Cancelled
                }
                Err(e) if e.is_oversize() => {
                    warn!(file = %file.name, error = %e, "refusing oversize file");
                    UploadStatus::Rejected(e.to_string())
                }
                Err(e) => {
                    warn!(file = %file.name, error = ?e, "upload failed");
                    UploadStatus::Failed(e.to_string())
                }
            };
            events
                .send(UploadEvent::status(file, status))
                .unwrap_or_default();
        }

        info!(total, succeeded, "upload queue drained");
        events.send(UploadEvent::Finished).unwrap_or_default();
    }
}
