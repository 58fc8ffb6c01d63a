use crate::upload::{UploadEvent, UploadStatus};
use derivative::Derivative;
use std::sync::mpsc::{Receiver, TryRecvError};
use tracing::warn;

/// Summary of the current or last upload pass
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionProgress {
    NotStarted,
    Uploading {
        total: usize,
        current: usize,
        successful: usize,
        failed: usize,
    },
    Completed {
        total: usize,
        successful: usize,
        failed: usize,
    },
}

impl Default for ActionProgress {
    fn default() -> Self {
        Self::NotStarted
    }
}

impl ActionProgress {
    pub fn start(total: usize) -> Self {
        ActionProgress::Uploading {
            total,
            current: 0,
            successful: 0,
            failed: 0,
        }
    }

    pub fn observe(&mut self, event: &UploadEvent) {
        let ActionProgress::Uploading {
            total,
            current,
            successful,
            failed,
        } = self
        else {
            return;
        };

        match event {
            UploadEvent::Status(status) => match status.status {
                UploadStatus::Preparing => *current += 1,
                UploadStatus::Succeeded(_) => *successful += 1,
                UploadStatus::Rejected(_) | UploadStatus::Failed(_) => *failed += 1,
                UploadStatus::Uploading(_) => {}
                UploadStatus::Skipped => *total = total.saturating_sub(1),
                UploadStatus::Cancelled => {
                    *total = total.saturating_sub(1);
                    *current = current.saturating_sub(1);
                }
            },
            UploadEvent::Finished => {
                *self = ActionProgress::Completed {
                    total: *total,
                    successful: *successful,
                    failed: *failed,
                };
            }
        }
    }

    pub fn get_progress_percentage(&self) -> f32 {
        match self {
            ActionProgress::NotStarted => 0.0,
            ActionProgress::Uploading {
                total,
                successful,
                failed,
                ..
            } => {
                if *total == 0 {
                    0.0
                } else {
                    (successful + failed) as f32 / *total as f32
                }
            }
            ActionProgress::Completed { total, .. } => {
                if *total == 0 {
                    0.0
                } else {
                    1.0
                }
            }
        }
    }

    pub fn get_status_text(&self) -> String {
        match self {
            ActionProgress::NotStarted => String::new(),
            ActionProgress::Uploading {
                total,
                current,
                successful,
                failed,
            } => format!(
                "Progress: {}/{} files | ✅ Success: {} | ❌ Failed: {}",
                current, total, successful, failed
            ),
            ActionProgress::Completed {
                total,
                successful,
                failed,
            } => format!(
                "Final Status: {}/{} files | ✅ Success: {} | ❌ Failed: {}",
                successful + failed,
                total,
                successful,
                failed
            ),
        }
    }
}

#[derive(Derivative)]
#[derivative(Debug, Default)]
pub struct UploadState {
    pub progress: ActionProgress,
    pub error_message: Option<String>,
    pub drop_hovered: bool,
    #[derivative(Debug = "ignore")]
    pub status_receiver: Option<Receiver<UploadEvent>>,
}

impl UploadState {
    /// Takes every event the worker has sent so far. A worker that went away
    /// without reporting `Finished` is treated as finished.
    pub fn drain_events(&mut self) -> Vec<UploadEvent> {
        let Some(receiver) = &self.status_receiver else {
            return Vec::new();
        };

        let mut events = Vec::new();
        let mut finished = false;
        loop {
            match receiver.try_recv() {
                Ok(event) => {
                    finished |= event == UploadEvent::Finished;
                    events.push(event);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !finished {
                        warn!("upload worker stopped without finishing");
                        events.push(UploadEvent::Finished);
                        finished = true;
                    }
                    break;
                }
            }
        }

        if finished {
            self.status_receiver = None;
        }
        events
    }
}
