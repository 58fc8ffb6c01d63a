mod state;
mod ui;

use crate::config::Config;
use crate::upload::{collect_selection, UploadClient, UploadCoordinator, UploadWorker};
use crate::utils::color::Palette;
use eframe::{egui, App};
pub use state::{ActionProgress, UploadState};
use std::path::PathBuf;
use std::sync::mpsc as std_mpsc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tracing::{info, warn};

const REPAINT_INTERVAL: Duration = Duration::from_millis(100);

pub struct FilesUploader {
    coordinator: UploadCoordinator,
    worker: UploadWorker,
    endpoint: String,
    runtime: Handle,
    state: UploadState,
    palette: Palette,
}

impl FilesUploader {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: &Config,
        client: UploadClient,
        runtime: Handle,
    ) -> Self {
        info!(endpoint = %client.endpoint(), "initializing file uploader");
        Self {
            coordinator: UploadCoordinator::new(config.max_file_size, config.copy_feedback()),
            endpoint: client.endpoint().to_string(),
            worker: UploadWorker::new(client),
            runtime,
            state: UploadState::default(),
            palette: Palette::default(),
        }
    }

    pub fn add_paths(&mut self, paths: Vec<PathBuf>) {
        if paths.is_empty() {
            return;
        }

        let selection = collect_selection(paths);
        self.state.error_message = match selection.unreadable.len() {
            0 => None,
            1 => Some(format!(
                "Could not read {}",
                selection.unreadable[0].0.display()
            )),
            n => Some(format!("Could not read {} selected files", n)),
        };

        info!(count = selection.files.len(), "files selected");
        self.coordinator.add_files(selection.files);
    }

    pub fn remove_file(&mut self, name: &str) {
        if let Some(file) = self.coordinator.remove_file(name) {
            info!(file = %file.name, "removed file");
        }
    }

    pub fn start_upload(&mut self) {
        let Some(jobs) = self.coordinator.begin_submit() else {
            return;
        };

        let (sender, receiver) = std_mpsc::channel();
        self.state.status_receiver = Some(receiver);
        self.state.progress = ActionProgress::start(jobs.len());
        self.state.error_message = None;

        self.worker.clone().spawn(&self.runtime, jobs, sender);
    }

    pub fn copy_url(&mut self, ctx: &egui::Context, name: &str) {
        if let Some(url) = self.coordinator.copy_result_url(name, Instant::now()) {
            ctx.output_mut(|o| o.copied_text = url);
        }
    }

    pub fn open_url(&mut self, url: &str) {
        if let Err(e) = open::that(url) {
            warn!(%url, error = %e, "failed to open link");
            self.state.error_message = Some(format!("Could not open {}", url));
        }
    }

    pub fn update_state(&mut self, ctx: &egui::Context) {
        let (dropped, hovered) = ctx.input(|i| {
            let dropped: Vec<PathBuf> = i
                .raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect();
            (dropped, !i.raw.hovered_files.is_empty())
        });
        self.state.drop_hovered = hovered;
        self.add_paths(dropped);

        for event in self.state.drain_events() {
            self.state.progress.observe(&event);
            self.coordinator.apply(event);
        }

        let copy_feedback_active = self.coordinator.expire_copy_feedback(Instant::now());
        if self.coordinator.is_submitting() || copy_feedback_active || hovered {
            ctx.request_repaint_after(REPAINT_INTERVAL);
        }
    }
}

impl App for FilesUploader {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state(ctx);
        self.render(ctx);
    }
}
