use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;
use files_uploader::app::FilesUploader;
use files_uploader::config::Config;
use files_uploader::upload::UploadClient;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    init_logging();

    let config = Config::parse();
    config.validate()?;
    let client = UploadClient::new(config.endpoint_url()?, config.max_file_size);

    // Uploads run here; the UI thread only polls their events
    let runtime = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;
    let handle = runtime.handle().clone();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([600.0, 700.0])
            .with_min_inner_size([400.0, 500.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    info!(endpoint = %config.endpoint, "starting window");
    eframe::run_native(
        "Files",
        options,
        Box::new(move |cc| Box::new(FilesUploader::new(cc, &config, client, handle))),
    )
    .map_err(|e| anyhow::anyhow!("window error: {}", e))?;

    runtime.shutdown_background();
    Ok(())
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("files_uploader=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
