//! files_uploader - pick or drop files, upload them one by one, share the link.
//!
//! - [`upload`]: selection state, the HTTP client and the sequential worker
//! - [`app`]: the eframe window that drives them
//! - [`config`]: command line and environment options

pub mod app;
pub mod config;
pub mod error;
pub mod upload;
pub mod utils;
