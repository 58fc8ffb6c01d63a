//! Runtime configuration
//!
//! Every option can come from the command line or the environment.

use crate::error::ConfigError;
use clap::Parser;
use reqwest::Url;
use std::time::Duration;

/// 5 GiB
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024 * 1024;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/upload";

pub const DEFAULT_COPY_FEEDBACK_MS: u64 = 1500;

/// Desktop file uploader with shareable links
#[derive(Parser, Debug, Clone)]
#[command(name = "files_uploader", version)]
pub struct Config {
    /// Upload endpoint receiving `multipart/form-data` with a single `file` part
    #[arg(long, env = "FILES_UPLOAD_URL", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Largest file, in bytes, that will be sent
    #[arg(long, env = "FILES_MAX_FILE_SIZE", default_value_t = DEFAULT_MAX_FILE_SIZE)]
    pub max_file_size: u64,

    /// How long the copy button shows its confirmation, in milliseconds
    #[arg(long, env = "FILES_COPY_FEEDBACK_MS", default_value_t = DEFAULT_COPY_FEEDBACK_MS)]
    pub copy_feedback_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            copy_feedback_ms: DEFAULT_COPY_FEEDBACK_MS,
        }
    }
}

impl Config {
    /// Parsed endpoint; only http and https are accepted
    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.endpoint).map_err(|e| ConfigError::InvalidEndpoint {
            url: self.endpoint.clone(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::InvalidEndpoint {
                url: self.endpoint.clone(),
                reason: format!("unsupported scheme '{}'", other),
            }),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.endpoint_url()?;
        if self.max_file_size == 0 {
            return Err(ConfigError::ZeroSizeLimit);
        }
        Ok(())
    }

    pub fn copy_feedback(&self) -> Duration {
        Duration::from_millis(self.copy_feedback_ms)
    }
}
