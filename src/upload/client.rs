use crate::error::{UploadError, UploadResult, INVALID_JSON_MESSAGE, MISSING_URL_MESSAGE};
use crate::upload::types::SelectedFile;
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Url};
use serde::Deserialize;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio_util::io::ReaderStream;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const READ_CHUNK_SIZE: usize = 64 * 1024;

#[derive(Deserialize)]
struct UploadResponse {
    url: Option<serde_json::Value>,
}

/// Callback receiving the percentage of the payload sent so far
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

#[derive(Clone)]
pub struct UploadClient {
    http: Client,
    endpoint: Url,
    max_file_size: u64,
}

impl UploadClient {
    pub fn new(endpoint: Url, max_file_size: u64) -> Self {
        Self {
            http: Client::new(),
            endpoint,
            max_file_size,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Sends one file as the `file` part of a multipart POST and returns the
    /// URL the endpoint stored it under.
    pub async fn upload_file(
        &self,
        file: &SelectedFile,
        cancel: &CancellationToken,
        on_progress: ProgressFn,
    ) -> UploadResult<String> {
        let handle = tokio::fs::File::open(&file.path)
            .await
            .map_err(|source| UploadError::Io {
                path: file.path.clone(),
                source,
            })?;

        // The file may have changed on disk since it was listed
        let total = handle
            .metadata()
            .await
            .map_err(|source| UploadError::Io {
                path: file.path.clone(),
                source,
            })?
            .len();
        if total > self.max_file_size {
            return Err(UploadError::OversizeFile {
                size: total,
                limit: self.max_file_size,
            });
        }

        let sent = Arc::new(AtomicU64::new(0));
        let stream_cancel = cancel.clone();
        let mut last_percent = 0u8;
        let reader = handle.take(total);
        let stream = ReaderStream::with_capacity(reader, READ_CHUNK_SIZE).map(move |chunk| {
            if stream_cancel.is_cancelled() {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "upload cancelled"));
            }
            let chunk = chunk?;
            let len = chunk.len() as u64;
            let sent_now = sent.fetch_add(len, Ordering::Relaxed) + len;
            if let Some(percent) = percent_complete(sent_now, total) {
                if percent != last_percent {
                    last_percent = percent;
                    on_progress(percent);
                }
            }
            Ok(chunk)
        });

        let part = Part::stream_with_length(Body::wrap_stream(stream), total)
            .file_name(file.name.clone());
        let form = Form::new().part("file", part);

        debug!(file = %file.name, endpoint = %self.endpoint, "sending upload request");
        let request = self.http.post(self.endpoint.clone()).multipart(form).send();
        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(UploadError::Cancelled),
            response = request => response,
        };

        let response = match response {
            Ok(response) => response,
            Err(_) if cancel.is_cancelled() => return Err(UploadError::Cancelled),
            Err(e) => {
                return Err(UploadError::NetworkFailure {
                    reason: e.to_string(),
                })
            }
        };

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UploadError::NetworkFailure {
                reason: e.to_string(),
            })?;

        if status.is_success() {
            parse_success_body(&body)
        } else {
            Err(UploadError::ServerError {
                status: status.as_u16(),
                detail: error_detail(status.as_u16(), &body),
            })
        }
    }
}

/// Rounded percentage; `None` when the total is unknown or zero
pub fn percent_complete(sent: u64, total: u64) -> Option<u8> {
    if total == 0 {
        return None;
    }
    let percent = ((sent as f64 / total as f64) * 100.0).round();
    Some(percent.clamp(0.0, 100.0) as u8)
}

pub fn parse_success_body(body: &str) -> UploadResult<String> {
    let response: UploadResponse = serde_json::from_str(body)
        .map_err(|_| UploadError::MalformedResponse(INVALID_JSON_MESSAGE))?;

    match response.url {
        Some(serde_json::Value::String(url)) if !url.is_empty() => Ok(url),
        _ => Err(UploadError::MalformedResponse(MISSING_URL_MESSAGE)),
    }
}

/// Best human-readable message from an error body: JSON `message`, then
/// JSON `error`, then the raw text.
pub fn error_detail(status: u16, body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            ["message", "error"].iter().find_map(|key| {
                json.get(*key)
                    .and_then(|v| v.as_str())
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })
        });

    match from_json {
        Some(detail) => detail,
        None if !body.trim().is_empty() => body.to_string(),
        None => format!("Upload failed with status: {}", status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_body_with_url() {
        assert_eq!(
            parse_success_body(r#"{"url":"https://x/y"}"#).unwrap(),
            "https://x/y"
        );
        assert_eq!(
            parse_success_body(r#"{"url":"https://x/y","size":100}"#).unwrap(),
            "https://x/y"
        );
    }

    #[test]
    fn test_success_body_not_json() {
        let err = parse_success_body("not json").unwrap_err();
        assert!(matches!(err, UploadError::MalformedResponse(_)));
        assert_eq!(err.to_string(), INVALID_JSON_MESSAGE);
    }

    #[test]
    fn test_success_body_without_url() {
        for body in [r#"{"id":"abc"}"#, r#"{"url":""}"#, r#"{"url":null}"#, r#"{"url":7}"#] {
            let err = parse_success_body(body).unwrap_err();
            assert_eq!(err.to_string(), MISSING_URL_MESSAGE, "body: {}", body);
        }
    }

    #[test]
    fn test_success_body_json_but_not_object() {
        assert!(parse_success_body("[1,2,3]").is_err());
        assert!(parse_success_body("\"https://x/y\"").is_err());
    }

    #[test]
    fn test_error_detail_prefers_message_then_error() {
        assert_eq!(error_detail(500, r#"{"error":"disk full"}"#), "disk full");
        assert_eq!(
            error_detail(400, r#"{"message":"bad name","error":"E42"}"#),
            "bad name"
        );
        assert_eq!(error_detail(400, r#"{"message":"","error":"E42"}"#), "E42");
    }

    #[test]
    fn test_error_detail_falls_back_to_raw_text() {
        assert_eq!(error_detail(502, "Bad Gateway"), "Bad Gateway");
        assert_eq!(error_detail(413, r#"{"code":413}"#), r#"{"code":413}"#);
    }

    #[test]
    fn test_error_detail_empty_body() {
        assert_eq!(error_detail(503, ""), "Upload failed with status: 503");
    }

    #[test]
    fn test_percent_complete() {
        assert_eq!(percent_complete(0, 0), None);
        assert_eq!(percent_complete(50, 100), Some(50));
        assert_eq!(percent_complete(1, 3), Some(33));
        assert_eq!(percent_complete(2, 3), Some(67));
        assert_eq!(percent_complete(100, 100), Some(100));
    }

    #[tokio::test]
    async fn test_oversize_file_is_not_sent() {
        let endpoint = Url::parse("http://127.0.0.1:9/upload").unwrap();
        let client = UploadClient::new(endpoint, 10);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.bin");
        std::fs::write(&path, [0u8; 11]).unwrap();
        let file = SelectedFile::from_path(&path).unwrap();

        let err = client
            .upload_file(&file, &CancellationToken::new(), Arc::new(|_: u8| {}))
            .await
            .unwrap_err();
        assert!(err.is_oversize());
    }

    #[tokio::test]
    async fn test_size_is_read_from_disk_at_upload_time() {
        let endpoint = Url::parse("http://127.0.0.1:9/upload").unwrap();
        let client = UploadClient::new(endpoint, 10);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grown.bin");
        std::fs::write(&path, [0u8; 4]).unwrap();
        let file = SelectedFile::from_path(&path).unwrap();
        std::fs::write(&path, [0u8; 20]).unwrap();

        let err = client
            .upload_file(&file, &CancellationToken::new(), Arc::new(|_: u8| {}))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            UploadError::OversizeFile { size: 20, limit: 10 }
        ));
    }

    #[tokio::test]
    async fn test_missing_payload_is_io_error() {
        let endpoint = Url::parse("http://127.0.0.1:9/upload").unwrap();
        let client = UploadClient::new(endpoint, 10);
        let file = SelectedFile::new("gone.bin", 1, "/does/not/exist/gone.bin");

        let err = client
            .upload_file(&file, &CancellationToken::new(), Arc::new(|_: u8| {}))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Io { .. }));
    }
}
