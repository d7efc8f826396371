//! Observable upload state machine.
//!
//! Consumers subscribe to a `watch` channel instead of nesting callbacks:
//! every transition is a discrete state value, and the terminal `Succeeded`
//! and `Failed` states are idle (a new `select_file` starts the next cycle).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{info, warn};
use tokio::sync::watch;

use crate::client::ApiClient;
use crate::model::SessionMetadata;
use crate::prelude::{PipelineError, PipelineResult, ANALYSIS_CACHE_KEY, CAPTURE_EXTENSION};
use crate::store::{CacheStore, MetadataStore};

#[derive(Debug, Clone, PartialEq)]
pub enum UploadState {
    Idle,
    FileSelected { file_name: String },
    Uploading { percent: u8 },
    /// Upload body fully sent; awaiting the analysis response. Server-side
    /// processing time is not observable, so this state is purely cosmetic.
    Analyzing,
    Succeeded { file_name: String },
    Failed { message: String },
}

pub struct Uploader {
    client: ApiClient,
    cache: Arc<dyn CacheStore>,
    metadata: Arc<dyn MetadataStore>,
    state: Arc<watch::Sender<UploadState>>,
    selected: Option<PathBuf>,
    cancelled: Arc<AtomicBool>,
}

impl Uploader {
    pub fn new(
        client: ApiClient,
        cache: Arc<dyn CacheStore>,
        metadata: Arc<dyn MetadataStore>,
    ) -> Self {
        let (state, _) = watch::channel(UploadState::Idle);
        Self {
            client,
            cache,
            metadata,
            state: Arc::new(state),
            selected: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<UploadState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> UploadState {
        self.state.borrow().clone()
    }

    /// Validates the capture path and, on acceptance, clears any previously
    /// cached analysis so stale results cannot leak into pages serving from
    /// cache.
    pub fn select_file(&mut self, path: &Path) -> PipelineResult<()> {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if name.is_empty() {
            return Err(PipelineError::Validation(
                "No capture file selected".to_string(),
            ));
        }
        if !name.to_lowercase().ends_with(CAPTURE_EXTENSION) {
            return Err(PipelineError::Validation(
                "Please upload a .pcapng file only".to_string(),
            ));
        }
        self.cache.remove(ANALYSIS_CACHE_KEY);
        self.metadata.clear();
        self.selected = Some(path.to_path_buf());
        self.cancelled.store(false, Ordering::Relaxed);
        self.state.send_replace(UploadState::FileSelected {
            file_name: name.to_string(),
        });
        Ok(())
    }

    /// Requests that an in-flight upload stop between chunks.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Drives the selected file through upload and analysis. Outcomes are
    /// reported through the state channel, never returned.
    pub async fn submit(&self) {
        let Some(path) = self.selected.clone() else {
            self.state.send_replace(UploadState::Failed {
                message: "No capture file selected".to_string(),
            });
            return;
        };
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("capture.pcapng")
            .to_string();

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                self.state.send_replace(UploadState::Failed {
                    message: format!("Failed to read {}: {err}", path.display()),
                });
                return;
            }
        };

        self.state.send_replace(UploadState::Uploading { percent: 0 });
        let progress = self.state.clone();
        let result = self
            .client
            .upload_capture(&file_name, bytes, self.cancelled.clone(), move |percent| {
                let next = if percent >= 100 {
                    UploadState::Analyzing
                } else {
                    UploadState::Uploading { percent }
                };
                progress.send_replace(next);
            })
            .await;

        match result {
            Ok(raw) => {
                if !self.cache.put(ANALYSIS_CACHE_KEY, &raw) {
                    warn!("analysis blob was not cached; pages will refetch");
                }
                self.metadata.set(&SessionMetadata::new(file_name.clone()));
                info!("upload of {file_name} analyzed and cached");
                self.state.send_replace(UploadState::Succeeded { file_name });
            }
            Err(err) => {
                self.state.send_replace(UploadState::Failed {
                    message: err.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryCacheStore, MemoryMetadataStore};
    use serde_json::json;
    use std::time::Duration;

    fn uploader() -> (Uploader, Arc<MemoryCacheStore>, Arc<MemoryMetadataStore>) {
        uploader_for("http://127.0.0.1:1")
    }

    fn uploader_for(base: &str) -> (Uploader, Arc<MemoryCacheStore>, Arc<MemoryMetadataStore>) {
        let cache = Arc::new(MemoryCacheStore::new());
        let metadata = Arc::new(MemoryMetadataStore::new());
        let client = ApiClient::new(base, Duration::from_secs(5)).unwrap();
        (
            Uploader::new(client, cache.clone(), metadata.clone()),
            cache,
            metadata,
        )
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
    }

    fn capture_file(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("capture.pcapng");
        std::fs::write(&path, vec![0u8; 4096]).unwrap();
        path
    }

    /// Serves exactly one canned HTTP response, reading the full request
    /// (headers plus content-length body) before replying.
    fn one_shot_server(status_line: &'static str, body: &'static str) -> String {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let mut buffer = Vec::new();
            let mut chunk = [0u8; 4096];
            let mut header_end = None;
            let mut content_length = 0usize;
            loop {
                match stream.read(&mut chunk) {
                    Ok(0) | Err(_) => break,
                    Ok(read) => buffer.extend_from_slice(&chunk[..read]),
                }
                if header_end.is_none() {
                    if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
                        header_end = Some(pos + 4);
                        let headers = String::from_utf8_lossy(&buffer[..pos]).to_ascii_lowercase();
                        for line in headers.lines() {
                            if let Some(value) = line.strip_prefix("content-length:") {
                                content_length = value.trim().parse().unwrap_or(0);
                            }
                        }
                    }
                }
                if let Some(end) = header_end {
                    if buffer.len() >= end + content_length {
                        break;
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
        });
        format!("http://{addr}")
    }

    #[test]
    fn select_rejects_wrong_extension() {
        let (mut uploader, _, _) = uploader();
        let err = uploader.select_file(Path::new("capture.pcap")).unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
        assert_eq!(uploader.state(), UploadState::Idle);
    }

    #[test]
    fn select_rejects_missing_name() {
        let (mut uploader, _, _) = uploader();
        let err = uploader.select_file(Path::new("")).unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
    }

    #[test]
    fn select_accepts_pcapng_and_clears_stale_stores() {
        let (mut uploader, cache, metadata) = uploader();
        cache.put(ANALYSIS_CACHE_KEY, &json!({ "total_packets": 1 }));
        metadata.set(&SessionMetadata::new("old.pcapng"));

        uploader.select_file(Path::new("capture.PCAPNG")).unwrap();

        assert_eq!(cache.get(ANALYSIS_CACHE_KEY), None);
        assert_eq!(metadata.get(), None);
        assert_eq!(
            uploader.state(),
            UploadState::FileSelected {
                file_name: "capture.PCAPNG".to_string()
            }
        );
    }

    #[test]
    fn submit_without_selection_fails_in_place() {
        let (uploader, _, _) = uploader();
        runtime().block_on(uploader.submit());
        assert!(matches!(uploader.state(), UploadState::Failed { .. }));
    }

    #[test]
    fn network_failure_reports_transport_wording() {
        let (mut uploader, _, _) = uploader();
        let dir = tempfile::TempDir::new().unwrap();
        uploader.select_file(&capture_file(&dir)).unwrap();

        runtime().block_on(uploader.submit());
        assert_eq!(
            uploader.state(),
            UploadState::Failed {
                message: "Network error occurred".to_string()
            }
        );
    }

    #[test]
    fn unparseable_response_body_reports_invalid_response() {
        let base = one_shot_server("200 OK", "not json at all");
        let (mut uploader, cache, _) = uploader_for(&base);
        let dir = tempfile::TempDir::new().unwrap();
        uploader.select_file(&capture_file(&dir)).unwrap();

        runtime().block_on(uploader.submit());
        assert_eq!(
            uploader.state(),
            UploadState::Failed {
                message: "Invalid response from server".to_string()
            }
        );
        assert_eq!(cache.get(ANALYSIS_CACHE_KEY), None);
    }

    #[test]
    fn http_failure_status_reports_upload_failed_wording() {
        let base = one_shot_server("500 Internal Server Error", "{}");
        let (mut uploader, _, metadata) = uploader_for(&base);
        let dir = tempfile::TempDir::new().unwrap();
        uploader.select_file(&capture_file(&dir)).unwrap();

        runtime().block_on(uploader.submit());
        assert_eq!(
            uploader.state(),
            UploadState::Failed {
                message: "Upload failed: 500 Internal Server Error".to_string()
            }
        );
        assert_eq!(metadata.get(), None);
    }

    #[test]
    fn cancelled_upload_aborts_between_chunks() {
        // Listener accepts connections through its backlog but never reads,
        // so the outcome is decided by the body stream's cancel check.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let (mut uploader, _, _) = uploader_for(&base);
        let dir = tempfile::TempDir::new().unwrap();
        uploader.select_file(&capture_file(&dir)).unwrap();
        uploader.cancel();

        runtime().block_on(uploader.submit());
        assert_eq!(
            uploader.state(),
            UploadState::Failed {
                message: "Upload cancelled".to_string()
            }
        );
    }
}
