//! HTTP client for the analysis service.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream;
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use serde_json::Value;

use crate::prelude::{PipelineError, PipelineResult};

const UPLOAD_CHUNK_BYTES: usize = 64 * 1024;

/// Thin wrapper over `reqwest` pinned to one API base URL. All transport
/// failures collapse to the pipeline's user-facing error wording.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> PipelineResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| PipelineError::Transport(err.to_string()))?;
        Ok(Self {
            base_url: base_url.into(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET the full analysis document (flat or nested shape).
    pub async fn fetch_overview(&self) -> PipelineResult<Value> {
        self.get_json("/api/analyzeOverview").await
    }

    /// GET the decoded packet list document.
    pub async fn fetch_packets(&self) -> PipelineResult<Value> {
        self.get_json("/api/getAllPackets").await
    }

    /// GET the latency-distribution coordinate CSV as raw text.
    pub async fn fetch_latency_csv(&self) -> PipelineResult<String> {
        let url = format!("{}/latency_distribution_coordinates.csv", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|_| PipelineError::Transport("Network error occurred".to_string()))?;
        if !response.status().is_success() {
            return Err(PipelineError::Transport(format!(
                "API Error: {}",
                response.status().as_u16()
            )));
        }
        response
            .text()
            .await
            .map_err(|_| PipelineError::Transport("Network error occurred".to_string()))
    }

    async fn get_json(&self, path: &str) -> PipelineResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|_| PipelineError::Transport("Network error occurred".to_string()))?;
        if !response.status().is_success() {
            return Err(PipelineError::Transport(format!(
                "API Error: {}",
                response.status().as_u16()
            )));
        }
        let body = response
            .text()
            .await
            .map_err(|_| PipelineError::Transport("Network error occurred".to_string()))?;
        serde_json::from_str(&body).map_err(|_| PipelineError::Parse)
    }

    /// Streams `bytes` as the `file` part of a multipart upload. Progress is
    /// reported through `on_progress` as chunks are pulled onto the wire,
    /// and `cancelled` aborts the body between chunks.
    pub async fn upload_capture(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        cancelled: Arc<AtomicBool>,
        on_progress: impl Fn(u8) + Send + Sync + 'static,
    ) -> PipelineResult<Value> {
        let length = bytes.len() as u64;
        let total = length.max(1);
        let sent = Arc::new(AtomicU64::new(0));
        let chunks: Vec<Vec<u8>> = bytes
            .chunks(UPLOAD_CHUNK_BYTES)
            .map(|chunk| chunk.to_vec())
            .collect();

        let cancel_flag = cancelled.clone();
        let body_stream = stream::iter(chunks.into_iter().map(move |chunk| {
            if cancel_flag.load(Ordering::Relaxed) {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "upload cancelled"));
            }
            let done = sent.fetch_add(chunk.len() as u64, Ordering::Relaxed) + chunk.len() as u64;
            let percent = ((done * 100) / total).min(100) as u8;
            on_progress(percent);
            Ok::<Vec<u8>, io::Error>(chunk)
        }));

        let part = Part::stream_with_length(Body::wrap_stream(body_stream), length)
            .file_name(file_name.to_string())
            .mime_str("application/octet-stream")
            .map_err(|err| PipelineError::Transport(err.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(format!("{}/api/upload", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|_| {
                if cancelled.load(Ordering::Relaxed) {
                    PipelineError::Transport("Upload cancelled".to_string())
                } else {
                    PipelineError::Transport("Network error occurred".to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Transport(format!("Upload failed: {status}")));
        }
        let body = response
            .text()
            .await
            .map_err(|_| PipelineError::Transport("Network error occurred".to_string()))?;
        serde_json::from_str(&body).map_err(|_| PipelineError::Parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_rejects_nothing_at_build_time() {
        let client = ApiClient::new("http://127.0.0.1:8000", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8000");
    }

    #[test]
    fn unreachable_host_maps_to_network_error_wording() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let client = ApiClient::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let err = runtime.block_on(client.fetch_overview()).unwrap_err();
        assert_eq!(err.to_string(), "Network error occurred");
    }
}
