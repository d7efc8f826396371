use serde::{Deserialize, Serialize};

/// Fixed key under which the full analysis blob lives in the cache store.
pub const ANALYSIS_CACHE_KEY: &str = "analysis-data";

/// Only capture files with this extension are accepted for upload.
pub const CAPTURE_EXTENSION: &str = ".pcapng";

/// Which source ultimately supplied a page's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    CachedUpload,
    LiveFetch,
    Sample,
}

/// Common error type for the ingestion pipeline.
///
/// `Validation` and `Transport` are user-visible; `Parse` is displayed with
/// the transport wording; `Cache` is always absorbed locally by callers.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Transport(String),
    #[error("Invalid response from server")]
    Parse,
    #[error("cache store failure: {0}")]
    Cache(String),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
