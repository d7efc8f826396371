//! Page-load orchestration: cached upload first, live API second, bundled
//! sample data last.

use std::sync::Arc;

use log::{info, warn};
use serde_json::Value;

use crate::client::ApiClient;
use crate::latency::{parse_latency_csv, LatencySeries};
use crate::model::{extract_packets, NormalizedViewModel, PacketRecord, SessionMetadata};
use crate::normalize::normalize;
use crate::prelude::{DataSource, ANALYSIS_CACHE_KEY};
use crate::sample::{sample_response, SAMPLE_LATENCY_CSV};
use crate::store::{CacheStore, MetadataStore};
use crate::telemetry::IngestMetrics;

/// A fully resolved overview load: the normalized model plus the raw
/// document it came from, where it came from, and an optional banner for
/// the user when the load degraded.
#[derive(Debug, Clone)]
pub struct LoadedView {
    pub model: NormalizedViewModel,
    pub raw: Value,
    pub source: DataSource,
    pub metadata: Option<SessionMetadata>,
    pub notice: Option<String>,
}

/// A resolved packet-list load.
#[derive(Debug, Clone)]
pub struct LoadedPackets {
    pub packets: Vec<PacketRecord>,
    pub source: DataSource,
    pub notice: Option<String>,
}

/// A resolved latency-distribution load.
#[derive(Debug, Clone)]
pub struct LoadedLatency {
    pub series: Vec<LatencySeries>,
    pub source: DataSource,
    pub notice: Option<String>,
}

pub struct SessionLoader {
    client: ApiClient,
    cache: Arc<dyn CacheStore>,
    metadata: Arc<dyn MetadataStore>,
    metrics: Arc<IngestMetrics>,
}

impl SessionLoader {
    pub fn new(
        client: ApiClient,
        cache: Arc<dyn CacheStore>,
        metadata: Arc<dyn MetadataStore>,
        metrics: Arc<IngestMetrics>,
    ) -> Self {
        Self {
            client,
            cache,
            metadata,
            metrics,
        }
    }

    /// Resolves the overview document and normalizes it for rendering.
    pub async fn load_overview(&self) -> LoadedView {
        let (raw, source, metadata, notice) = self.load_raw().await;
        LoadedView {
            model: normalize(&raw),
            raw,
            source,
            metadata,
            notice,
        }
    }

    /// Cached upload when session metadata points at one, otherwise the
    /// live API, otherwise the bundled sample with a visible notice.
    async fn load_raw(&self) -> (Value, DataSource, Option<SessionMetadata>, Option<String>) {
        let session = self.metadata.get();
        if session.is_some() {
            if let Some(cached) = self.cache.get(ANALYSIS_CACHE_KEY) {
                self.metrics.record_cache_hit();
                info!("overview served from cached upload");
                return (cached, DataSource::CachedUpload, session, None);
            }
        }

        match self.client.fetch_overview().await {
            Ok(raw) => {
                self.metrics.record_live_fetch();
                // Opportunistic: a live result becomes the session so later
                // pages can serve from cache, but only once it is stored.
                if self.cache.put(ANALYSIS_CACHE_KEY, &raw) {
                    self.metadata.set(&SessionMetadata::new("API Data"));
                }
                info!("overview fetched from {}", self.client.base_url());
                (raw, DataSource::LiveFetch, self.metadata.get(), None)
            }
            Err(err) => {
                self.metrics.record_sample_fallback();
                warn!("overview fetch failed, falling back to sample: {err}");
                (
                    sample_response(),
                    DataSource::Sample,
                    None,
                    Some(format!("{err}. Using fallback sample data instead.")),
                )
            }
        }
    }

    /// Resolves the decoded packet list. An empty cached list falls through
    /// to the live API, and an empty live list surfaces a notice instead of
    /// an error.
    pub async fn load_packets(&self) -> LoadedPackets {
        if self.metadata.get().is_some() {
            if let Some(cached) = self.cache.get(ANALYSIS_CACHE_KEY) {
                let packets = extract_packets(&cached);
                if !packets.is_empty() {
                    self.metrics.record_cache_hit();
                    return LoadedPackets {
                        packets,
                        source: DataSource::CachedUpload,
                        notice: None,
                    };
                }
            }
        }

        match self.client.fetch_packets().await {
            Ok(raw) => {
                self.metrics.record_live_fetch();
                let packets = extract_packets(&raw);
                let notice = if packets.is_empty() {
                    Some("No packet data found in API response".to_string())
                } else {
                    None
                };
                LoadedPackets {
                    packets,
                    source: DataSource::LiveFetch,
                    notice,
                }
            }
            Err(err) => {
                self.metrics.record_sample_fallback();
                warn!("packet fetch failed: {err}");
                LoadedPackets {
                    packets: Vec::new(),
                    source: DataSource::Sample,
                    notice: Some(format!("{err}. No packet data available.")),
                }
            }
        }
    }

    /// Resolves the latency-distribution curves, falling back to the
    /// bundled coordinates when the CSV endpoint is unreachable.
    pub async fn load_latency(&self) -> LoadedLatency {
        match self.client.fetch_latency_csv().await {
            Ok(csv) => {
                self.metrics.record_live_fetch();
                LoadedLatency {
                    series: parse_latency_csv(&csv),
                    source: DataSource::LiveFetch,
                    notice: None,
                }
            }
            Err(err) => {
                self.metrics.record_sample_fallback();
                warn!("latency fetch failed, falling back to sample: {err}");
                LoadedLatency {
                    series: parse_latency_csv(SAMPLE_LATENCY_CSV),
                    source: DataSource::Sample,
                    notice: Some(format!("{err}. Using fallback sample data instead.")),
                }
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

    fn loader_with(
        cache: Arc<MemoryCacheStore>,
        metadata: Arc<MemoryMetadataStore>,
    ) -> SessionLoader {
        // Unroutable base; any network attempt fails fast.
        let client = ApiClient::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        SessionLoader::new(client, cache, metadata, Arc::new(IngestMetrics::new()))
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
    }

    #[test]
    fn cached_upload_wins_without_touching_the_network() {
        let cache = Arc::new(MemoryCacheStore::new());
        let metadata = Arc::new(MemoryMetadataStore::new());
        cache.put(ANALYSIS_CACHE_KEY, &json!({ "total_packets": 42 }));
        metadata.set(&SessionMetadata::new("capture.pcapng"));

        let loader = loader_with(cache, metadata);
        let view = runtime().block_on(loader.load_overview());

        assert_eq!(view.source, DataSource::CachedUpload);
        assert_eq!(view.model.total_packets, 42);
        assert_eq!(view.metadata.unwrap().original_filename, "capture.pcapng");
        assert_eq!(view.notice, None);
    }

    #[test]
    fn metadata_without_cache_entry_falls_through_to_sample() {
        let cache = Arc::new(MemoryCacheStore::new());
        let metadata = Arc::new(MemoryMetadataStore::new());
        metadata.set(&SessionMetadata::new("capture.pcapng"));

        let loader = loader_with(cache, metadata);
        let view = runtime().block_on(loader.load_overview());

        assert_eq!(view.source, DataSource::Sample);
        assert_eq!(view.model.total_packets, 9312);
        let notice = view.notice.unwrap();
        assert!(notice.starts_with("Network error occurred"));
        assert!(notice.ends_with("Using fallback sample data instead."));
    }

    #[test]
    fn unreachable_api_yields_sample_with_notice() {
        let loader = loader_with(
            Arc::new(MemoryCacheStore::new()),
            Arc::new(MemoryMetadataStore::new()),
        );
        let view = runtime().block_on(loader.load_overview());
        assert_eq!(view.source, DataSource::Sample);
        assert!(view.metadata.is_none());
        assert!(view.notice.is_some());
    }

    #[test]
    fn empty_cached_packet_list_falls_through() {
        let cache = Arc::new(MemoryCacheStore::new());
        let metadata = Arc::new(MemoryMetadataStore::new());
        cache.put(ANALYSIS_CACHE_KEY, &json!({ "packets": [] }));
        metadata.set(&SessionMetadata::new("capture.pcapng"));

        let loader = loader_with(cache, metadata);
        let loaded = runtime().block_on(loader.load_packets());

        // Cache held no packets, live fetch failed, so the load degrades.
        assert_eq!(loaded.source, DataSource::Sample);
        assert!(loaded.packets.is_empty());
        assert!(loaded.notice.is_some());
    }

    #[test]
    fn cached_packet_list_is_served_directly() {
        let cache = Arc::new(MemoryCacheStore::new());
        let metadata = Arc::new(MemoryMetadataStore::new());
        cache.put(
            ANALYSIS_CACHE_KEY,
            &json!({ "packets": [{ "number": 1, "protocol": "MQTT" }] }),
        );
        metadata.set(&SessionMetadata::new("capture.pcapng"));

        let loader = loader_with(cache, metadata);
        let loaded = runtime().block_on(loader.load_packets());

        assert_eq!(loaded.source, DataSource::CachedUpload);
        assert_eq!(loaded.packets.len(), 1);
        assert_eq!(loaded.packets[0].protocol, "MQTT");
    }

    #[test]
    fn latency_falls_back_to_bundled_coordinates() {
        let loader = loader_with(
            Arc::new(MemoryCacheStore::new()),
            Arc::new(MemoryMetadataStore::new()),
        );
        let loaded = runtime().block_on(loader.load_latency());
        assert_eq!(loaded.source, DataSource::Sample);
        assert_eq!(loaded.series.len(), 3);
        assert_eq!(loaded.series[0].protocol, "MQTT");
    }
}
