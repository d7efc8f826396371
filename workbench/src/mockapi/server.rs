use std::net::SocketAddr;
use std::sync::{mpsc, Arc, RwLock};
use std::thread;

use serde_json::Value;
use tokio::runtime::Builder;
use warp::Filter;

use super::data::{synthesize_analysis, synthesize_latency_csv, synthesize_packets};

const MOCK_PACKET_COUNT: usize = 120;
const MAX_UPLOAD_BYTES: u64 = 256 * 1024 * 1024;

#[derive(Clone)]
struct MockState {
    analysis: Value,
    packets: Value,
    latency_csv: String,
}

impl MockState {
    fn regenerate() -> Self {
        Self {
            analysis: synthesize_analysis(),
            packets: synthesize_packets(MOCK_PACKET_COUNT),
            latency_csv: synthesize_latency_csv(),
        }
    }
}

/// Mock analysis service speaking the same HTTP surface as the real one.
/// An upload regenerates the whole dataset, so every successful upload is
/// observable through the overview endpoint.
pub struct MockAnalysisServer {
    state: Arc<RwLock<MockState>>,
    addr: SocketAddr,
}

impl MockAnalysisServer {
    /// Binds on `127.0.0.1:port` (`0` picks an ephemeral port) and serves
    /// from a dedicated thread until the process exits.
    pub fn start(port: u16) -> Self {
        let state = Arc::new(RwLock::new(MockState::regenerate()));
        let state_for_filter = state.clone();
        let state_filter = warp::any().map(move || state_for_filter.clone());

        let overview_route = warp::path!("api" / "analyzeOverview")
            .and(warp::get())
            .and(state_filter.clone())
            .map(|state: Arc<RwLock<MockState>>| {
                warp::reply::json(&state.read().unwrap().analysis)
            });

        let packets_route = warp::path!("api" / "getAllPackets")
            .and(warp::get())
            .and(state_filter.clone())
            .map(|state: Arc<RwLock<MockState>>| {
                warp::reply::json(&state.read().unwrap().packets)
            });

        let latency_route = warp::path!("latency_distribution_coordinates.csv")
            .and(warp::get())
            .and(state_filter.clone())
            .map(|state: Arc<RwLock<MockState>>| {
                warp::reply::with_header(
                    state.read().unwrap().latency_csv.clone(),
                    "content-type",
                    "text/csv",
                )
            });

        let upload_route = warp::path!("api" / "upload")
            .and(warp::post())
            .and(warp::body::content_length_limit(MAX_UPLOAD_BYTES))
            .and(warp::body::bytes())
            .and(state_filter)
            .map(|body: warp::hyper::body::Bytes, state: Arc<RwLock<MockState>>| {
                log::info!("mock upload received ({} bytes), regenerating analysis", body.len());
                let fresh = MockState::regenerate();
                let analysis = fresh.analysis.clone();
                let mut guard = state.write().unwrap();
                *guard = fresh;
                warp::reply::json(&analysis)
            });

        let routes = overview_route
            .or(packets_route)
            .or(latency_route)
            .or(upload_route);

        let (addr_tx, addr_rx) = mpsc::channel();
        thread::spawn(move || {
            let runtime = Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("failed to build runtime");
            runtime.block_on(async move {
                let (addr, server) =
                    warp::serve(routes).bind_ephemeral(SocketAddr::from(([127, 0, 0, 1], port)));
                let _ = addr_tx.send(addr);
                server.await;
            });
        });
        let addr = addr_rx.recv().expect("mock server failed to bind");

        Self { state, addr }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> Value {
        self.state.read().unwrap().analysis.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcapcore::client::ApiClient;
    use pcapcore::prelude::ANALYSIS_CACHE_KEY;
    use pcapcore::store::{CacheStore, MemoryCacheStore, MemoryMetadataStore, MetadataStore};
    use pcapcore::upload::{UploadState, Uploader};
    use std::path::Path;
    use std::time::Duration;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
    }

    #[test]
    fn mock_server_serves_overview_and_packets() {
        let server = MockAnalysisServer::start(0);
        let client = ApiClient::new(server.base_url(), Duration::from_secs(5)).unwrap();
        let runtime = runtime();

        let overview = runtime.block_on(client.fetch_overview()).unwrap();
        assert!(overview.get("overview").is_some());

        let packets = runtime.block_on(client.fetch_packets()).unwrap();
        assert_eq!(
            packets["packets"].as_array().unwrap().len(),
            MOCK_PACKET_COUNT
        );

        let csv = runtime.block_on(client.fetch_latency_csv()).unwrap();
        assert!(csv.contains("MQTT"));
    }

    #[test]
    fn upload_round_trip_caches_the_regenerated_analysis() {
        let server = MockAnalysisServer::start(0);
        let client = ApiClient::new(server.base_url(), Duration::from_secs(5)).unwrap();
        let cache = Arc::new(MemoryCacheStore::new());
        let metadata = Arc::new(MemoryMetadataStore::new());
        let mut uploader = Uploader::new(client, cache.clone(), metadata.clone());

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("capture.pcapng");
        std::fs::write(&path, vec![0u8; 200 * 1024]).unwrap();
        uploader.select_file(Path::new(&path)).unwrap();

        runtime().block_on(uploader.submit());

        assert_eq!(
            uploader.state(),
            UploadState::Succeeded {
                file_name: "capture.pcapng".to_string()
            }
        );
        assert_eq!(cache.get(ANALYSIS_CACHE_KEY), Some(server.snapshot()));
        assert_eq!(metadata.get().unwrap().original_filename, "capture.pcapng");
    }
}
