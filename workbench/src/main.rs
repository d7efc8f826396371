use anyhow::Context;
use clap::Parser;
use config::AppConfig;
use mockapi::MockAnalysisServer;
use pcapcore::client::ApiClient;
use pcapcore::session::SessionLoader;
use pcapcore::store::{FileCacheStore, FileMetadataStore};
use pcapcore::telemetry::IngestMetrics;
use pcapcore::upload::{UploadState, Uploader};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;

mod config;
mod mockapi;
mod report;

#[derive(Parser)]
#[command(author, version, about = "Offline driver for the PacketLens capture pipeline")]
struct Args {
    /// Upload a capture file and cache its analysis
    #[arg(long)]
    upload: Option<PathBuf>,
    /// Load and print the analysis overview
    #[arg(long, default_value_t = false)]
    overview: bool,
    /// Load an app config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    api_base: String,
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
    /// Port for the mock analysis service (0 picks one)
    #[arg(long, default_value_t = 0)]
    mock_port: u16,
    /// Run the mock analysis service and keep it alive
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let app_config = if let Some(path) = args.config {
        AppConfig::load(path)?
    } else {
        AppConfig::from_args(args.api_base, args.data_dir, args.timeout_secs, args.mock_port)
    };

    let mock = if args.serve {
        let server = MockAnalysisServer::start(app_config.mock_port);
        println!("Mock analysis service listening on {}", server.base_url());
        Some(server)
    } else {
        None
    };
    // Commands in a --serve run target the mock instead of the configured API.
    let api_base = mock
        .as_ref()
        .map(|server| server.base_url())
        .unwrap_or_else(|| app_config.api_base.clone());

    let runtime = TokioBuilder::new_current_thread()
        .enable_all()
        .build()
        .context("creating runtime for pipeline calls")?;

    let client = ApiClient::new(api_base, Duration::from_secs(app_config.timeout_secs))
        .context("building API client")?;
    let cache = Arc::new(FileCacheStore::new(&app_config.data_dir));
    let metadata = Arc::new(FileMetadataStore::new(
        app_config.data_dir.join("analysis-metadata.json"),
    ));

    if let Some(path) = args.upload {
        let mut uploader = Uploader::new(client.clone(), cache.clone(), metadata.clone());
        uploader.select_file(&path)?;
        runtime.block_on(uploader.submit());
        match uploader.state() {
            UploadState::Succeeded { file_name } => {
                println!("Uploaded {file_name}; analysis cached under {}", app_config.data_dir.display());
            }
            UploadState::Failed { message } => anyhow::bail!("upload failed: {message}"),
            other => anyhow::bail!("upload ended in unexpected state {other:?}"),
        }
    }

    if args.overview {
        let metrics = Arc::new(IngestMetrics::new());
        let loader = SessionLoader::new(client, cache, metadata, metrics.clone());
        let view = runtime.block_on(loader.load_overview());
        report::print_overview(&view);
        println!("{}", report::ingest_summary(&metrics));
        report::append_report(&app_config.data_dir, &view)?;
    }

    if args.serve {
        println!("Mock service running (Ctrl+C to stop)...");
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
