//! Terminal rendering and on-disk summaries for loaded overviews.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use pcapcore::model::{
    delay_category_title, format_capture_duration, service_name, sort_by_percentage_desc,
};
use pcapcore::prelude::DataSource;
use pcapcore::session::LoadedView;
use pcapcore::telemetry::IngestMetrics;

fn source_label(source: DataSource) -> &'static str {
    match source {
        DataSource::CachedUpload => "cached upload",
        DataSource::LiveFetch => "live API",
        DataSource::Sample => "sample data",
    }
}

/// Prints a plain-text overview: provenance, headline stats, sorted
/// distributions, delay categories, and top talkers.
pub fn print_overview(view: &LoadedView) {
    println!("Source: {}", source_label(view.source));
    if let Some(metadata) = &view.metadata {
        println!("Analyzed: {}", metadata.original_filename);
    }
    if let Some(notice) = &view.notice {
        println!("Notice: {notice}");
    }

    println!("Total packets: {}", view.model.total_packets);
    if let Some(stats) = &view.model.stats {
        let (duration, unit) = format_capture_duration(stats.capture_duration);
        println!(
            "Capture duration: {duration} {unit} | avg size {:.2} B | {:.1} pkt/s",
            stats.avg_packet_size, stats.packets_per_second
        );
    }

    let mut protocols = view.model.protocol_distribution.clone();
    sort_by_percentage_desc(&mut protocols);
    if !protocols.is_empty() {
        println!("Protocol distribution:");
        for entry in &protocols {
            println!(
                "  {:<10} {:>10} packets  {:>6.2}%",
                entry.name, entry.packets, entry.percentage
            );
        }
    }

    if let Some(categories) = &view.model.delay_categories {
        println!("Delay categories:");
        for (key, stat) in categories {
            println!(
                "  {:<28} avg {:>10.2} ms  max {:>10.2} ms  ({} samples)",
                delay_category_title(key),
                stat.avg,
                stat.max,
                stat.count
            );
        }
    }

    if let Some(ports) = &view.model.port_stats {
        if !ports.top_destinations.is_empty() {
            println!("Top destination ports:");
            for entry in &ports.top_destinations {
                let service = service_name(entry.port);
                if service.is_empty() {
                    println!("  {:<6} {} packets", entry.port, entry.packets);
                } else {
                    println!("  {:<6} {} packets ({service})", entry.port, entry.packets);
                }
            }
        }
    }
}

/// One-line account of how the loads were satisfied.
pub fn ingest_summary(metrics: &IngestMetrics) -> String {
    let (cache_hits, live_fetches, sample_fallbacks) = metrics.snapshot();
    format!(
        "Ingest: {cache_hits} cache hits, {live_fetches} live fetches, {sample_fallbacks} sample fallbacks"
    )
}

/// Appends a one-line summary of the load to `overview_report.log` under
/// `data_dir`.
pub fn append_report(data_dir: &Path, view: &LoadedView) -> anyhow::Result<()> {
    let line = format!(
        "source={} total_packets={} protocols={} notice={}\n",
        source_label(view.source),
        view.model.total_packets,
        view.model.protocol_distribution.len(),
        view.notice.as_deref().unwrap_or("-")
    );
    fs::create_dir_all(data_dir)?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join("overview_report.log"))?;
    file.write_all(line.as_bytes())?;
    Ok(())
}
