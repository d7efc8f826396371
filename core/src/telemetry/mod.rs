//! Counters describing where page data actually came from.

mod metrics;

pub use metrics::IngestMetrics;
