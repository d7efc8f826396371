use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of a protocol or packet-type distribution table.
///
/// Percentages are best-effort output of a lossy capture; rows within one
/// distribution are not required to sum to 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionEntry {
    pub name: String,
    #[serde(default)]
    pub packets: u64,
    #[serde(default)]
    pub percentage: f64,
}

/// Delay or latency statistics for one category. No cross-field invariant is
/// enforced; `min <= avg <= max` violations pass through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayStat {
    #[serde(default)]
    pub avg: f64,
    #[serde(default)]
    pub max: f64,
    #[serde(default)]
    pub count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std: Option<f64>,
}

/// Capture-wide statistics from the analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureStats {
    #[serde(default)]
    pub avg_packet_size: f64,
    #[serde(default)]
    pub capture_duration: f64,
    #[serde(default)]
    pub max_packet_size: f64,
    #[serde(default)]
    pub min_packet_size: f64,
    #[serde(default)]
    pub packets_per_second: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_packets: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PacketLossStat {
    #[serde(default)]
    pub loss_events: u64,
    #[serde(default)]
    pub loss_percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lost_packets: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_lost_packets: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmitted: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_transmitted: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PacketLoss {
    #[serde(default)]
    pub overall: PacketLossStat,
    #[serde(default)]
    pub per_protocol: BTreeMap<String, PacketLossStat>,
}

/// Top-talker entry keyed by IP address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpEntry {
    pub ip: String,
    #[serde(default)]
    pub packets: u64,
    #[serde(default)]
    pub percentage: f64,
}

/// Top-talker entry keyed by port number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortEntry {
    pub port: u32,
    #[serde(default)]
    pub packets: u64,
    #[serde(default)]
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IpStats {
    #[serde(default)]
    pub top_sources: Vec<IpEntry>,
    #[serde(default)]
    pub top_destinations: Vec<IpEntry>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PortStats {
    #[serde(default)]
    pub top_sources: Vec<PortEntry>,
    #[serde(default)]
    pub top_destinations: Vec<PortEntry>,
}

/// The canonical shape consumed by every page view. Built once per raw
/// response and never mutated in place; a fresh one is built on each fetch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedViewModel {
    pub protocol_distribution: Vec<DistributionEntry>,
    pub packet_type_distribution: Vec<DistributionEntry>,
    pub total_packets: u64,
    pub stats: Option<CaptureStats>,
    pub delay_categories: Option<BTreeMap<String, DelayStat>>,
    pub ip_stats: Option<IpStats>,
    pub port_stats: Option<PortStats>,
    pub packet_loss: Option<PacketLoss>,
}

/// Lightweight session record accompanying the cached blob. Created at a
/// successful upload, cleared when a fresh upload begins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    #[serde(rename = "originalFilename")]
    pub original_filename: String,
    pub timestamp: DateTime<Utc>,
}

impl SessionMetadata {
    pub fn new(original_filename: impl Into<String>) -> Self {
        Self {
            original_filename: original_filename.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Orders distribution rows by percentage descending. Ties keep their
/// original relative order (`sort_by` is stable).
pub fn sort_by_percentage_desc(entries: &mut [DistributionEntry]) {
    entries.sort_by(|a, b| {
        b.percentage
            .partial_cmp(&a.percentage)
            .unwrap_or(Ordering::Equal)
    });
}

/// "broker_processing_delays" -> "Broker Processing Delays".
pub fn delay_category_title(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, packets: u64, percentage: f64) -> DistributionEntry {
        DistributionEntry {
            name: name.to_string(),
            packets,
            percentage,
        }
    }

    #[test]
    fn sort_orders_by_percentage_descending() {
        let mut entries = vec![
            entry("ARP", 12, 0.12),
            entry("MQTT", 9256, 99.39),
            entry("HTTPS", 28, 0.3),
        ];
        sort_by_percentage_desc(&mut entries);
        assert_eq!(entries[0].name, "MQTT");
        assert_eq!(entries[1].name, "HTTPS");
        assert_eq!(entries[2].name, "ARP");
    }

    #[test]
    fn sort_keeps_tied_rows_in_original_order() {
        let mut entries = vec![
            entry("UDP", 8, 0.08),
            entry("IPv6", 8, 0.08),
            entry("ICMP", 8, 0.08),
        ];
        sort_by_percentage_desc(&mut entries);
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["UDP", "IPv6", "ICMP"]);
    }

    #[test]
    fn delay_titles_capitalize_each_word() {
        assert_eq!(
            delay_category_title("broker_processing_delays"),
            "Broker Processing Delays"
        );
        assert_eq!(delay_category_title("jitter"), "Jitter");
    }

    #[test]
    fn metadata_round_trips_through_json() {
        let metadata = SessionMetadata {
            original_filename: "t.pcapng".to_string(),
            timestamp: "2024-01-01T00:00:00Z".parse().unwrap(),
        };
        let encoded = serde_json::to_string(&metadata).unwrap();
        assert!(encoded.contains("originalFilename"));
        let decoded: SessionMetadata = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, metadata);
    }
}
