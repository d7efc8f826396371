use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One decoded packet row on the search page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PacketRecord {
    #[serde(default)]
    pub number: u64,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub protocol: String,
    #[serde(default)]
    pub length: u64,
    #[serde(default)]
    pub info: String,
}

/// Packet-length buckets used by the length filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthTier {
    All,
    /// length < 100
    Small,
    /// 100 <= length < 500
    Medium,
    /// length >= 500
    Large,
}

impl Default for LengthTier {
    fn default() -> Self {
        LengthTier::All
    }
}

impl std::fmt::Display for LengthTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LengthTier::All => "All Sizes",
            LengthTier::Small => "Small (< 100 bytes)",
            LengthTier::Medium => "Medium (100-500 bytes)",
            LengthTier::Large => "Large (> 500 bytes)",
        };
        f.write_str(label)
    }
}

impl LengthTier {
    pub const ALL: [LengthTier; 4] = [
        LengthTier::All,
        LengthTier::Small,
        LengthTier::Medium,
        LengthTier::Large,
    ];

    pub fn matches(&self, length: u64) -> bool {
        match self {
            LengthTier::All => true,
            LengthTier::Small => length < 100,
            LengthTier::Medium => (100..500).contains(&length),
            LengthTier::Large => length >= 500,
        }
    }
}

/// Search-page filter set. `None` selectors mean "all"; the free-text query
/// matches source, destination, protocol, or info, case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct PacketFilter {
    pub query: String,
    pub protocol: Option<String>,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub length: LengthTier,
}

impl PacketFilter {
    pub fn apply(&self, packets: &[PacketRecord]) -> Vec<PacketRecord> {
        let query = self.query.to_lowercase();
        packets
            .iter()
            .filter(|packet| {
                if let Some(protocol) = &self.protocol {
                    if !packet.protocol.eq_ignore_ascii_case(protocol) {
                        return false;
                    }
                }
                if let Some(source) = &self.source {
                    if &packet.source != source {
                        return false;
                    }
                }
                if let Some(destination) = &self.destination {
                    if &packet.destination != destination {
                        return false;
                    }
                }
                if !self.length.matches(packet.length) {
                    return false;
                }
                if !query.is_empty() {
                    let hit = packet.source.to_lowercase().contains(&query)
                        || packet.destination.to_lowercase().contains(&query)
                        || packet.protocol.to_lowercase().contains(&query)
                        || packet.info.to_lowercase().contains(&query);
                    if !hit {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect()
    }
}

/// Packet arrays arrive either under `packets` or the older `AllPackets`
/// key; rows that fail to decode are dropped rather than failing the page.
pub fn extract_packets(raw: &Value) -> Vec<PacketRecord> {
    for key in ["packets", "AllPackets"] {
        if let Some(Value::Array(items)) = raw.get(key) {
            return items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect();
        }
    }
    Vec::new()
}

/// Sorted distinct protocol names for the filter dropdown.
pub fn distinct_protocols(packets: &[PacketRecord]) -> Vec<String> {
    distinct(packets, |p| &p.protocol)
}

pub fn distinct_sources(packets: &[PacketRecord]) -> Vec<String> {
    distinct(packets, |p| &p.source)
}

pub fn distinct_destinations(packets: &[PacketRecord]) -> Vec<String> {
    distinct(packets, |p| &p.destination)
}

fn distinct<F>(packets: &[PacketRecord], field: F) -> Vec<String>
where
    F: Fn(&PacketRecord) -> &String,
{
    packets
        .iter()
        .map(|packet| field(packet).clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// One-based page slice over an already-filtered packet list.
pub fn page_slice(packets: &[PacketRecord], page: usize, page_size: usize) -> &[PacketRecord] {
    if page_size == 0 {
        return &[];
    }
    let start = page
        .saturating_sub(1)
        .saturating_mul(page_size)
        .min(packets.len());
    let end = (start + page_size).min(packets.len());
    &packets[start..end]
}
