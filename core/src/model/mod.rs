pub mod cards;
pub mod packet;
pub mod view;

pub use cards::{
    capture_duration_severity, format_capture_duration, packet_count_severity,
    packet_rate_severity, packet_size_severity, service_name, Severity,
};
pub use packet::{
    distinct_destinations, distinct_protocols, distinct_sources, extract_packets, page_slice,
    LengthTier, PacketFilter, PacketRecord,
};
pub use view::{
    delay_category_title, sort_by_percentage_desc, CaptureStats, DelayStat, DistributionEntry,
    IpEntry, IpStats, NormalizedViewModel, PacketLoss, PacketLossStat, PortEntry, PortStats,
    SessionMetadata,
};
