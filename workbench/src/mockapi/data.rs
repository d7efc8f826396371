//! Synthetic analysis documents in the service's nested response shape.

use rand::Rng;
use serde_json::{json, Value};

const PROTOCOLS: [&str; 5] = ["MQTT", "HTTPS", "ARP", "UDP", "IPv6"];

/// Builds a randomized but internally consistent analysis document.
pub fn synthesize_analysis() -> Value {
    let mut rng = rand::thread_rng();
    let total: u64 = rng.gen_range(5_000..20_000);

    let mut remaining = total;
    let mut protocol_entries = Vec::new();
    for (index, name) in PROTOCOLS.iter().enumerate() {
        let packets = if index == PROTOCOLS.len() - 1 {
            remaining
        } else {
            let share = rng.gen_range(0..=remaining);
            remaining -= share;
            share
        };
        let percentage = (packets as f64 / total as f64) * 100.0;
        protocol_entries.push(json!({
            "name": name,
            "packets": packets,
            "percentage": (percentage * 100.0).round() / 100.0
        }));
    }

    let duration = rng.gen_range(30.0..300.0_f64);
    let avg_size = rng.gen_range(80.0..400.0_f64);

    json!({
        "overview": {
            "Protocol": protocol_entries,
            "Packet": [
                { "name": "IP", "packets": total, "percentage": 100.0 },
                { "name": "TCP", "packets": total * 9 / 10, "percentage": 90.0 }
            ],
            "stats": {
                "avg_packet_size": (avg_size * 100.0).round() / 100.0,
                "capture_duration": (duration * 100.0).round() / 100.0,
                "max_packet_size": rng.gen_range(600..1600),
                "min_packet_size": rng.gen_range(40..80),
                "packets_per_second": ((total as f64 / duration) * 100.0).round() / 100.0,
                "total_packets": total
            },
            "ip_stats": {
                "top_sources": [
                    { "ip": "192.168.1.10", "packets": total / 2 },
                    { "ip": "192.168.1.20", "packets": total / 4 }
                ],
                "top_destinations": [
                    { "ip": "192.168.1.1", "packets": total / 2 }
                ]
            },
            "port_stats": {
                "top_sources": [
                    { "port": 1883, "packets": total / 2 }
                ],
                "top_destinations": [
                    { "port": 1883, "packets": total / 2 },
                    { "port": 443, "packets": total / 8 }
                ]
            }
        },
        "analysis": {
            "delay_categories": {
                "broker_processing_delays": {
                    "avg": rng.gen_range(100.0..2000.0_f64),
                    "count": rng.gen_range(5..50),
                    "max": rng.gen_range(2000.0..15000.0_f64)
                },
                "device_to_broker_delays": {
                    "avg": rng.gen_range(1.0..20.0_f64),
                    "count": rng.gen_range(1000..6000),
                    "max": rng.gen_range(100.0..15000.0_f64)
                }
            },
            "packet_loss": {
                "overall": {
                    "loss_events": 0,
                    "loss_percentage": 0,
                    "total_lost_packets": 0,
                    "total_transmitted": total
                },
                "per_protocol": {}
            }
        }
    })
}

/// Builds a decoded packet list document under the `packets` key.
pub fn synthesize_packets(count: usize) -> Value {
    let mut rng = rand::thread_rng();
    let packets: Vec<Value> = (0..count)
        .map(|index| {
            let protocol = PROTOCOLS[rng.gen_range(0..PROTOCOLS.len())];
            json!({
                "number": index + 1,
                "time": format!("{:.6}", index as f64 * 0.0153),
                "source": format!("192.168.1.{}", rng.gen_range(2..50)),
                "destination": "192.168.1.1",
                "protocol": protocol,
                "length": rng.gen_range(54..1500),
                "info": format!("{protocol} segment")
            })
        })
        .collect();
    json!({ "packets": packets })
}

/// Builds a latency-distribution CSV with one contiguous run per protocol.
pub fn synthesize_latency_csv() -> String {
    let mut rng = rand::thread_rng();
    let mut csv = String::from("// protocol,latency_ms,density\n");
    for protocol in ["MQTT", "TCP", "UDP"] {
        let mut density = rng.gen_range(0.5..0.9_f64);
        let mut latency = 0.5_f64;
        for _ in 0..8 {
            csv.push_str(&format!("{protocol},{latency:.2},{density:.3}\n"));
            latency *= 2.0;
            density *= rng.gen_range(0.4..0.8);
        }
    }
    csv
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcapcore::model::extract_packets;
    use pcapcore::normalize;

    #[test]
    fn synthetic_analysis_normalizes_cleanly() {
        let model = normalize(&synthesize_analysis());
        assert!(model.total_packets >= 5_000);
        assert_eq!(model.protocol_distribution.len(), PROTOCOLS.len());
        assert!(model.stats.is_some());
        assert!(model.delay_categories.is_some());
    }

    #[test]
    fn synthetic_packets_decode() {
        let packets = extract_packets(&synthesize_packets(25));
        assert_eq!(packets.len(), 25);
        assert_eq!(packets[0].number, 1);
    }

    #[test]
    fn synthetic_csv_parses_into_three_series() {
        let series = pcapcore::latency::parse_latency_csv(&synthesize_latency_csv());
        assert_eq!(series.len(), 3);
        assert_eq!(series[0].xs.len(), 8);
    }
}
