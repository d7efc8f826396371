//! Fixed fallback dataset served when neither cache nor live API can.
//!
//! One shared constant for every page orchestrator; matches the nested
//! response shape the analysis service emits for an MQTT-heavy capture.

use serde_json::{json, Value};

/// Latency-density coordinates used when the CSV endpoint is unreachable.
pub const SAMPLE_LATENCY_CSV: &str = "\
// protocol,latency_ms,density
MQTT,0.5,0.82
MQTT,1.0,0.64
MQTT,2.0,0.41
MQTT,4.0,0.22
MQTT,8.0,0.09
MQTT,16.0,0.03
TCP,0.5,0.61
TCP,1.0,0.52
TCP,2.0,0.38
TCP,4.0,0.19
TCP,8.0,0.08
TCP,16.0,0.02
UDP,0.5,0.35
UDP,1.0,0.27
UDP,2.0,0.15
UDP,4.0,0.06
UDP,8.0,0.02
UDP,16.0,0.01
";

/// The full sample analysis document, nested shape.
pub fn sample_response() -> Value {
    json!({
        "overview": {
            "Protocol": [
                { "name": "MQTT", "packets": 9256, "percentage": 99.39 },
                { "name": "HTTPS", "packets": 28, "percentage": 0.3 },
                { "name": "ARP", "packets": 12, "percentage": 0.12 },
                { "name": "UDP", "packets": 8, "percentage": 0.08 },
                { "name": "IPv6", "packets": 8, "percentage": 0.08 }
            ],
            "Packet": [
                { "name": "IP", "packets": 9292, "percentage": 99.78 },
                { "name": "TCP", "packets": 9284, "percentage": 99.69 },
                { "name": "ARP", "packets": 12, "percentage": 0.12 },
                { "name": "UDP", "packets": 8, "percentage": 0.08 },
                { "name": "IPv6", "packets": 8, "percentage": 0.08 }
            ],
            "stats": {
                "avg_packet_size": 134.99,
                "capture_duration": 146.62,
                "max_packet_size": 854,
                "min_packet_size": 54,
                "packets_per_second": 63.5,
                "total_packets": 9312
            },
            "ip_stats": {
                "top_sources": [],
                "top_destinations": []
            },
            "port_stats": {
                "top_sources": [],
                "top_destinations": []
            },
            "time_range": {
                "start": 0,
                "end": 0
            }
        },
        "analysis": {
            "delay_categories": {
                "broker_processing_delays": {
                    "avg": 1549.77,
                    "count": 17,
                    "max": 14000.83
                },
                "bundling_delays": {
                    "avg": 0.12,
                    "count": 2529,
                    "max": 0.99
                },
                "device_to_broker_delays": {
                    "avg": 8.13,
                    "count": 4922,
                    "max": 14000.83
                }
            },
            "iot_metrics": {
                "bundle_sizes": [],
                "aggregation_intervals": [],
                "device_patterns": {}
            },
            "jitter": {},
            "latency": {},
            "packet_loss": {
                "overall": {
                    "loss_events": 0,
                    "loss_percentage": 0,
                    "total_lost_packets": 0,
                    "total_transmitted": 0
                },
                "per_protocol": {}
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    #[test]
    fn sample_normalizes_into_a_renderable_model() {
        let model = normalize(&sample_response());
        assert_eq!(model.total_packets, 9312);
        assert_eq!(model.protocol_distribution.len(), 5);
        assert_eq!(model.protocol_distribution[0].name, "MQTT");
        assert_eq!(model.delay_categories.unwrap().len(), 3);
        assert_eq!(model.packet_loss.unwrap().overall.loss_events, 0);
    }
}
