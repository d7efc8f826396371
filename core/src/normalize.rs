//! Shape-tolerant normalization of raw analysis responses.
//!
//! The analysis service returns one of two JSON layouts for the same logical
//! result: a flat document, or one nested under `overview` / `analysis`.
//! Each view-model field resolves through an ordered candidate-path list;
//! the first present and decodable candidate wins, independently per field,
//! and a field with no usable candidate falls back to a safe default.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::model::{DelayStat, NormalizedViewModel};

/// Walks `raw` down one key path, returning the value if every key exists.
fn resolve<'a>(raw: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = raw;
    for key in path {
        current = current.get(key)?;
    }
    Some(current)
}

/// First candidate that is both present and decodable as `T`. A value of the
/// wrong shape demotes its candidate to absent instead of erroring.
fn resolve_field<T: DeserializeOwned>(raw: &Value, candidates: &[&[&str]]) -> Option<T> {
    candidates
        .iter()
        .find_map(|path| resolve(raw, path).and_then(|value| serde_json::from_value(value.clone()).ok()))
}

/// Builds the canonical view model from a raw response. Pure and total:
/// never errors, never panics, and flat-shape fields take precedence over
/// their nested counterparts.
pub fn normalize(raw: &Value) -> NormalizedViewModel {
    NormalizedViewModel {
        protocol_distribution: resolve_field(raw, &[&["Protocol"], &["overview", "Protocol"]])
            .unwrap_or_default(),
        packet_type_distribution: resolve_field(raw, &[&["Packet"], &["overview", "Packet"]])
            .unwrap_or_default(),
        total_packets: resolve_field(
            raw,
            &[&["total_packets"], &["overview", "stats", "total_packets"]],
        )
        .unwrap_or(0),
        stats: resolve_field(raw, &[&["stats"], &["overview", "stats"]]),
        delay_categories: resolve_field::<BTreeMap<String, DelayStat>>(
            raw,
            &[&["delay_categories"], &["analysis", "delay_categories"]],
        ),
        ip_stats: resolve_field(raw, &[&["overview", "ip_stats"]]),
        port_stats: resolve_field(raw, &[&["overview", "port_stats"]]),
        packet_loss: resolve_field(raw, &[&["packet_loss"], &["analysis", "packet_loss"]]),
    }
}
