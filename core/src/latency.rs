//! Parsing of the latency-distribution coordinate CSV.

use std::collections::HashMap;

/// One protocol's latency-density curve.
#[derive(Debug, Clone, PartialEq)]
pub struct LatencySeries {
    pub protocol: String,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

/// Parses `protocol,x,y` lines into per-protocol series.
///
/// Blank lines and `//` comments are skipped, as are rows with a wrong
/// column count or non-numeric coordinates. A protocol split across several
/// contiguous runs keeps only its last run; first-seen order is preserved.
pub fn parse_latency_csv(csv: &str) -> Vec<LatencySeries> {
    let mut order: Vec<String> = Vec::new();
    let mut by_protocol: HashMap<String, LatencySeries> = HashMap::new();
    let mut current: Option<LatencySeries> = None;

    let mut flush = |run: Option<LatencySeries>,
                     order: &mut Vec<String>,
                     by_protocol: &mut HashMap<String, LatencySeries>| {
        if let Some(series) = run {
            if !series.xs.is_empty() {
                if !by_protocol.contains_key(&series.protocol) {
                    order.push(series.protocol.clone());
                }
                by_protocol.insert(series.protocol.clone(), series);
            }
        }
    };

    for line in csv.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        let parts: Vec<&str> = line.split(',').collect();
        if parts.len() != 3 {
            continue;
        }
        let (Ok(x), Ok(y)) = (parts[1].trim().parse::<f64>(), parts[2].trim().parse::<f64>())
        else {
            continue;
        };
        let protocol = parts[0].trim();

        let same_run = current
            .as_ref()
            .map(|series| series.protocol == protocol)
            .unwrap_or(false);
        if !same_run {
            flush(current.take(), &mut order, &mut by_protocol);
            current = Some(LatencySeries {
                protocol: protocol.to_string(),
                xs: Vec::new(),
                ys: Vec::new(),
            });
        }
        if let Some(series) = current.as_mut() {
            series.xs.push(x);
            series.ys.push(y);
        }
    }
    flush(current.take(), &mut order, &mut by_protocol);

    order
        .into_iter()
        .filter_map(|protocol| by_protocol.remove(&protocol))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_contiguous_runs_per_protocol() {
        let csv = "// header\nMQTT,0.5,0.8\nMQTT,1.0,0.6\nTCP,0.5,0.4\n";
        let series = parse_latency_csv(csv);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].protocol, "MQTT");
        assert_eq!(series[0].xs, vec![0.5, 1.0]);
        assert_eq!(series[1].ys, vec![0.4]);
    }

    #[test]
    fn later_run_replaces_earlier_run_of_same_protocol() {
        let csv = "MQTT,0.5,0.8\nTCP,0.5,0.4\nMQTT,9.0,0.1\n";
        let series = parse_latency_csv(csv);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].protocol, "MQTT");
        assert_eq!(series[0].xs, vec![9.0]);
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let csv = "MQTT,0.5\nMQTT,abc,0.8\n\nMQTT,1.0,0.6\n";
        let series = parse_latency_csv(csv);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].xs, vec![1.0]);
    }

    #[test]
    fn empty_input_yields_no_series() {
        assert!(parse_latency_csv("").is_empty());
        assert!(parse_latency_csv("// only comments\n").is_empty());
    }
}
